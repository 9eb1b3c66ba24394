//! Compilation options and their command-line spelling.

use std::fmt;
use std::str::FromStr;

/// What the driver prints after compiling.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EmitKind {
    /// Every rule program, branch by branch.
    #[default]
    Programs,
    /// The linear match table.
    Table,
    /// Nothing but diagnostics and a summary.
    Check,
}

impl EmitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EmitKind::Programs => "programs",
            EmitKind::Table => "table",
            EmitKind::Check => "check",
        }
    }
}

impl FromStr for EmitKind {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "programs" => Ok(EmitKind::Programs),
            "table" => Ok(EmitKind::Table),
            "check" => Ok(EmitKind::Check),
            _ => Err(OptionError::InvalidValue {
                flag: "--emit",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for EmitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one compilation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Compile rules on the rayon pool. Output order is unaffected.
    pub parallel: bool,
    pub emit: EmitKind,
    /// Maximum number of reported errors (0 = unlimited).
    pub error_limit: usize,
}

impl CompileOptions {
    /// Parse flags, returning the options and the positional arguments.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<(Self, Vec<String>), OptionError> {
        let mut options = CompileOptions::default();
        let mut positional = Vec::new();
        for arg in args {
            let arg = arg.as_ref();
            if arg == "--parallel" || arg == "-j" {
                options.parallel = true;
            } else if let Some(kind) = arg.strip_prefix("--emit=") {
                options.emit = kind.parse()?;
            } else if let Some(limit) = arg.strip_prefix("--error-limit=") {
                options.error_limit = limit.parse().map_err(|_| OptionError::InvalidValue {
                    flag: "--error-limit",
                    value: limit.to_string(),
                })?;
            } else if arg.starts_with('-') {
                return Err(OptionError::UnknownFlag(arg.to_string()));
            } else {
                positional.push(arg.to_string());
            }
        }
        Ok((options, positional))
    }
}

/// A command-line flag that could not be understood.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionError {
    UnknownFlag(String),
    InvalidValue { flag: &'static str, value: String },
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionError::UnknownFlag(flag) => write!(f, "unknown option '{flag}'"),
            OptionError::InvalidValue { flag, value } => {
                write!(f, "invalid value '{value}' for {flag}")
            }
        }
    }
}

impl std::error::Error for OptionError {}

#[cfg(test)]
mod tests;
