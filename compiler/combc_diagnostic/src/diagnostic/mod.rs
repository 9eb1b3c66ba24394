//! Core diagnostic types for structured error reporting.
//!
//! Declarations carry no source positions, so a diagnostic locates itself by
//! [`Origin`]: the rule or fragment being processed and, when known, the
//! pattern inside it.

use std::fmt;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// Which kind of declaration a diagnostic belongs to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OriginKind {
    Rule,
    Fragment,
}

impl fmt::Display for OriginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginKind::Rule => write!(f, "rule"),
            OriginKind::Fragment => write!(f, "fragment"),
        }
    }
}

/// The declaration (and optionally the pattern) a diagnostic points at.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Origin {
    pub kind: OriginKind,
    /// Name of the rule or fragment.
    pub owner: String,
    /// Name of the offending pattern, if the failure is local to one.
    pub pattern: Option<String>,
}

impl Origin {
    pub fn rule(name: impl Into<String>) -> Self {
        Origin {
            kind: OriginKind::Rule,
            owner: name.into(),
            pattern: None,
        }
    }

    pub fn fragment(name: impl Into<String>) -> Self {
        Origin {
            kind: OriginKind::Fragment,
            owner: name.into(),
            pattern: None,
        }
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind, self.owner)?;
        if let Some(pattern) = &self.pattern {
            write!(f, ", pattern `{pattern}`")?;
        }
        Ok(())
    }
}

/// A diagnostic with all context needed for a useful error message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    /// Severity level.
    pub severity: Severity,
    /// Main error message.
    pub message: String,
    /// Where the problem was found.
    pub origin: Option<Origin>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
    /// Text suggestions for fixing the error.
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            origin: None,
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach the declaration the problem was found in.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Check if this is an error (vs warning/note).
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Name of the owning rule or fragment, if attached.
    pub fn owner(&self) -> Option<&str> {
        self.origin.as_ref().map(|o| o.owner.as_str())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;

        if let Some(origin) = &self.origin {
            write!(f, "\n  --> {origin}")?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        for suggestion in &self.suggestions {
            write!(f, "\n  = help: {suggestion}")?;
        }

        Ok(())
    }
}
