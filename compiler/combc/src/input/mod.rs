//! Declaration files.
//!
//! The upstream reader hands declarations over as JSON:
//!
//! ```json
//! {
//!   "fragments": [ { "name": "...", "outs": {...}, "ins": {...}, "alternatives": [...] } ],
//!   "rules": [ { "name": "...", "defs": {...}, "match": {...}, "apply": {...} } ]
//! }
//! ```
//!
//! Each node is `{ "operator": "...", "name": "...", "args": [...] }`; see
//! [`combc_ir::dag`] for the argument shapes.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use combc_ir::dag::{FragmentDecl, RuleDecl};

/// Every declaration of one input file, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declarations {
    #[serde(default)]
    pub fragments: Vec<FragmentDecl>,
    #[serde(default)]
    pub rules: Vec<RuleDecl>,
}

impl Declarations {
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        serde_json::from_str(text).map_err(LoadError::Json)
    }

    /// Read and parse a declaration file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "loaded declarations");
        Self::from_json(&text)
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty() && self.rules.is_empty()
    }
}

/// A declaration file that could not be read.
#[derive(Debug)]
pub enum LoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "cannot read '{}': {source}", path.display())
            }
            LoadError::Json(err) => write!(f, "malformed declaration file: {err}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Json(err) => Some(err),
        }
    }
}
