//! String interner for identifiers.
//!
//! Provides O(1) interning and lookup with thread-safe access so that rules
//! can be compiled concurrently against one shared table.

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Backing storage for interned strings.
struct InternTable {
    /// Map from string content to its name.
    map: FxHashMap<&'static str, Name>,
    /// Storage for string contents, indexed by `Name::index`.
    strings: Vec<&'static str>,
}

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// Table exceeded capacity (over 4 billion strings).
    Overflow { count: usize },
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "interner exceeded capacity: {count} strings, max is {}",
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for InternError {}

/// Thread-safe string interner.
///
/// Interned strings are leaked and live for the rest of the process, which
/// lets [`lookup`](StringInterner::lookup) hand out `'static` references.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create a new interner with grouping operators pre-interned.
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, Name::EMPTY);
        let interner = StringInterner {
            table: RwLock::new(InternTable {
                map,
                strings: vec![empty],
            }),
        };
        interner.pre_intern_keywords();
        interner
    }

    /// Try to intern a string, returning its Name or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        // Fast path: check if already interned
        {
            let guard = self.table.read();
            if let Some(&name) = guard.map.get(s) {
                return Ok(name);
            }
        }

        let mut guard = self.table.write();

        // Double-check after acquiring write lock
        if let Some(&name) = guard.map.get(s) {
            return Ok(name);
        }

        let raw = u32::try_from(guard.strings.len()).map_err(|_| InternError::Overflow {
            count: guard.strings.len(),
        })?;
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let name = Name::from_raw(raw);
        guard.strings.push(leaked);
        guard.map.insert(leaked, name);
        Ok(name)
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if the interner exceeds capacity (over 4 billion strings).
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up the string for a Name.
    pub fn lookup(&self, name: Name) -> &'static str {
        let guard = self.table.read();
        guard.strings.get(name.index()).copied().unwrap_or("<unknown>")
    }

    /// Look up a string without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.read().map.get(s).copied()
    }

    fn pre_intern_keywords(&self) {
        const KEYWORDS: &[&str] = &[
            // Grouping operators
            "defs", "match", "apply", "pattern", "outs", "ins",
            // Parameter kinds
            "root", "gi_mo", "gi_imm",
            // Common mnemonics
            "COPY", "G_CONSTANT",
        ];

        for kw in KEYWORDS {
            self.intern(kw);
        }
    }

    /// Get the number of interned strings.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// Check if the interner is empty (only has the empty string).
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared interner handed to every compilation phase.
///
/// Cloning is cheap; all clones see the same table.
#[derive(Clone)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    /// Create a new shared interner.
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Default for SharedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
