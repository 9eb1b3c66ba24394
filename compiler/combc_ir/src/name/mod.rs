//! Interned identifier.
//!
//! Operand names, pattern names, mnemonics and rule/fragment names are all
//! interned into a compact 32-bit [`Name`]. Operand names are stored without
//! their `$` sigil.

use std::fmt;

/// Interned string identifier.
///
/// Index into the [`StringInterner`](crate::StringInterner) table. Index 0 is
/// always the empty string.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into the interner table).
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}
