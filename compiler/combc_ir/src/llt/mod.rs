//! Low-level types.
//!
//! Machine IR operands carry a low-level type: a scalar of some bit width,
//! a pointer into an address space, or a fixed-length vector of scalars.
//! Patterns name them as `i32`/`s32`, `p0`, `v4s32`/`v4i32`.

use std::fmt;

/// Width of the immediates the matcher can represent.
pub const IMMEDIATE_BITS: u32 = 64;

/// A low-level machine type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Llt {
    /// Scalar of the given bit width.
    Scalar(u16),
    /// Pointer in the given address space.
    Pointer(u16),
    /// Fixed-length vector of scalars.
    Vector { lanes: u16, element_bits: u16 },
}

impl Llt {
    /// Parse a type spelling.
    ///
    /// Returns `None` for anything that is not a well-formed low-level type,
    /// including zero-width scalars and zero-lane vectors.
    pub fn parse(s: &str) -> Option<Llt> {
        if let Some(rest) = s.strip_prefix('v') {
            let split = rest.find(|c: char| !c.is_ascii_digit())?;
            let lanes: u16 = rest[..split].parse().ok()?;
            let element_bits = parse_scalar_bits(&rest[split..])?;
            if lanes == 0 {
                return None;
            }
            return Some(Llt::Vector {
                lanes,
                element_bits,
            });
        }
        if let Some(space) = s.strip_prefix('p') {
            return space.parse().ok().map(Llt::Pointer);
        }
        parse_scalar_bits(s).map(Llt::Scalar)
    }

    /// Bit width of one scalar element, `None` for pointers.
    pub fn scalar_bits(self) -> Option<u32> {
        match self {
            Llt::Scalar(bits) | Llt::Vector { element_bits: bits, .. } => Some(u32::from(bits)),
            Llt::Pointer(_) => None,
        }
    }

    /// Check whether `value` is representable in one element of this type.
    ///
    /// Accepts both the signed and the unsigned reading of the bit pattern,
    /// so `(i8 255)` and `(i8 -1)` are both legal.
    pub fn fits_immediate(self, value: i128) -> bool {
        let Some(bits) = self.scalar_bits() else {
            return fits_immediate_width(value);
        };
        if bits >= 128 {
            return true;
        }
        let min = -(1i128 << (bits - 1));
        let max = (1i128 << bits) - 1;
        (min..=max).contains(&value)
    }
}

/// Check whether `value` fits the matcher's signed 64-bit immediate.
pub fn fits_immediate_width(value: i128) -> bool {
    i64::try_from(value).is_ok()
}

fn parse_scalar_bits(s: &str) -> Option<u16> {
    let digits = s.strip_prefix('i').or_else(|| s.strip_prefix('s'))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|&bits| bits > 0)
}

impl fmt::Display for Llt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Llt::Scalar(bits) => write!(f, "s{bits}"),
            Llt::Pointer(space) => write!(f, "p{space}"),
            Llt::Vector {
                lanes,
                element_bits,
            } => write!(f, "v{lanes}s{element_bits}"),
        }
    }
}
