//! Pattern semantics for combine rules and pattern fragments.
//!
//! - [`lower`]: record DAG to pattern model, with every single-declaration
//!   check (operators, arity, literal widths, fragment nesting)
//! - [`operands`]: the per-unit operand table and type inference
//! - [`fragment`]: one-time fragment validation and boundness
//!   classification, memoized in a [`FragmentSet`]
//! - [`expand`]: cross-product expansion of fragment uses into concrete
//!   pattern lists
//!
//! Every failure is a [`PatternProblem`]: a [`PatternError`] plus the
//! pattern it was found in, convertible to a diagnostic.

mod error;
pub mod expand;
pub mod fragment;
pub mod lower;
pub mod operands;

#[cfg(test)]
mod test_helpers;

pub use error::{InPattern, OperandClass, Owner, PatternError, PatternProblem};
pub use expand::{ensure_concrete, expand_fragments, Expansion};
pub use fragment::{validate_fragment, FragmentInfo, FragmentSet};
pub use lower::{FragmentSig, Lowerer};
pub use operands::{infer_types, Binding, OperandTable, TypeSeed};
