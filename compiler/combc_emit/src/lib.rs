//! Matcher and apply program emission.
//!
//! Consumes concrete pattern lists (fragments already expanded, types
//! already inferred) and produces the operation sequences the runtime
//! interpreter executes:
//!
//! - [`emit_matcher`]: structural checks, captures and native predicates
//! - [`emit_apply`]: instruction building, temporary registers, constant
//!   materialization and root erasure
//! - [`compile_rule`]: the per-rule pipeline tying both to fragment
//!   expansion

mod apply;
mod matcher;
mod rule;
mod snippet;

#[cfg(test)]
mod test_helpers;

pub use apply::emit_apply;
pub use matcher::{emit_matcher, MatchBindings};
pub use rule::compile_rule;
pub use snippet::SnippetScope;

/// Operand and count values in emitted programs are `u32`.
pub(crate) fn operand_index(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
