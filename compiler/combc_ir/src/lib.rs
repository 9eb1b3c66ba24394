//! Combine-rule compiler IR.
//!
//! This crate contains the data structures shared by every phase:
//! - Names and the string interner
//! - Low-level machine types ([`Llt`])
//! - The record DAG handed over by the declaration reader ([`dag`])
//! - The strongly-typed pattern model and declarations
//! - The instruction registry interface ([`InstrInfo`])
//! - Emitted matcher/apply programs and the linear match table
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: operand, pattern and mnemonic names are [`Name`]s.
//! - **One conversion boundary**: the dynamically-shaped DAG is converted
//!   once into [`PatternList`]s; later phases never look at strings.
//! - **Programs are data**: emitted operations are plain enums the runtime
//!   interpreter walks; nothing here executes them.

pub mod dag;
mod decl;
mod instr_info;
mod interner;
mod llt;
mod name;
mod pattern;
pub mod program;
mod snippet;
pub mod table;

pub use decl::{
    CombineRule, InParam, InParamKind, MatchData, OutParam, OutParamKind, PatternFragment,
};
pub use instr_info::{GenericInstrTable, InstrDesc, InstrFlags, InstrInfo};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use llt::{fits_immediate_width, Llt, IMMEDIATE_BITS};
pub use name::Name;
pub use pattern::{
    Group, OperandKind, Operator, PatternInstr, PatternItem, PatternList, PatternOperand, Role,
};
pub use program::{
    ApplyOp, ApplyProgram, DisplayWith, InsnId, MatchOp, MatcherProgram, OutInsnId, RuleBranch,
    RuleProgram, TempRegId,
};
pub use snippet::{CodeSnippet, SnippetPart};
pub use table::{MatchTable, TableEntry};
