//! Emitted matcher and apply programs.
//!
//! These are the compiler's final output, handed to the runtime interpreter.
//! A [`RuleProgram`] is a disjunction of [`RuleBranch`]es tried in order;
//! each branch is a short-circuiting conjunction of [`MatchOp`]s followed by
//! the [`ApplyOp`]s that perform the rewrite.
//!
//! # Addressing
//!
//! - [`InsnId`]: matched instruction slot. Slot 0 is the root candidate; other
//!   slots are filled by [`MatchOp::RecordDefiningInsn`].
//! - [`OutInsnId`]: instruction built by the apply program.
//! - [`TempRegId`]: virtual register created by the apply program.
//! - Operand indices are flat machine operand indices, defs first.

use std::fmt;

use crate::{Llt, Name, StringInterner};

// ── ID newtypes ─────────────────────────────────────────────────────

macro_rules! slot_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "[{}]"), self.0)
            }
        }
    };
}

slot_id!(
    /// Matched instruction slot.
    InsnId,
    "MIs"
);
slot_id!(
    /// Built instruction slot.
    OutInsnId,
    "OutMIs"
);
slot_id!(
    /// Temporary register slot.
    TempRegId,
    "Temps"
);

// ── Operations ──────────────────────────────────────────────────────

/// One primitive match-side operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MatchOp {
    /// The instruction in `insn` has mnemonic `opcode` and exactly
    /// `num_defs` defs and `num_uses` uses.
    CheckStructure {
        insn: InsnId,
        opcode: Name,
        num_defs: u32,
        num_uses: u32,
    },
    /// Fill `insn` with the instruction defining the register in
    /// `from.operand`.
    RecordDefiningInsn {
        insn: InsnId,
        from: InsnId,
        operand: u32,
    },
    /// The operand has low-level type `ty`.
    CheckType { insn: InsnId, operand: u32, ty: Llt },
    /// Bind `name` to the operand.
    Capture { name: Name, insn: InsnId, operand: u32 },
    /// The operand is structurally equal to a previously captured one.
    CheckSameOperand {
        insn: InsnId,
        operand: u32,
        other_insn: InsnId,
        other_operand: u32,
    },
    /// The operand is the immediate `value`.
    CheckImm { insn: InsnId, operand: u32, value: i64 },
    /// Placeholder-resolved native predicate.
    CheckCustom { code: String },
}

/// One primitive apply-side operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ApplyOp {
    /// Create a virtual register of type `ty`.
    MakeTempReg { temp: TempRegId, ty: Llt },
    /// Start building instruction `out`.
    BuildInstr { out: OutInsnId, opcode: Name },
    /// Append a copy of a captured operand.
    CopyOperand { out: OutInsnId, insn: InsnId, operand: u32 },
    /// Append a temporary register as def or use.
    AddTempReg {
        out: OutInsnId,
        temp: TempRegId,
        is_def: bool,
    },
    /// Append a plain immediate.
    AddImm { out: OutInsnId, value: i64 },
    /// Append a typed (wide) immediate.
    AddCImm { out: OutInsnId, ty: Llt, value: i64 },
    /// Placeholder-resolved native action.
    Custom { code: String },
    /// Remove the matched root instruction.
    ///
    /// Emitted after every other op of a program that builds instructions.
    /// Erasure is explicit: an interpreter never removes the root just
    /// because its defs were rebuilt.
    EraseRoot,
}

// ── Programs ────────────────────────────────────────────────────────

/// Ordered match-side operations.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct MatcherProgram {
    pub ops: Vec<MatchOp>,
}

/// Ordered apply-side operations.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ApplyProgram {
    pub ops: Vec<ApplyOp>,
}

/// One disjunct of a rule: a matcher and the rewrite it guards.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RuleBranch {
    /// Fragment alternative chosen for each fragment use, in use order.
    pub alternatives: Vec<usize>,
    pub matcher: MatcherProgram,
    pub apply: ApplyProgram,
}

/// Compiled form of one combine rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RuleProgram {
    pub rule: Name,
    /// Tried in order; the first branch whose matcher succeeds applies.
    pub branches: Vec<RuleBranch>,
}

// ── Display ─────────────────────────────────────────────────────────

/// Wrapper pairing a program item with the interner needed to print it.
pub struct WithInterner<'a, T: ?Sized> {
    item: &'a T,
    interner: &'a StringInterner,
}

/// Render program items with their names resolved.
pub trait DisplayWith {
    fn fmt_with(&self, interner: &StringInterner, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    fn display<'a>(&'a self, interner: &'a StringInterner) -> WithInterner<'a, Self> {
        WithInterner {
            item: self,
            interner,
        }
    }
}

impl<T: DisplayWith + ?Sized> fmt::Display for WithInterner<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.item.fmt_with(self.interner, f)
    }
}

impl DisplayWith for MatchOp {
    fn fmt_with(&self, interner: &StringInterner, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOp::CheckStructure {
                insn,
                opcode,
                num_defs,
                num_uses,
            } => write!(
                f,
                "CheckStructure {insn} {} defs={num_defs} uses={num_uses}",
                interner.lookup(*opcode)
            ),
            MatchOp::RecordDefiningInsn {
                insn,
                from,
                operand,
            } => write!(f, "RecordDefiningInsn {insn} <- {from}.op{operand}"),
            MatchOp::CheckType { insn, operand, ty } => {
                write!(f, "CheckType {insn}.op{operand} {ty}")
            }
            MatchOp::Capture {
                name,
                insn,
                operand,
            } => write!(f, "Capture ${} <- {insn}.op{operand}", interner.lookup(*name)),
            MatchOp::CheckSameOperand {
                insn,
                operand,
                other_insn,
                other_operand,
            } => write!(
                f,
                "CheckSameOperand {insn}.op{operand} == {other_insn}.op{other_operand}"
            ),
            MatchOp::CheckImm {
                insn,
                operand,
                value,
            } => write!(f, "CheckImm {insn}.op{operand} == {value}"),
            MatchOp::CheckCustom { code } => write!(f, "CheckCustom `{code}`"),
        }
    }
}

impl DisplayWith for ApplyOp {
    fn fmt_with(&self, interner: &StringInterner, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyOp::MakeTempReg { temp, ty } => write!(f, "MakeTempReg {temp} {ty}"),
            ApplyOp::BuildInstr { out, opcode } => {
                write!(f, "BuildInstr {out} {}", interner.lookup(*opcode))
            }
            ApplyOp::CopyOperand { out, insn, operand } => {
                write!(f, "CopyOperand {out} <- {insn}.op{operand}")
            }
            ApplyOp::AddTempReg { out, temp, is_def } => {
                let role = if *is_def { "def" } else { "use" };
                write!(f, "AddTempReg {out} {temp} {role}")
            }
            ApplyOp::AddImm { out, value } => write!(f, "AddImm {out} {value}"),
            ApplyOp::AddCImm { out, ty, value } => write!(f, "AddCImm {out} {ty} {value}"),
            ApplyOp::Custom { code } => write!(f, "Custom `{code}`"),
            ApplyOp::EraseRoot => write!(f, "EraseRoot"),
        }
    }
}

impl DisplayWith for RuleProgram {
    fn fmt_with(&self, interner: &StringInterner, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rule {}:", interner.lookup(self.rule))?;
        for (index, branch) in self.branches.iter().enumerate() {
            writeln!(f, "  branch {index} {:?}:", branch.alternatives)?;
            for op in &branch.matcher.ops {
                writeln!(f, "    match {}", op.display(interner))?;
            }
            for op in &branch.apply.ops {
                writeln!(f, "    apply {}", op.display(interner))?;
            }
        }
        Ok(())
    }
}
