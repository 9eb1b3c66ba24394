//! Shared test utilities for the pattern passes.
//!
//! Builds record DAGs the way the upstream reader would hand them over, and
//! a few pattern-model factories for passes that run after ingestion. Only
//! compiled in test builds.

use combc_ir::dag::{DagArg, DagNode, FragmentDecl, RuleDecl};
use combc_ir::{
    GenericInstrTable, Group, Llt, Name, Operator, PatternInstr, PatternItem, PatternList,
    PatternOperand, Role, StringInterner,
};

/// `$name`
pub(crate) fn r(name: &str) -> DagArg {
    DagArg::reference(format!("${name}"))
}

/// `ty:$name`
pub(crate) fn t(ty: &str, name: &str) -> DagArg {
    DagArg::typed(ty, format!("${name}"))
}

/// `(op args...)`
pub(crate) fn node(op: &str, args: Vec<DagArg>) -> DagNode {
    DagNode::new(op).args(args)
}

/// `(op args...)` as a nested argument.
pub(crate) fn nested(op: &str, args: Vec<DagArg>) -> DagArg {
    DagArg::Dag(node(op, args))
}

pub(crate) fn rule(name: &str, root: &str, matches: Vec<DagArg>, applies: Vec<DagArg>) -> RuleDecl {
    RuleDecl {
        name: name.to_string(),
        defs: node("defs", vec![t("root", root)]),
        match_: node("match", matches),
        apply: node("apply", applies),
    }
}

pub(crate) fn fragment(
    name: &str,
    outs: Vec<DagArg>,
    ins: Vec<DagArg>,
    alternatives: Vec<Vec<DagArg>>,
) -> FragmentDecl {
    FragmentDecl {
        name: name.to_string(),
        outs: node("outs", outs),
        ins: node("ins", ins),
        alternatives: alternatives
            .into_iter()
            .map(|alt| node("pattern", alt))
            .collect(),
    }
}

pub(crate) fn instrs() -> GenericInstrTable {
    GenericInstrTable::new()
}

/// Named register operand.
pub(crate) fn op(interner: &StringInterner, name: &str, role: Role) -> PatternOperand {
    PatternOperand::register(interner.intern(name), role)
}

/// Named register operand with a type.
pub(crate) fn typed_op(
    interner: &StringInterner,
    name: &str,
    role: Role,
    ty: Llt,
) -> PatternOperand {
    op(interner, name, role).with_type(ty)
}

pub(crate) fn instr(
    interner: &StringInterner,
    mnemonic: &str,
    name: &str,
    operands: Vec<PatternOperand>,
) -> PatternInstr {
    PatternInstr {
        operator: Operator::Instr(interner.intern(mnemonic)),
        name: interner.intern(name),
        operands,
    }
}

pub(crate) fn list(group: Group, instrs: Vec<PatternInstr>) -> PatternList {
    PatternList {
        group,
        items: instrs.into_iter().map(PatternItem::Instr).collect(),
    }
}

/// Types of every occurrence of `name`, in order.
pub(crate) fn types_of(list: &PatternList, name: Name) -> Vec<Option<Llt>> {
    list.instrs()
        .flat_map(|instr| instr.operands.iter())
        .filter(|operand| operand.binds() && operand.name == name)
        .map(|operand| operand.ty)
        .collect()
}
