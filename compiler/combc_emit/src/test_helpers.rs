//! Shared test utilities for the emitters.
//!
//! Rules are written as record DAGs and lowered through the real pattern
//! passes, so emitter tests see exactly what the driver hands over.

use combc_ir::dag::{DagArg, DagNode, FragmentDecl, RuleDecl};
use combc_ir::{CombineRule, GenericInstrTable, InsnId, Name, OutInsnId, StringInterner, TempRegId};
use combc_patterns::{infer_types, FragmentSet, Lowerer};

/// `$name`
pub(crate) fn r(name: &str) -> DagArg {
    DagArg::reference(format!("${name}"))
}

/// `ty:$name`
pub(crate) fn t(ty: &str, name: &str) -> DagArg {
    DagArg::typed(ty, format!("${name}"))
}

pub(crate) fn lit(value: i128) -> DagArg {
    DagArg::Literal(value)
}

/// `(ty value)`
pub(crate) fn typed_lit(ty: &str, value: i128) -> DagArg {
    DagArg::typed_literal(ty, value)
}

/// `(op args...)` as a pattern.
pub(crate) fn pat(op: &str, args: Vec<DagArg>) -> DagArg {
    DagArg::Dag(DagNode::new(op).args(args))
}

/// `(op args...):$name` as a pattern.
pub(crate) fn named_pat(name: &str, op: &str, args: Vec<DagArg>) -> DagArg {
    DagArg::Dag(DagNode::new(op).named(format!("${name}")).args(args))
}

/// Rule with extra `defs` entries (match data) after the root.
pub(crate) fn rule_with_defs(
    name: &str,
    defs: Vec<DagArg>,
    matches: Vec<DagArg>,
    applies: Vec<DagArg>,
) -> RuleDecl {
    RuleDecl {
        name: name.to_string(),
        defs: DagNode::new("defs").args(defs),
        match_: DagNode::new("match").args(matches),
        apply: DagNode::new("apply").args(applies),
    }
}

pub(crate) fn rule(name: &str, root: &str, matches: Vec<DagArg>, applies: Vec<DagArg>) -> RuleDecl {
    rule_with_defs(name, vec![t("root", root)], matches, applies)
}

pub(crate) fn fragment(
    name: &str,
    outs: Vec<DagArg>,
    ins: Vec<DagArg>,
    alternatives: Vec<Vec<DagArg>>,
) -> FragmentDecl {
    FragmentDecl {
        name: name.to_string(),
        outs: DagNode::new("outs").args(outs),
        ins: DagNode::new("ins").args(ins),
        alternatives: alternatives
            .into_iter()
            .map(|alt| DagNode::new("pattern").args(alt))
            .collect(),
    }
}

pub(crate) struct Fixture {
    pub interner: StringInterner,
    pub instrs: GenericInstrTable,
    pub fragments: FragmentSet,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_fragments(&[])
    }

    pub fn with_fragments(decls: &[FragmentDecl]) -> Self {
        let interner = StringInterner::new();
        let instrs = GenericInstrTable::new();
        let fragments = FragmentSet::build(decls, &interner, &instrs);
        assert_eq!(fragments.failures().count(), 0, "fixture fragments must be valid");
        Fixture {
            interner,
            instrs,
            fragments,
        }
    }

    /// Lower `decl` without expanding or inferring anything.
    pub fn lower(&self, decl: &RuleDecl) -> CombineRule {
        Lowerer::new(&self.interner, &self.instrs, self.fragments.signatures())
            .lower_rule(decl)
            .unwrap_or_else(|p| panic!("{p:?}"))
    }

    /// Lower `decl` and run joint inference over its (concrete) lists.
    pub fn lower_inferred(&self, decl: &RuleDecl) -> CombineRule {
        let mut rule = self.lower(decl);
        infer_types(&mut [&mut rule.match_patterns, &mut rule.apply_patterns], &[])
            .unwrap_or_else(|p| panic!("{p:?}"));
        rule
    }

    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }
}

pub(crate) fn mi(raw: u32) -> InsnId {
    InsnId::new(raw)
}

pub(crate) fn out(raw: u32) -> OutInsnId {
    OutInsnId::new(raw)
}

pub(crate) fn temp(raw: u32) -> TempRegId {
    TempRegId::new(raw)
}
