//! Shared builders for property tests.

use combc::{CompileOptions, CompileReport, Registry};
use combc_diagnostic::ErrorCode;
use combc_ir::dag::{DagArg, DagNode, FragmentDecl, RuleDecl};
use combc_ir::{Name, RuleProgram};

/// `$name`
pub fn r(name: &str) -> DagArg {
    DagArg::reference(format!("${name}"))
}

/// `ty:$name`
pub fn t(ty: &str, name: &str) -> DagArg {
    DagArg::typed(ty, format!("${name}"))
}

pub fn lit(value: i128) -> DagArg {
    DagArg::Literal(value)
}

/// `(ty value)`
pub fn typed_lit(ty: &str, value: i128) -> DagArg {
    DagArg::typed_literal(ty, value)
}

/// `(op args...)`
pub fn pat(op: &str, args: Vec<DagArg>) -> DagArg {
    DagArg::Dag(DagNode::new(op).args(args))
}

/// Rule rooted at `$root`.
pub fn rule(name: &str, root: &str, matches: Vec<DagArg>, applies: Vec<DagArg>) -> RuleDecl {
    RuleDecl {
        name: name.to_string(),
        defs: DagNode::new("defs").arg(t("root", root)),
        match_: DagNode::new("match").args(matches),
        apply: DagNode::new("apply").args(applies),
    }
}

pub fn fragment(
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

/// A registry holding `fragments` and `rules`, compiled sequentially.
pub struct Compiled {
    pub registry: Registry,
    pub report: CompileReport,
}

impl Compiled {
    pub fn new(fragments: Vec<FragmentDecl>, rules: Vec<RuleDecl>) -> Self {
        let mut registry = Registry::with_generic_opcodes();
        for decl in fragments {
            registry.register_fragment(decl);
        }
        for decl in rules {
            registry.register_rule(decl);
        }
        let report = registry.compile(&CompileOptions::default());
        Compiled { registry, report }
    }

    pub fn name(&self, s: &str) -> Name {
        self.registry.interner().intern(s)
    }

    /// The program of rule `name`, which must have compiled.
    pub fn program(&self, name: &str) -> &RuleProgram {
        let codes = self.codes();
        self.report
            .program(self.name(name))
            .unwrap_or_else(|| panic!("rule `{name}` failed to compile: {codes:?}"))
    }

    pub fn codes(&self) -> Vec<ErrorCode> {
        self.report.diagnostics.iter().map(|diag| diag.code).collect()
    }
}
