//! Ingested declarations: combine rules and pattern fragments.
//!
//! Both are built once from their record DAG and never mutated afterwards.
//! Compilation works on clones of their pattern lists.

use crate::{Llt, Name, PatternList};

/// Native value declared in `defs` and shared between match and apply
/// snippets.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MatchData {
    pub name: Name,
    /// Native type, opaque to the compiler.
    pub native_type: String,
}

/// A named match + apply pair describing one rewrite.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombineRule {
    pub name: Name,
    /// Root operand name or root pattern name.
    pub root: Name,
    pub match_data: Vec<MatchData>,
    pub match_patterns: PatternList,
    pub apply_patterns: PatternList,
}

/// Kind of a fragment output parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OutParamKind {
    Operand,
    Root,
}

/// Kind of a fragment input parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InParamKind {
    /// `gi_mo`, optionally constrained to a type.
    Operand(Option<Llt>),
    /// `gi_imm`: the actual must be an immediate literal.
    Immediate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OutParam {
    pub name: Name,
    pub kind: OutParamKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InParam {
    pub name: Name,
    pub kind: InParamKind,
}

/// A reusable, parameterized, multi-alternative pattern fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternFragment {
    pub name: Name,
    pub out_params: Vec<OutParam>,
    pub in_params: Vec<InParam>,
    /// Candidate bodies, tried in declaration order.
    pub alternatives: Vec<PatternList>,
}

impl PatternFragment {
    /// Number of actual operands a use site must supply.
    pub fn arity(&self) -> usize {
        self.out_params.len() + self.in_params.len()
    }

    /// The `root`-kind output parameter, if any.
    pub fn root_param(&self) -> Option<&OutParam> {
        self.out_params
            .iter()
            .find(|param| param.kind == OutParamKind::Root)
    }

    /// Position of `name` among the input parameters.
    pub fn in_param_index(&self, name: Name) -> Option<usize> {
        self.in_params.iter().position(|param| param.name == name)
    }

    /// Whether `name` is one of the formal parameters.
    pub fn is_param(&self, name: Name) -> bool {
        self.out_params.iter().any(|param| param.name == name)
            || self.in_param_index(name).is_some()
    }
}
