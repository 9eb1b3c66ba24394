//! Fragment validation.
//!
//! Each fragment is lowered and validated exactly once, before any rule is
//! compiled. The result (or the failure) is memoized in a [`FragmentSet`]
//! that rules consult read-only, so rules can be compiled concurrently.

use rustc_hash::{FxHashMap, FxHashSet};

use combc_ir::dag::FragmentDecl;
use combc_ir::{InParamKind, InstrInfo, Name, OutParamKind, PatternFragment, StringInterner};

use crate::lower::{FragmentSig, Lowerer};
use crate::operands::{infer_types, TypeSeed};
use crate::{OperandClass, PatternError, PatternProblem};

/// A validated fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentInfo {
    /// The fragment, with operand types resolved per alternative.
    pub fragment: PatternFragment,
    /// Per alternative: the input parameters it binds.
    pub bound: Vec<FxHashSet<Name>>,
}

impl FragmentInfo {
    /// Whether every alternative binds input parameter `param`.
    pub fn binds_everywhere(&self, param: Name) -> bool {
        self.bound.iter().all(|bound| bound.contains(&param))
    }

    /// First alternative that leaves `param` unbound.
    pub fn first_unbinding(&self, param: Name) -> Option<usize> {
        self.bound.iter().position(|bound| !bound.contains(&param))
    }
}

/// Validate a lowered fragment.
///
/// Checks the root count, runs independent inference over every
/// alternative, requires every out-param to be defined wherever
/// instructions are present, forbids defining in-params, and classifies
/// each in-param as bound or unbound per alternative.
pub fn validate_fragment(mut fragment: PatternFragment) -> Result<FragmentInfo, PatternProblem> {
    let roots = fragment
        .out_params
        .iter()
        .filter(|param| param.kind == OutParamKind::Root)
        .count();
    let has_instrs = fragment.alternatives.iter().any(|alt| alt.has_instrs());
    if roots > 1 || (roots == 0 && has_instrs) {
        return Err(PatternError::MultiRootFragment {
            fragment: fragment.name,
            roots,
        }
        .into());
    }

    let seeds: Vec<TypeSeed> = fragment
        .in_params
        .iter()
        .filter_map(|param| match param.kind {
            InParamKind::Operand(Some(ty)) => Some(TypeSeed::new(param.name, ty)),
            InParamKind::Operand(None) | InParamKind::Immediate => None,
        })
        .collect();

    let mut bound = Vec::with_capacity(fragment.alternatives.len());
    for (index, alt) in fragment.alternatives.iter_mut().enumerate() {
        infer_types(&mut [&mut *alt], &seeds)?;

        if alt.has_instrs() {
            for param in &fragment.out_params {
                if !alt.instrs().any(|instr| instr.defines(param.name)) {
                    return Err(PatternError::UnboundOperand {
                        operand: param.name,
                        fragment: Some(fragment.name),
                        param: Some(param.name),
                        alternative: Some(index),
                    }
                    .into());
                }
            }
        }

        let mut alt_bound = FxHashSet::default();
        for param in &fragment.in_params {
            if let Some(instr) = alt.instrs().find(|instr| instr.defines(param.name)) {
                return Err(PatternProblem::new(PatternError::OperandKindMismatch {
                    operand: Some(param.name),
                    expected: OperandClass::UseOnly,
                    found: OperandClass::Definition,
                })
                .in_pattern(instr.name));
            }
            if alt.mentions(param.name) {
                alt_bound.insert(param.name);
            }
        }
        bound.push(alt_bound);
    }

    Ok(FragmentInfo { fragment, bound })
}

/// Every declared fragment, lowered and validated once.
#[derive(Clone, Debug, Default)]
pub struct FragmentSet {
    sigs: FxHashMap<Name, FragmentSig>,
    entries: FxHashMap<Name, Result<FragmentInfo, PatternProblem>>,
    /// Declaration order, one entry per declaration (duplicates included).
    order: Vec<(Name, Option<PatternProblem>)>,
}

impl FragmentSet {
    /// Lower and validate `decls`.
    ///
    /// A later declaration reusing an earlier name is reported as a
    /// duplicate and does not replace the first one.
    pub fn build(
        decls: &[FragmentDecl],
        interner: &StringInterner,
        instrs: &dyn InstrInfo,
    ) -> FragmentSet {
        let mut sigs = FxHashMap::default();
        for decl in decls {
            sigs.entry(interner.intern(&decl.name))
                .or_insert_with(|| FragmentSig::of(decl));
        }

        let mut entries = FxHashMap::default();
        let mut order = Vec::with_capacity(decls.len());
        for decl in decls {
            let name = interner.intern(&decl.name);
            if entries.contains_key(&name) {
                order.push((
                    name,
                    Some(PatternError::DuplicateDefinition { name }.into()),
                ));
                continue;
            }

            let result = Lowerer::new(interner, instrs, &sigs)
                .lower_fragment(decl)
                .and_then(validate_fragment);
            match &result {
                Ok(info) => tracing::debug!(
                    fragment = %decl.name,
                    alternatives = info.fragment.alternatives.len(),
                    "validated fragment"
                ),
                Err(problem) => tracing::debug!(
                    fragment = %decl.name,
                    code = %problem.code(),
                    "fragment failed validation"
                ),
            }
            order.push((name, result.as_ref().err().cloned()));
            entries.insert(name, result);
        }

        FragmentSet {
            sigs,
            entries,
            order,
        }
    }

    /// Operand signatures of every declared fragment.
    pub fn signatures(&self) -> &FxHashMap<Name, FragmentSig> {
        &self.sigs
    }

    /// The validated fragment `name`.
    ///
    /// A fragment that failed its own validation yields
    /// [`PatternError::BrokenFragment`]; its diagnostic is reported by
    /// [`failures`](Self::failures), once.
    pub fn lookup(&self, name: Name) -> Result<&FragmentInfo, PatternError> {
        match self.entries.get(&name) {
            Some(Ok(info)) => Ok(info),
            Some(Err(_)) => Err(PatternError::BrokenFragment { fragment: name }),
            None => Err(PatternError::UnknownOperator { operator: name }),
        }
    }

    pub fn contains(&self, name: Name) -> bool {
        self.entries.contains_key(&name)
    }

    /// Failed declarations in declaration order.
    pub fn failures(&self) -> impl Iterator<Item = (Name, &PatternProblem)> {
        self.order
            .iter()
            .filter_map(|(name, problem)| problem.as_ref().map(|problem| (*name, problem)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
