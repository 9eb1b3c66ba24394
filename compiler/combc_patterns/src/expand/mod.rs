//! Pattern-fragment expansion.
//!
//! A match list that uses fragments stands for the disjunction of every
//! combination of their alternatives. Expansion produces one independent
//! copy of the list per combination, each with the chosen alternative
//! bodies spliced in place of the fragment uses and the formal parameters
//! substituted by the actual operands.
//!
//! # Order
//!
//! Combinations are produced in declaration order with the first fragment
//! use varying slowest, so the first expansion picks alternative 0
//! everywhere. Callers try expansions in this order; the first that
//! matches wins.
//!
//! # Naming
//!
//! Internal names of an instantiated body are prefixed with the use-site
//! pattern name (`<use>.<internal>`), except the instruction defining the
//! root out-param, which takes the use-site name itself. A rule root that
//! names a fragment use therefore resolves to that instruction.
//!
//! # Types at the use site
//!
//! Splicing replaces the use-site pattern, so its typed actuals and the
//! fragment's typed input parameters no longer occur as operands. They are
//! kept as [`TypeSeed`]s on the expansion and must be fed to joint
//! inference together with the expanded list.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use combc_ir::{
    Group, InParamKind, Name, OperandKind, Operator, OutParamKind, PatternInstr, PatternItem,
    PatternList, PatternOperand, SnippetPart, StringInterner,
};

use crate::fragment::{FragmentInfo, FragmentSet};
use crate::{InPattern, OperandClass, PatternError, PatternProblem, TypeSeed};

/// One fully concrete copy of a pattern list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expansion {
    pub list: PatternList,
    /// Alternative chosen for each fragment use, in use order.
    pub choices: SmallVec<[usize; 4]>,
    /// Type constraints of the replaced use sites.
    pub seeds: Vec<TypeSeed>,
}

/// A fragment use found in the list being expanded.
struct FragmentUse<'f> {
    /// Item index in the source list.
    item: usize,
    info: &'f FragmentInfo,
}

/// Reject fragment uses in a list that must be concrete.
///
/// Apply lists build instructions; a fragment there has no meaning.
pub fn ensure_concrete(list: &PatternList) -> Result<(), PatternProblem> {
    for instr in list.instrs() {
        if let Operator::Fragment(name) = instr.operator {
            return Err(PatternProblem::new(PatternError::UnsupportedRewrite { operand: name })
                .in_pattern(instr.name));
        }
    }
    Ok(())
}

/// Expand every fragment use in `list`.
///
/// Always returns at least one expansion; a list without fragment uses
/// yields itself.
pub fn expand_fragments(
    list: &PatternList,
    fragments: &FragmentSet,
    interner: &StringInterner,
) -> Result<Vec<Expansion>, PatternProblem> {
    if list.group == Group::Apply {
        ensure_concrete(list)?;
    }

    let uses = collect_uses(list, fragments)?;
    if uses.is_empty() {
        return Ok(vec![Expansion {
            list: list.clone(),
            choices: SmallVec::new(),
            seeds: Vec::new(),
        }]);
    }

    check_actuals(list, &uses)?;

    let counts: SmallVec<[usize; 4]> = uses
        .iter()
        .map(|u| u.info.fragment.alternatives.len())
        .collect();
    let total: usize = counts.iter().product();

    let mut expansions = Vec::with_capacity(total);
    let mut choices: SmallVec<[usize; 4]> = SmallVec::from_elem(0, uses.len());
    loop {
        expansions.push(instantiate(list, &uses, &choices, interner)?);
        if !advance(&mut choices, &counts) {
            break;
        }
    }

    tracing::debug!(
        uses = uses.len(),
        expansions = expansions.len(),
        "expanded fragment uses"
    );
    Ok(expansions)
}

fn collect_uses<'f>(
    list: &PatternList,
    fragments: &'f FragmentSet,
) -> Result<Vec<FragmentUse<'f>>, PatternProblem> {
    let mut uses = Vec::new();
    for (item, entry) in list.items.iter().enumerate() {
        let PatternItem::Instr(instr) = entry else {
            continue;
        };
        let Operator::Fragment(name) = instr.operator else {
            continue;
        };
        let info = fragments.lookup(name).in_pattern(instr.name)?;
        if instr.operands.len() != info.fragment.arity() {
            return Err(PatternProblem::new(PatternError::ArityMismatch {
                operator: name,
                expected: info.fragment.arity(),
                found: instr.operands.len(),
                variadic: false,
            })
            .in_pattern(instr.name));
        }
        uses.push(FragmentUse { item, info });
    }
    Ok(uses)
}

/// Kind and boundness checks for every fragment use.
///
/// Names appearing in concrete instructions are bound from the start.
/// Fragment uses are checked in declaration order and their actuals count
/// as bound for the uses after them.
fn check_actuals(list: &PatternList, uses: &[FragmentUse<'_>]) -> Result<(), PatternProblem> {
    let mut bound: FxHashSet<Name> = list
        .instrs()
        .filter(|instr| matches!(instr.operator, Operator::Instr(_)))
        .flat_map(|instr| instr.operands.iter())
        .filter(|operand| operand.binds())
        .map(|operand| operand.name)
        .collect();

    for fragment_use in uses {
        let PatternItem::Instr(instr) = &list.items[fragment_use.item] else {
            continue;
        };
        let fragment = &fragment_use.info.fragment;
        let (outs, ins) = instr.operands.split_at(fragment.out_params.len());

        for actual in outs {
            if actual.kind != OperandKind::Register {
                return Err(PatternProblem::new(PatternError::OperandKindMismatch {
                    operand: None,
                    expected: OperandClass::Register,
                    found: OperandClass::Immediate,
                })
                .in_pattern(instr.name));
            }
        }

        for (param, actual) in fragment.in_params.iter().zip(ins) {
            if param.kind == InParamKind::Immediate && actual.immediate().is_none() {
                return Err(PatternProblem::new(PatternError::OperandKindMismatch {
                    operand: Some(actual.name),
                    expected: OperandClass::Immediate,
                    found: OperandClass::Register,
                })
                .in_pattern(instr.name));
            }
            if actual.binds() && !bound.contains(&actual.name) {
                if let Some(alternative) = fragment_use.info.first_unbinding(param.name) {
                    return Err(PatternProblem::new(PatternError::UnboundOperand {
                        operand: actual.name,
                        fragment: Some(fragment.name),
                        param: Some(param.name),
                        alternative: Some(alternative),
                    })
                    .in_pattern(instr.name));
                }
            }
        }

        bound.extend(
            instr
                .operands
                .iter()
                .filter(|operand| operand.binds())
                .map(|operand| operand.name),
        );
    }
    Ok(())
}

/// Step `choices` to the next combination, last use fastest. Returns
/// `false` after the final combination.
fn advance(choices: &mut [usize], counts: &[usize]) -> bool {
    for (choice, &count) in choices.iter_mut().zip(counts).rev() {
        *choice += 1;
        if *choice < count {
            return true;
        }
        *choice = 0;
    }
    false
}

fn instantiate(
    list: &PatternList,
    uses: &[FragmentUse<'_>],
    choices: &[usize],
    interner: &StringInterner,
) -> Result<Expansion, PatternProblem> {
    let mut out = PatternList::new(list.group);
    let mut seeds = Vec::new();
    let mut pending = uses.iter().zip(choices.iter().copied()).peekable();

    for (index, item) in list.items.iter().enumerate() {
        if let Some(&(fragment_use, alternative)) = pending.peek() {
            if fragment_use.item == index {
                let PatternItem::Instr(instr) = item else {
                    return Err(PatternError::Internal {
                        message: "fragment use is not an instruction".to_string(),
                    }
                    .into());
                };
                let substitution = Substitution::new(fragment_use.info, instr, interner);
                substitution.splice(alternative, &mut out.items)?;
                seeds.extend(substitution.seeds());
                pending.next();
                continue;
            }
        }
        out.items.push(item.clone());
    }

    Ok(Expansion {
        list: out,
        choices: choices.iter().copied().collect(),
        seeds,
    })
}

/// Formal-to-actual mapping for one fragment use.
struct Substitution<'a> {
    info: &'a FragmentInfo,
    actuals: FxHashMap<Name, &'a PatternOperand>,
    /// The use-site pattern.
    site: &'a PatternInstr,
    root: Option<Name>,
    interner: &'a StringInterner,
}

impl<'a> Substitution<'a> {
    fn new(info: &'a FragmentInfo, site: &'a PatternInstr, interner: &'a StringInterner) -> Self {
        let fragment = &info.fragment;
        let formals = fragment
            .out_params
            .iter()
            .map(|param| param.name)
            .chain(fragment.in_params.iter().map(|param| param.name));
        let actuals = formals.zip(site.operands.iter()).collect();
        let root = fragment
            .out_params
            .iter()
            .find(|param| param.kind == OutParamKind::Root)
            .map(|param| param.name);
        Substitution {
            info,
            actuals,
            site,
            root,
            interner,
        }
    }

    fn internal(&self, name: Name) -> Name {
        let site = self.interner.lookup(self.site.name);
        let name = self.interner.lookup(name);
        self.interner.intern(&format!("{site}.{name}"))
    }

    fn splice(&self, alternative: usize, items: &mut Vec<PatternItem>) -> Result<(), PatternProblem> {
        let Some(body) = self.info.fragment.alternatives.get(alternative) else {
            return Err(PatternError::Internal {
                message: format!("fragment alternative {alternative} out of range"),
            }
            .into());
        };

        let mut patterns: FxHashMap<Name, Name> = FxHashMap::default();
        for instr in body.instrs() {
            let defines_root = self.root.is_some_and(|root| instr.defines(root));
            let renamed = if defines_root && !patterns.values().any(|&n| n == self.site.name) {
                self.site.name
            } else {
                self.internal(instr.name)
            };
            patterns.insert(instr.name, renamed);
        }

        for item in &body.items {
            match item {
                PatternItem::Instr(instr) => {
                    let operands = instr
                        .operands
                        .iter()
                        .map(|operand| self.operand(operand))
                        .collect();
                    items.push(PatternItem::Instr(PatternInstr {
                        operator: instr.operator,
                        name: patterns
                            .get(&instr.name)
                            .copied()
                            .unwrap_or_else(|| self.internal(instr.name)),
                        operands,
                    }));
                }
                PatternItem::Code(code) => {
                    items.push(PatternItem::Code(code.map_placeholders(|name| {
                        self.placeholder(body, &patterns, name)
                    })));
                }
            }
        }
        Ok(())
    }

    /// Types the use site puts on its named actuals: the actual's own
    /// annotation, and the declared type of a typed input parameter.
    fn seeds(&self) -> impl Iterator<Item = TypeSeed> + '_ {
        let fragment = &self.info.fragment;
        let (outs, ins) = self.site.operands.split_at(fragment.out_params.len());
        let declared = fragment.in_params.iter().zip(ins).filter_map(|(param, actual)| {
            match param.kind {
                InParamKind::Operand(Some(ty)) => Some((actual, ty)),
                InParamKind::Operand(None) | InParamKind::Immediate => None,
            }
        });
        let annotated = outs
            .iter()
            .chain(ins)
            .filter_map(|actual| actual.ty.map(|ty| (actual, ty)));
        declared
            .chain(annotated)
            .filter(|(actual, _)| actual.binds())
            .map(|(actual, ty)| TypeSeed::new(actual.name, ty).at(self.site.name))
    }

    fn operand(&self, operand: &PatternOperand) -> PatternOperand {
        if operand.binds() {
            if let Some(actual) = self.actuals.get(&operand.name) {
                return PatternOperand {
                    name: actual.name,
                    anonymous: actual.anonymous,
                    kind: actual.kind,
                    ty: operand.ty.or(actual.ty),
                    role: operand.role,
                };
            }
        }
        PatternOperand {
            name: self.internal(operand.name),
            ..operand.clone()
        }
    }

    fn placeholder(
        &self,
        body: &PatternList,
        patterns: &FxHashMap<Name, Name>,
        name: Name,
    ) -> SnippetPart {
        if let Some(&renamed) = patterns.get(&name) {
            return SnippetPart::Placeholder(renamed);
        }
        if let Some(actual) = self.actuals.get(&name) {
            return match actual.immediate() {
                Some(value) => SnippetPart::Text(value.to_string()),
                None => SnippetPart::Placeholder(actual.name),
            };
        }
        if body.mentions(name) {
            return SnippetPart::Placeholder(self.internal(name));
        }
        SnippetPart::Placeholder(name)
    }
}
