//! Operand table and type inference.
//!
//! One table exists per compilation unit: a fragment alternative, or one
//! expanded branch of a rule (match and apply lists together, since apply
//! refers to names bound by match). Tables are never shared across units.
//!
//! # Inference
//!
//! A single left-to-right pass gives every operand name the first explicit
//! type seen among its occurrences, then every explicitly typed occurrence
//! is re-checked against that type. There is no unification across distinct
//! concrete types: two different explicit types for one name are a
//! [`PatternError::TypeConflict`].

use rustc_hash::FxHashMap;

use combc_ir::{Llt, Name, PatternList, PatternOperand, Role};

use crate::{PatternError, PatternProblem};

/// Binding metadata for one operand name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    /// Resolved type, `None` if no occurrence carries one.
    pub ty: Option<Llt>,
    /// Role of the first occurrence.
    pub first_role: Role,
    /// Pattern of the first occurrence, `None` for seeded names.
    pub first_pattern: Option<Name>,
    /// Whether the name occurs as an operand of an instruction pattern.
    pub bound: bool,
}

/// A type constraint on a name that is not an operand occurrence of its
/// own: a typed fragment input parameter, or a typed actual whose use-site
/// pattern was replaced by a fragment body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeSeed {
    pub operand: Name,
    pub ty: Llt,
    /// Pattern the constraint was written in, if any.
    pub pattern: Option<Name>,
}

impl TypeSeed {
    pub fn new(operand: Name, ty: Llt) -> Self {
        TypeSeed {
            operand,
            ty,
            pattern: None,
        }
    }

    #[must_use]
    pub fn at(self, pattern: Name) -> Self {
        TypeSeed {
            pattern: Some(pattern),
            ..self
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Occurrence {
    name: Name,
    ty: Option<Llt>,
    pattern: Option<Name>,
}

/// Per-unit map from operand name to [`Binding`].
#[derive(Clone, Debug, Default)]
pub struct OperandTable {
    bindings: FxHashMap<Name, Binding>,
    /// Names in first-seen order.
    order: Vec<Name>,
    occurrences: Vec<Occurrence>,
}

impl OperandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a [`TypeSeed`]. Seeds come before every occurrence in the
    /// resolution order.
    pub fn seed(&mut self, seed: TypeSeed) {
        self.entry(seed.operand, Role::Use, None, false);
        self.occurrences.push(Occurrence {
            name: seed.operand,
            ty: Some(seed.ty),
            pattern: seed.pattern,
        });
    }

    /// Record one operand occurrence inside `pattern`.
    ///
    /// Anonymous operands and immediates are not named bindings and are
    /// ignored.
    pub fn declare(&mut self, operand: &PatternOperand, pattern: Name) {
        if !operand.binds() {
            return;
        }
        let binding = self.entry(operand.name, operand.role, Some(pattern), true);
        binding.bound = true;
        self.occurrences.push(Occurrence {
            name: operand.name,
            ty: operand.ty,
            pattern: Some(pattern),
        });
    }

    fn entry(
        &mut self,
        name: Name,
        role: Role,
        pattern: Option<Name>,
        bound: bool,
    ) -> &mut Binding {
        let order = &mut self.order;
        self.bindings.entry(name).or_insert_with(|| {
            order.push(name);
            Binding {
                ty: None,
                first_role: role,
                first_pattern: pattern,
                bound,
            }
        })
    }

    /// Assign each name its first explicit type, then validate every
    /// explicit occurrence against it.
    pub fn resolve(&mut self) -> Result<(), PatternProblem> {
        for occ in &self.occurrences {
            if let (Some(ty), Some(binding)) = (occ.ty, self.bindings.get_mut(&occ.name)) {
                binding.ty.get_or_insert(ty);
            }
        }

        for occ in &self.occurrences {
            let (Some(ty), Some(resolved)) = (occ.ty, self.type_of(occ.name)) else {
                continue;
            };
            if ty != resolved {
                let problem = PatternProblem::new(PatternError::TypeConflict {
                    operand: occ.name,
                    first: resolved,
                    second: ty,
                });
                return Err(match occ.pattern {
                    Some(pattern) => problem.in_pattern(pattern),
                    None => problem,
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, name: Name) -> Option<&Binding> {
        self.bindings.get(&name)
    }

    pub fn contains(&self, name: Name) -> bool {
        self.bindings.contains_key(&name)
    }

    pub fn type_of(&self, name: Name) -> Option<Llt> {
        self.bindings.get(&name).and_then(|binding| binding.ty)
    }

    /// Names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = Name> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Run inference over the instruction patterns of `lists`, in order, and
/// write the resolved types back into every named operand.
///
/// Untyped names with no typed occurrence stay untyped.
pub fn infer_types(
    lists: &mut [&mut PatternList],
    seeds: &[TypeSeed],
) -> Result<OperandTable, PatternProblem> {
    let mut table = OperandTable::new();
    for &seed in seeds {
        table.seed(seed);
    }
    for list in lists.iter() {
        for instr in list.instrs() {
            for operand in &instr.operands {
                table.declare(operand, instr.name);
            }
        }
    }

    table.resolve()?;

    for list in lists.iter_mut() {
        for instr in list.instrs_mut() {
            for operand in &mut instr.operands {
                if operand.binds() && operand.ty.is_none() {
                    operand.ty = table.type_of(operand.name);
                }
            }
        }
    }

    tracing::trace!(names = table.len(), "resolved operand types");
    Ok(table)
}
