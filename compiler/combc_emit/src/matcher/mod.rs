//! Match-program emission.
//!
//! Walks a concrete match list from the root instruction toward the
//! instructions defining its operands. The root is matched in slot 0; each
//! further instruction is reached through [`MatchOp::RecordDefiningInsn`]
//! on a use whose register it defines, so a def is always captured before
//! anything that depends on it is checked.
//!
//! Per operand:
//! - typed: [`MatchOp::CheckType`]
//! - literal: [`MatchOp::CheckImm`]
//! - first occurrence of a name: [`MatchOp::Capture`]
//! - later occurrences: [`MatchOp::CheckSameOperand`] against the capture
//!
//! Native predicates run last, after every structural check.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use combc_ir::{
    InsnId, MatchData, MatchOp, MatcherProgram, Name, OperandKind, Operator, PatternInstr,
    PatternItem, PatternList, Role, StringInterner,
};
use combc_patterns::{InPattern, PatternError, PatternProblem};

use crate::{operand_index, SnippetScope};

/// What the matcher captured, for the apply emitter and snippets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchBindings {
    /// First capture of each operand name.
    operands: FxHashMap<Name, (InsnId, u32)>,
    /// Slot of each matched pattern.
    patterns: FxHashMap<Name, InsnId>,
    /// Names the apply program must redefine.
    root_defs: SmallVec<[Name; 2]>,
}

impl MatchBindings {
    /// Location of the first capture of `name`.
    pub fn operand(&self, name: Name) -> Option<(InsnId, u32)> {
        self.operands.get(&name).copied()
    }

    /// Slot of matched pattern `name`.
    pub fn pattern(&self, name: Name) -> Option<InsnId> {
        self.patterns.get(&name).copied()
    }

    pub fn is_captured(&self, name: Name) -> bool {
        self.operands.contains_key(&name)
    }

    /// The root operand, or every named def of the root pattern when the
    /// root names a pattern.
    pub fn root_defs(&self) -> &[Name] {
        &self.root_defs
    }

    pub fn is_root_def(&self, name: Name) -> bool {
        self.root_defs.contains(&name)
    }

    /// Number of matched instruction slots.
    pub fn insn_count(&self) -> usize {
        self.patterns.len()
    }
}

/// Emit the matcher for a concrete (fully expanded) match list.
pub fn emit_matcher(
    list: &PatternList,
    root: Name,
    match_data: &[MatchData],
    interner: &StringInterner,
) -> Result<(MatcherProgram, MatchBindings), PatternProblem> {
    let mut emitter = MatchEmitter::new(list, root)?;
    let root_index = emitter.root;
    emitter.walk(root_index, InsnId::new(0), None)?;

    if let Some(index) = emitter.visited.iter().position(|seen| !seen) {
        let pattern = emitter.instrs[index].name;
        return Err(PatternProblem::new(PatternError::UnreachablePattern { pattern })
            .in_pattern(pattern));
    }

    let MatchEmitter {
        mut ops, bindings, ..
    } = emitter;

    let scope = SnippetScope::matcher(interner, &bindings, match_data);
    for item in &list.items {
        if let PatternItem::Code(snippet) = item {
            ops.push(MatchOp::CheckCustom {
                code: scope.render(snippet)?,
            });
        }
    }

    tracing::trace!(
        ops = ops.len(),
        insns = bindings.insn_count(),
        "emitted matcher"
    );
    Ok((MatcherProgram { ops }, bindings))
}

struct MatchEmitter<'a> {
    instrs: Vec<&'a PatternInstr>,
    /// Operand name to index of the instruction defining it.
    definers: FxHashMap<Name, usize>,
    root: usize,
    visited: Vec<bool>,
    next_insn: u32,
    ops: Vec<MatchOp>,
    bindings: MatchBindings,
}

impl<'a> MatchEmitter<'a> {
    fn new(list: &'a PatternList, root: Name) -> Result<Self, PatternProblem> {
        let instrs: Vec<&PatternInstr> = list.instrs().collect();

        let mut definers = FxHashMap::default();
        let mut names = FxHashMap::default();
        for (index, instr) in instrs.iter().enumerate() {
            if let Operator::Fragment(_) = instr.operator {
                return Err(PatternError::Internal {
                    message: "fragment use survived expansion".to_string(),
                }
                .into());
            }
            if names.insert(instr.name, index).is_some() {
                return Err(PatternProblem::new(PatternError::DuplicateDefinition {
                    name: instr.name,
                })
                .in_pattern(instr.name));
            }
            for def in instr.defs().filter(|op| op.binds()) {
                if definers.insert(def.name, index).is_some() {
                    return Err(PatternProblem::new(PatternError::DuplicateDefinition {
                        name: def.name,
                    })
                    .in_pattern(instr.name));
                }
            }
        }

        let by_pattern = names.get(&root).copied();
        let Some(root_index) = by_pattern.or_else(|| definers.get(&root).copied()) else {
            return Err(PatternError::InvalidRoot {
                root: Some(root),
                roots: 1,
            }
            .into());
        };

        let root_defs = if by_pattern.is_some() {
            instrs[root_index]
                .defs()
                .filter(|op| op.binds())
                .map(|op| op.name)
                .collect()
        } else {
            SmallVec::from_elem(root, 1)
        };

        Ok(MatchEmitter {
            visited: vec![false; instrs.len()],
            instrs,
            definers,
            root: root_index,
            next_insn: 1,
            ops: Vec::new(),
            bindings: MatchBindings {
                root_defs,
                ..MatchBindings::default()
            },
        })
    }

    /// Emit checks for `instrs[index]` matched in `insn`, then descend into
    /// the instructions defining its uses. `via` is the def operand through
    /// which this instruction was reached.
    fn walk(&mut self, index: usize, insn: InsnId, via: Option<usize>) -> Result<(), PatternProblem> {
        self.visited[index] = true;
        let instr = self.instrs[index];
        self.bindings.patterns.insert(instr.name, insn);

        self.ops.push(MatchOp::CheckStructure {
            insn,
            opcode: instr.operator.name(),
            num_defs: operand_index(instr.num_defs()),
            num_uses: operand_index(instr.num_uses()),
        });

        let mut descend = Vec::new();
        for (position, operand) in instr.operands.iter().enumerate() {
            if via == Some(position) {
                continue;
            }
            let slot = operand_index(position);

            if let Some(ty) = operand.ty {
                self.ops.push(MatchOp::CheckType {
                    insn,
                    operand: slot,
                    ty,
                });
            }

            match operand.kind {
                OperandKind::Immediate(value) => self.ops.push(MatchOp::CheckImm {
                    insn,
                    operand: slot,
                    value,
                }),
                OperandKind::Register if !operand.binds() => {}
                OperandKind::Register => {
                    if let Some((other_insn, other_operand)) = self.bindings.operand(operand.name) {
                        self.ops.push(MatchOp::CheckSameOperand {
                            insn,
                            operand: slot,
                            other_insn,
                            other_operand,
                        });
                        continue;
                    }
                    self.ops.push(MatchOp::Capture {
                        name: operand.name,
                        insn,
                        operand: slot,
                    });
                    self.bindings.operands.insert(operand.name, (insn, slot));
                    if operand.role == Role::Use {
                        descend.push((slot, operand.name));
                    }
                }
            }
        }

        for (slot, name) in descend {
            let Some(&def_index) = self.definers.get(&name) else {
                continue;
            };
            if self.visited[def_index] {
                continue;
            }
            let def_insn = InsnId::new(self.next_insn);
            self.next_insn += 1;
            self.ops.push(MatchOp::RecordDefiningInsn {
                insn: def_insn,
                from: insn,
                operand: slot,
            });

            let def_instr = self.instrs[def_index];
            let via = def_instr
                .operands
                .iter()
                .position(|op| op.role == Role::Def && op.binds() && op.name == name);
            self.walk(def_index, def_insn, via)
                .in_pattern(def_instr.name)?;
        }
        Ok(())
    }
}
