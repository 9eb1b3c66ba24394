//! Apply-program emission.
//!
//! Processes the apply list in declaration order and emits the operations
//! that build the replacement instructions. A pre-pass classifies every
//! def first:
//!
//! - root defs must be written exactly once across the whole apply list
//! - defs of other matched names are rejected (only the root is rewritten)
//! - any other def is a new temporary register and needs a known type
//!
//! Typed immediates outside a constant-defining instruction are hoisted:
//! a constant instruction of that type is built first and its result
//! register is used in their place.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use combc_ir::{
    ApplyOp, ApplyProgram, InstrInfo, Llt, MatchData, Name, OperandKind, Operator, OutInsnId,
    PatternInstr, PatternItem, PatternList, Role, StringInterner, TempRegId,
};
use combc_patterns::{InPattern, PatternError, PatternProblem};

use crate::{operand_index, MatchBindings, SnippetScope};

/// Emit the apply program for `list`.
///
/// `root` is the rule root as declared, used for diagnostics when the root
/// pattern has no named defs.
pub fn emit_apply(
    list: &PatternList,
    root: Name,
    bindings: &MatchBindings,
    match_data: &[MatchData],
    instrs: &dyn InstrInfo,
    interner: &StringInterner,
) -> Result<ApplyProgram, PatternProblem> {
    let temps = classify_defs(list, root, bindings)?;

    let mut emitter = ApplyEmitter {
        interner,
        instrs,
        bindings,
        constant_opcode: interner.intern(instrs.constant_opcode()),
        temps: temps.names,
        next_temp: temps.types.len(),
        next_out: 0,
        built: FxHashMap::default(),
        ops: Vec::new(),
    };

    for (index, ty) in temps.types.into_iter().enumerate() {
        emitter.ops.push(ApplyOp::MakeTempReg {
            temp: TempRegId::new(operand_index(index)),
            ty,
        });
    }

    for item in &list.items {
        match item {
            PatternItem::Instr(instr) => emitter.build(instr).in_pattern(instr.name)?,
            PatternItem::Code(snippet) => {
                let scope = SnippetScope {
                    interner,
                    bindings,
                    match_data,
                    built: Some(&emitter.built),
                    temps: Some(&emitter.temps),
                };
                let code = scope.render(snippet)?;
                emitter.ops.push(ApplyOp::Custom { code });
            }
        }
    }

    if emitter.next_out > 0 {
        emitter.ops.push(ApplyOp::EraseRoot);
    }

    tracing::trace!(ops = emitter.ops.len(), built = emitter.next_out, "emitted apply");
    Ok(ApplyProgram { ops: emitter.ops })
}

/// Temporary registers found by the pre-pass, in def order.
struct Temps {
    names: FxHashMap<Name, TempRegId>,
    types: Vec<Llt>,
}

fn classify_defs(
    list: &PatternList,
    root: Name,
    bindings: &MatchBindings,
) -> Result<Temps, PatternProblem> {
    let root_defs = bindings.root_defs();
    let mut root_counts: SmallVec<[usize; 2]> = SmallVec::from_elem(0, root_defs.len());
    let mut temps = Temps {
        names: FxHashMap::default(),
        types: Vec::new(),
    };

    for instr in list.instrs() {
        if let Operator::Fragment(name) = instr.operator {
            return Err(PatternProblem::new(PatternError::UnsupportedRewrite { operand: name })
                .in_pattern(instr.name));
        }
        for def in instr.defs() {
            if def.binds() {
                if let Some(index) = root_defs.iter().position(|&name| name == def.name) {
                    root_counts[index] += 1;
                    continue;
                }
                if bindings.is_captured(def.name) {
                    return Err(PatternProblem::new(PatternError::UnsupportedRewrite {
                        operand: def.name,
                    })
                    .in_pattern(instr.name));
                }
            }
            if temps.names.contains_key(&def.name) {
                return Err(PatternProblem::new(PatternError::DuplicateDefinition {
                    name: def.name,
                })
                .in_pattern(instr.name));
            }
            let Some(ty) = def.ty else {
                return Err(PatternProblem::new(PatternError::UntypedTempRegister {
                    operand: def.name,
                })
                .in_pattern(instr.name));
            };
            let temp = TempRegId::new(operand_index(temps.types.len()));
            temps.names.insert(def.name, temp);
            temps.types.push(ty);
        }
    }

    if list.has_instrs() {
        for (&name, &definitions) in root_defs.iter().zip(&root_counts) {
            if definitions != 1 {
                return Err(PatternError::RootNotRedefined {
                    root: name,
                    definitions,
                }
                .into());
            }
        }
    } else if list.items.is_empty() {
        return Err(PatternError::RootNotRedefined {
            root: root_defs.first().copied().unwrap_or(root),
            definitions: 0,
        }
        .into());
    }

    Ok(temps)
}

struct ApplyEmitter<'a> {
    interner: &'a StringInterner,
    instrs: &'a dyn InstrInfo,
    bindings: &'a MatchBindings,
    constant_opcode: Name,
    temps: FxHashMap<Name, TempRegId>,
    next_temp: usize,
    next_out: usize,
    /// Apply pattern name to built instruction.
    built: FxHashMap<Name, OutInsnId>,
    ops: Vec<ApplyOp>,
}

impl ApplyEmitter<'_> {
    fn fresh_out(&mut self) -> OutInsnId {
        let out = OutInsnId::new(operand_index(self.next_out));
        self.next_out += 1;
        out
    }

    fn fresh_temp(&mut self) -> TempRegId {
        let temp = TempRegId::new(operand_index(self.next_temp));
        self.next_temp += 1;
        temp
    }

    fn is_constant(&self, opcode: Name) -> bool {
        let mnemonic = self.interner.lookup(opcode);
        opcode == self.constant_opcode
            || self
                .instrs
                .describe(mnemonic)
                .is_some_and(|desc| desc.is_constant())
    }

    /// Build a constant instruction holding `value` and return its result
    /// register.
    fn hoist_constant(&mut self, ty: Llt, value: i64) -> TempRegId {
        let temp = self.fresh_temp();
        let out = self.fresh_out();
        self.ops.extend([
            ApplyOp::MakeTempReg { temp, ty },
            ApplyOp::BuildInstr {
                out,
                opcode: self.constant_opcode,
            },
            ApplyOp::AddTempReg {
                out,
                temp,
                is_def: true,
            },
            ApplyOp::AddCImm { out, ty, value },
        ]);
        temp
    }

    fn build(&mut self, instr: &PatternInstr) -> Result<(), PatternError> {
        let opcode = instr.operator.name();
        let is_constant = self.is_constant(opcode);

        let mut hoisted: SmallVec<[Option<TempRegId>; 4]> =
            SmallVec::from_elem(None, instr.operands.len());
        if !is_constant {
            for (position, operand) in instr.operands.iter().enumerate() {
                if let (OperandKind::Immediate(value), Some(ty)) = (operand.kind, operand.ty) {
                    hoisted[position] = Some(self.hoist_constant(ty, value));
                }
            }
        }

        let out = self.fresh_out();
        self.ops.push(ApplyOp::BuildInstr { out, opcode });
        self.built.insert(instr.name, out);

        for (position, operand) in instr.operands.iter().enumerate() {
            let op = match (operand.kind, operand.ty) {
                (OperandKind::Immediate(value), None) => ApplyOp::AddImm { out, value },
                (OperandKind::Immediate(value), Some(ty)) => match hoisted[position] {
                    Some(temp) => ApplyOp::AddTempReg {
                        out,
                        temp,
                        is_def: false,
                    },
                    None => ApplyOp::AddCImm { out, ty, value },
                },
                (OperandKind::Register, _) => {
                    self.register(out, operand.name, operand.role, operand.binds())?
                }
            };
            self.ops.push(op);
        }
        Ok(())
    }

    fn register(
        &self,
        out: OutInsnId,
        name: Name,
        role: Role,
        named: bool,
    ) -> Result<ApplyOp, PatternError> {
        let is_def = role == Role::Def;
        if let Some(&temp) = self.temps.get(&name) {
            return Ok(ApplyOp::AddTempReg { out, temp, is_def });
        }
        if named {
            if let Some((insn, operand)) = self.bindings.operand(name) {
                return Ok(ApplyOp::CopyOperand { out, insn, operand });
            }
        }
        Err(PatternError::UnboundOperand {
            operand: name,
            fragment: None,
            param: None,
            alternative: None,
        })
    }
}
