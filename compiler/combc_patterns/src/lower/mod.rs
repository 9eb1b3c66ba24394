//! Ingestion: record DAG to pattern model.
//!
//! This is the one conversion boundary between the dynamically-shaped DAG
//! and the typed [`PatternList`]. Every structural check that needs only a
//! single declaration happens here: operator resolution, arity, literal
//! widths, def-position kinds and fragment nesting.
//!
//! Nested DAGs in use positions are hoisted into their own instruction
//! pattern, placed before their user, and the use refers to the nested
//! node's first def.

use rustc_hash::{FxHashMap, FxHashSet};

use combc_ir::dag::{DagArg, DagNode, FragmentDecl, RuleDecl};
use combc_ir::{
    fits_immediate_width, CodeSnippet, CombineRule, Group, InParam, InParamKind, InstrInfo, Llt,
    MatchData, Name, OperandKind, Operator, OutParam, OutParamKind, PatternFragment,
    PatternInstr, PatternItem, PatternList, PatternOperand, Role, StringInterner,
};

use crate::{InPattern, OperandClass, PatternError, PatternProblem};

/// Operand signature of a declared fragment, known before any fragment
/// body is lowered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FragmentSig {
    pub outs: usize,
    pub ins: usize,
}

impl FragmentSig {
    pub fn of(decl: &FragmentDecl) -> Self {
        FragmentSig {
            outs: decl.outs.args.len(),
            ins: decl.ins.args.len(),
        }
    }

    pub fn arity(self) -> usize {
        self.outs + self.ins
    }
}

/// Resolved operator with its operand signature.
#[derive(Copy, Clone, Debug)]
struct Signature {
    operator: Operator,
    num_defs: usize,
    num_uses: usize,
    variadic: bool,
}

/// Strip the `$` sigil from a reference name.
pub fn operand_name(raw: &str) -> &str {
    raw.strip_prefix('$').unwrap_or(raw)
}

/// Converts declarations of one compilation unit.
///
/// Counters for generated names restart with every declaration.
pub struct Lowerer<'a> {
    interner: &'a StringInterner,
    instrs: &'a dyn InstrInfo,
    fragments: &'a FxHashMap<Name, FragmentSig>,
    /// Set while lowering a fragment body.
    enclosing_fragment: Option<Name>,
    anon_patterns: u32,
    anon_operands: u32,
    nested_defs: u32,
}

impl<'a> Lowerer<'a> {
    pub fn new(
        interner: &'a StringInterner,
        instrs: &'a dyn InstrInfo,
        fragments: &'a FxHashMap<Name, FragmentSig>,
    ) -> Self {
        Lowerer {
            interner,
            instrs,
            fragments,
            enclosing_fragment: None,
            anon_patterns: 0,
            anon_operands: 0,
            nested_defs: 0,
        }
    }

    fn reset(&mut self, enclosing_fragment: Option<Name>) {
        self.enclosing_fragment = enclosing_fragment;
        self.anon_patterns = 0;
        self.anon_operands = 0;
        self.nested_defs = 0;
    }

    /// Lower a combine rule declaration.
    pub fn lower_rule(&mut self, decl: &RuleDecl) -> Result<CombineRule, PatternProblem> {
        self.reset(None);
        let name = self.interner.intern(&decl.name);

        expect_group(&decl.defs, "defs")?;
        let (root, match_data) = self.lower_defs(&decl.defs)?;

        let match_patterns = self.lower_list(&decl.match_, Group::Match)?;
        let apply_patterns = self.lower_list(&decl.apply, Group::Apply)?;

        Ok(CombineRule {
            name,
            root,
            match_data,
            match_patterns,
            apply_patterns,
        })
    }

    /// Lower a pattern fragment declaration.
    ///
    /// Only the per-declaration shape is checked here; root count,
    /// per-alternative inference and boundness belong to fragment
    /// validation.
    pub fn lower_fragment(
        &mut self,
        decl: &FragmentDecl,
    ) -> Result<PatternFragment, PatternProblem> {
        let name = self.interner.intern(&decl.name);
        self.reset(Some(name));

        expect_group(&decl.outs, "outs")?;
        expect_group(&decl.ins, "ins")?;

        let mut seen = FxHashSet::default();
        let mut out_params = Vec::with_capacity(decl.outs.args.len());
        for arg in &decl.outs.args {
            let (param, kind) = self.param(arg, "outs")?;
            let kind = match kind {
                None | Some("gi_mo") => OutParamKind::Operand,
                Some("root") => OutParamKind::Root,
                Some(other) => {
                    return Err(PatternError::malformed(format!(
                        "unknown out-param kind `{other}`"
                    ))
                    .into())
                }
            };
            if !seen.insert(param) {
                return Err(PatternError::DuplicateDefinition { name: param }.into());
            }
            out_params.push(OutParam { name: param, kind });
        }

        let mut in_params = Vec::with_capacity(decl.ins.args.len());
        for arg in &decl.ins.args {
            let (param, kind) = self.param(arg, "ins")?;
            let kind = match kind {
                None | Some("gi_mo") => InParamKind::Operand(None),
                Some("gi_imm") => InParamKind::Immediate,
                Some(spelling) => InParamKind::Operand(Some(self.parse_type(spelling)?)),
            };
            if !seen.insert(param) {
                return Err(PatternError::DuplicateDefinition { name: param }.into());
            }
            in_params.push(InParam { name: param, kind });
        }

        if decl.alternatives.is_empty() {
            return Err(PatternError::malformed("fragment has no alternatives").into());
        }
        let mut alternatives = Vec::with_capacity(decl.alternatives.len());
        for alt in &decl.alternatives {
            alternatives.push(self.lower_list(alt, Group::Pattern)?);
        }

        Ok(PatternFragment {
            name,
            out_params,
            in_params,
            alternatives,
        })
    }

    /// `(defs root:$r, T:$data, ...)`
    fn lower_defs(&self, defs: &DagNode) -> Result<(Name, Vec<MatchData>), PatternProblem> {
        let mut roots = Vec::new();
        let mut match_data = Vec::new();
        for arg in &defs.args {
            let (name, kind) = self.param(arg, "defs")?;
            match kind {
                Some("root") => roots.push(name),
                Some(native_type) => match_data.push(MatchData {
                    name,
                    native_type: native_type.to_string(),
                }),
                None => {
                    return Err(PatternError::malformed(format!(
                        "`defs` entry `${}` needs `root` or a match-data type",
                        self.interner.lookup(name)
                    ))
                    .into())
                }
            }
        }
        match roots.as_slice() {
            [root] => Ok((*root, match_data)),
            _ => Err(PatternError::InvalidRoot {
                root: None,
                roots: roots.len(),
            }
            .into()),
        }
    }

    /// A `kind:$name` parameter entry.
    fn param<'d>(
        &self,
        arg: &'d DagArg,
        group: &str,
    ) -> Result<(Name, Option<&'d str>), PatternProblem> {
        match arg {
            DagArg::Ref {
                name: Some(name),
                ty,
            } => Ok((self.interner.intern(operand_name(name)), ty.as_deref())),
            _ => Err(PatternError::malformed(format!(
                "`{group}` entries must be named operands"
            ))
            .into()),
        }
    }

    fn lower_list(&mut self, node: &DagNode, group: Group) -> Result<PatternList, PatternProblem> {
        expect_group(node, group.as_str())?;
        let mut list = PatternList::new(group);
        for arg in &node.args {
            match arg {
                DagArg::Dag(instr) => {
                    self.lower_instr(instr, group, false, &mut list.items)?;
                }
                DagArg::Code(code) => list
                    .items
                    .push(PatternItem::Code(CodeSnippet::parse(code, self.interner))),
                _ => {
                    return Err(PatternError::malformed(format!(
                        "`{}` may only contain patterns and code",
                        group.as_str()
                    ))
                    .into())
                }
            }
        }
        Ok(list)
    }

    fn resolve_operator(&self, mnemonic: &str) -> Result<Signature, PatternError> {
        let name = self.interner.intern(mnemonic);
        if let Some(desc) = self.instrs.describe(mnemonic) {
            return Ok(Signature {
                operator: Operator::Instr(name),
                num_defs: desc.num_defs,
                num_uses: desc.num_uses,
                variadic: desc.is_variadic(),
            });
        }
        if let Some(sig) = self.fragments.get(&name) {
            if let Some(fragment) = self.enclosing_fragment {
                return Err(PatternError::NestedFragment {
                    fragment,
                    nested: name,
                });
            }
            return Ok(Signature {
                operator: Operator::Fragment(name),
                num_defs: sig.outs,
                num_uses: sig.ins,
                variadic: false,
            });
        }
        Err(PatternError::UnknownOperator { operator: name })
    }

    /// Lower one instruction node, pushing it (after any hoisted nested
    /// nodes) onto `items`. Returns the name of its first def.
    fn lower_instr(
        &mut self,
        node: &DagNode,
        group: Group,
        nested: bool,
        items: &mut Vec<PatternItem>,
    ) -> Result<Option<Name>, PatternProblem> {
        let name = match &node.name {
            Some(name) => self.interner.intern(operand_name(name)),
            None => self.fresh_pattern_name(group),
        };
        let sig = self.resolve_operator(&node.operator).in_pattern(name)?;

        let fixed = sig.num_defs + sig.num_uses;
        let found = node.args.len();
        let fits = if sig.variadic {
            found >= fixed
        } else {
            found == fixed
        };
        if !fits {
            return Err(PatternProblem::new(PatternError::ArityMismatch {
                operator: sig.operator.name(),
                expected: fixed,
                found,
                variadic: sig.variadic,
            })
            .in_pattern(name));
        }

        let mut operands = Vec::with_capacity(found);
        for (index, arg) in node.args.iter().enumerate() {
            let role = if index < sig.num_defs {
                Role::Def
            } else {
                Role::Use
            };
            let link_def = nested && index == 0 && role == Role::Def;
            let operand = self
                .lower_operand(arg, role, group, link_def, items)
                .in_pattern(name)?;
            operands.push(operand);
        }

        let first_def = operands
            .first()
            .filter(|operand| operand.role == Role::Def)
            .map(|operand| operand.name);

        items.push(PatternItem::Instr(PatternInstr {
            operator: sig.operator,
            name,
            operands,
        }));
        Ok(first_def)
    }

    fn lower_operand(
        &mut self,
        arg: &DagArg,
        role: Role,
        group: Group,
        link_def: bool,
        items: &mut Vec<PatternItem>,
    ) -> Result<PatternOperand, PatternProblem> {
        match arg {
            DagArg::Ref { name, ty } => {
                let ty = ty.as_deref().map(|s| self.parse_type(s)).transpose()?;
                let mut operand = match name {
                    Some(name) => {
                        PatternOperand::register(self.interner.intern(operand_name(name)), role)
                    }
                    None if link_def => {
                        PatternOperand::register(self.fresh_nested_def(), role)
                    }
                    None => PatternOperand {
                        anonymous: true,
                        ..PatternOperand::register(self.fresh_operand_name(), role)
                    },
                };
                operand.ty = ty;
                Ok(operand)
            }
            DagArg::Literal(value) => {
                self.immediate_position(role)?;
                let value = i64::try_from(*value).map_err(|_| {
                    PatternError::ImmediateTooWide {
                        value: *value,
                        ty: None,
                    }
                })?;
                Ok(self.immediate(value, None, role))
            }
            DagArg::TypedLiteral { ty, value } => {
                self.immediate_position(role)?;
                let ty = self.parse_type(ty)?;
                if !ty.fits_immediate(*value) || !fits_immediate_width(*value) {
                    return Err(PatternError::ImmediateTooWide {
                        value: *value,
                        ty: Some(ty),
                    }
                    .into());
                }
                let value = i64::try_from(*value).map_err(|_| PatternError::Internal {
                    message: "checked immediate does not fit i64".to_string(),
                })?;
                Ok(self.immediate(value, Some(ty), role))
            }
            DagArg::Code(_) => Err(PatternError::OperandKindMismatch {
                operand: None,
                expected: OperandClass::Register,
                found: OperandClass::Code,
            }
            .into()),
            DagArg::Dag(inner) => {
                if role == Role::Def {
                    return Err(PatternError::OperandKindMismatch {
                        operand: None,
                        expected: OperandClass::Register,
                        found: OperandClass::Nested,
                    }
                    .into());
                }
                let def = self.lower_instr(inner, group, true, items)?;
                let Some(def) = def else {
                    return Err(PatternError::malformed(format!(
                        "nested `{}` defines nothing to use",
                        inner.operator
                    ))
                    .into());
                };
                Ok(PatternOperand::register(def, Role::Use))
            }
        }
    }

    fn immediate_position(&self, role: Role) -> Result<(), PatternError> {
        if role == Role::Def {
            return Err(PatternError::OperandKindMismatch {
                operand: None,
                expected: OperandClass::Register,
                found: OperandClass::Immediate,
            });
        }
        Ok(())
    }

    fn immediate(&mut self, value: i64, ty: Option<Llt>, role: Role) -> PatternOperand {
        PatternOperand {
            name: self.fresh_operand_name(),
            anonymous: true,
            kind: OperandKind::Immediate(value),
            ty,
            role,
        }
    }

    fn parse_type(&self, spelling: &str) -> Result<Llt, PatternError> {
        Llt::parse(spelling).ok_or_else(|| PatternError::UnknownType {
            spelling: self.interner.intern(spelling),
        })
    }

    fn fresh_pattern_name(&mut self, group: Group) -> Name {
        let n = self.anon_patterns;
        self.anon_patterns += 1;
        self.interner
            .intern(&format!("__{}_anon_{n}", group.as_str()))
    }

    fn fresh_operand_name(&mut self) -> Name {
        let n = self.anon_operands;
        self.anon_operands += 1;
        self.interner.intern(&format!("__anon_op{n}"))
    }

    fn fresh_nested_def(&mut self) -> Name {
        let n = self.nested_defs;
        self.nested_defs += 1;
        self.interner.intern(&format!("__nested_def{n}"))
    }
}

fn expect_group(node: &DagNode, group: &str) -> Result<(), PatternError> {
    if node.operator == group {
        Ok(())
    } else {
        Err(PatternError::malformed(format!(
            "expected `({group} ...)`, found `({} ...)`",
            node.operator
        )))
    }
}
