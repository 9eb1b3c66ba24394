//! Strongly-typed pattern model.
//!
//! Produced from the record DAG at ingestion and consumed by every later
//! phase. A [`PatternList`] is one match-side or apply-side program, or one
//! fragment alternative; its items are instruction patterns and native code
//! snippets in declaration order.
//!
//! Operand order inside a [`PatternInstr`] follows the machine IR convention:
//! defs first, then uses.

use crate::{CodeSnippet, Llt, Name};

/// Whether an operand is written or read by its instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Def,
    Use,
}

/// What an operand position holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// A machine operand reference (register-like), identified by name.
    Register,
    /// An immediate literal.
    Immediate(i64),
}

/// One operand occurrence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatternOperand {
    /// Operand name; generated when `anonymous` is set.
    pub name: Name,
    /// No user-given name. Anonymous operands never bind.
    pub anonymous: bool,
    pub kind: OperandKind,
    /// Resolved in place by type inference.
    pub ty: Option<Llt>,
    pub role: Role,
}

impl PatternOperand {
    /// Named, untyped register operand.
    pub fn register(name: Name, role: Role) -> Self {
        PatternOperand {
            name,
            anonymous: false,
            kind: OperandKind::Register,
            ty: None,
            role,
        }
    }

    /// Attach a type.
    #[must_use]
    pub fn with_type(mut self, ty: Llt) -> Self {
        self.ty = Some(ty);
        self
    }

    /// `true` for named register operands, the only ones that bind.
    pub fn binds(&self) -> bool {
        !self.anonymous && self.kind == OperandKind::Register
    }

    /// The immediate value, if this is a literal.
    pub fn immediate(&self) -> Option<i64> {
        match self.kind {
            OperandKind::Immediate(value) => Some(value),
            OperandKind::Register => None,
        }
    }
}

/// Operator of an instruction pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    /// A concrete instruction mnemonic.
    Instr(Name),
    /// A pattern fragment invocation.
    Fragment(Name),
}

impl Operator {
    pub fn name(self) -> Name {
        match self {
            Operator::Instr(name) | Operator::Fragment(name) => name,
        }
    }
}

/// One DAG node of a pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatternInstr {
    pub operator: Operator,
    /// Always present; anonymous nodes get a generated name.
    pub name: Name,
    pub operands: Vec<PatternOperand>,
}

impl PatternInstr {
    /// Number of def operands.
    pub fn num_defs(&self) -> usize {
        self.operands
            .iter()
            .take_while(|op| op.role == Role::Def)
            .count()
    }

    /// Number of use operands.
    pub fn num_uses(&self) -> usize {
        self.operands.len() - self.num_defs()
    }

    /// Def operands.
    pub fn defs(&self) -> impl Iterator<Item = &PatternOperand> {
        self.operands.iter().filter(|op| op.role == Role::Def)
    }

    /// Use operands.
    pub fn uses(&self) -> impl Iterator<Item = &PatternOperand> {
        self.operands.iter().filter(|op| op.role == Role::Use)
    }

    /// Whether `name` appears as a def of this instruction.
    pub fn defines(&self, name: Name) -> bool {
        self.defs().any(|op| op.binds() && op.name == name)
    }

    /// Whether `name` appears anywhere in the operand list.
    pub fn mentions(&self, name: Name) -> bool {
        self.operands.iter().any(|op| op.binds() && op.name == name)
    }
}

/// An element of a pattern list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PatternItem {
    Instr(PatternInstr),
    Code(CodeSnippet),
}

/// Dummy grouping operator of a pattern list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Group {
    Match,
    Apply,
    Pattern,
}

impl Group {
    pub fn as_str(self) -> &'static str {
        match self {
            Group::Match => "match",
            Group::Apply => "apply",
            Group::Pattern => "pattern",
        }
    }
}

/// Ordered sequence of pattern items under one grouping operator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatternList {
    pub group: Group,
    pub items: Vec<PatternItem>,
}

impl PatternList {
    pub fn new(group: Group) -> Self {
        PatternList {
            group,
            items: Vec::new(),
        }
    }

    /// Instruction patterns in declaration order.
    pub fn instrs(&self) -> impl Iterator<Item = &PatternInstr> {
        self.items.iter().filter_map(|item| match item {
            PatternItem::Instr(instr) => Some(instr),
            PatternItem::Code(_) => None,
        })
    }

    /// Mutable instruction patterns in declaration order.
    pub fn instrs_mut(&mut self) -> impl Iterator<Item = &mut PatternInstr> {
        self.items.iter_mut().filter_map(|item| match item {
            PatternItem::Instr(instr) => Some(instr),
            PatternItem::Code(_) => None,
        })
    }

    /// Native code snippets in declaration order.
    pub fn snippets(&self) -> impl Iterator<Item = &CodeSnippet> {
        self.items.iter().filter_map(|item| match item {
            PatternItem::Code(code) => Some(code),
            PatternItem::Instr(_) => None,
        })
    }

    /// Whether any instruction pattern is present.
    pub fn has_instrs(&self) -> bool {
        self.instrs().next().is_some()
    }

    /// Whether `name` is mentioned by any instruction pattern.
    pub fn mentions(&self, name: Name) -> bool {
        self.instrs().any(|instr| instr.mentions(name))
    }
}
