//! Pattern errors and diagnostics.

use std::fmt;

use combc_diagnostic::{Diagnostic, ErrorCode, Origin};
use combc_ir::{Llt, Name, StringInterner};

/// What an operand position holds or is required to hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperandClass {
    Register,
    Immediate,
    Code,
    Nested,
    /// Written by an instruction.
    Definition,
    /// Only ever read.
    UseOnly,
}

impl fmt::Display for OperandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            OperandClass::Register => "a register operand",
            OperandClass::Immediate => "an immediate",
            OperandClass::Code => "a code snippet",
            OperandClass::Nested => "a nested pattern",
            OperandClass::Definition => "a definition",
            OperandClass::UseOnly => "a use-only input",
        };
        f.write_str(text)
    }
}

/// Pattern compilation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternError {
    /// Operator is neither a known instruction nor a known fragment.
    UnknownOperator { operator: Name },
    /// Operand count does not fit the operator signature.
    ArityMismatch {
        operator: Name,
        expected: usize,
        found: usize,
        variadic: bool,
    },
    /// Literal does not fit the matcher immediate or its own type.
    ImmediateTooWide { value: i128, ty: Option<Llt> },
    /// Unparseable type spelling.
    UnknownType { spelling: Name },
    /// An operand of the wrong kind for its position.
    OperandKindMismatch {
        operand: Option<Name>,
        expected: OperandClass,
        found: OperandClass,
    },
    /// Declaration does not have the expected shape.
    MalformedDeclaration { detail: String },
    /// Two explicit types for one operand name.
    TypeConflict { operand: Name, first: Llt, second: Llt },
    /// Operand is never bound.
    ///
    /// `fragment`/`param`/`alternative` are set when the failure comes from
    /// a fragment formal that one alternative leaves unbound.
    UnboundOperand {
        operand: Name,
        fragment: Option<Name>,
        param: Option<Name>,
        alternative: Option<usize>,
    },
    /// Snippet placeholder matches no binding.
    UnknownPlaceholder { placeholder: Name },
    /// Apply-side temporary register with no resolvable type.
    UntypedTempRegister { operand: Name },
    /// Name defined twice where it may be defined once.
    DuplicateDefinition { name: Name },
    /// Fragment body references another fragment.
    NestedFragment { fragment: Name, nested: Name },
    /// Fragment does not have exactly one root out-param.
    MultiRootFragment { fragment: Name, roots: usize },
    /// Rule uses a fragment whose own validation failed.
    BrokenFragment { fragment: Name },
    /// Apply defines a root name zero or several times.
    RootNotRedefined { root: Name, definitions: usize },
    /// Apply redefines a matched operand that is not a root.
    UnsupportedRewrite { operand: Name },
    /// Root cannot be resolved to a match pattern.
    InvalidRoot { root: Option<Name>, roots: usize },
    /// Match pattern not connected to the root by def/use edges.
    UnreachablePattern { pattern: Name },
    /// Compiler invariant violated.
    Internal { message: String },
}

impl PatternError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PatternError::UnknownOperator { .. } => ErrorCode::E1001,
            PatternError::ArityMismatch { .. } => ErrorCode::E1002,
            PatternError::ImmediateTooWide { .. } => ErrorCode::E1003,
            PatternError::UnknownType { .. } => ErrorCode::E1004,
            PatternError::OperandKindMismatch { .. } => ErrorCode::E1005,
            PatternError::MalformedDeclaration { .. } => ErrorCode::E1006,
            PatternError::TypeConflict { .. } => ErrorCode::E2001,
            PatternError::UnboundOperand { .. } => ErrorCode::E2002,
            PatternError::UnknownPlaceholder { .. } => ErrorCode::E2003,
            PatternError::UntypedTempRegister { .. } => ErrorCode::E2004,
            PatternError::DuplicateDefinition { .. } => ErrorCode::E2005,
            PatternError::NestedFragment { .. } => ErrorCode::E3001,
            PatternError::MultiRootFragment { .. } => ErrorCode::E3002,
            PatternError::BrokenFragment { .. } => ErrorCode::E3003,
            PatternError::RootNotRedefined { .. } => ErrorCode::E4001,
            PatternError::UnsupportedRewrite { .. } => ErrorCode::E4002,
            PatternError::InvalidRoot { .. } => ErrorCode::E4003,
            PatternError::UnreachablePattern { .. } => ErrorCode::E4004,
            PatternError::Internal { .. } => ErrorCode::E9001,
        }
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        PatternError::MalformedDeclaration {
            detail: detail.into(),
        }
    }

    /// Convert to a diagnostic with helpful suggestions.
    pub fn to_diagnostic(&self, interner: &StringInterner) -> Diagnostic {
        let code = self.code();
        match self {
            PatternError::UnknownOperator { operator } => Diagnostic::error(code)
                .with_message(format!(
                    "unknown operator `{}`",
                    interner.lookup(*operator)
                ))
                .with_note("operators must name a registered instruction or pattern fragment")
                .with_suggestion("check the spelling, or declare the fragment"),
            PatternError::ArityMismatch {
                operator,
                expected,
                found,
                variadic,
            } => {
                let at_least = if *variadic { "at least " } else { "" };
                Diagnostic::error(code)
                    .with_message(format!(
                        "wrong number of operands for `{}`: expected {at_least}{expected}, found {found}",
                        interner.lookup(*operator)
                    ))
                    .with_suggestion(if found > expected {
                        "remove extra operands"
                    } else {
                        "add missing operands (defs first, then uses)"
                    })
            }
            PatternError::ImmediateTooWide { value, ty } => {
                let diag = Diagnostic::error(code);
                match ty {
                    Some(ty) => diag.with_message(format!(
                        "immediate `{value}` does not fit in type {ty}"
                    )),
                    None => diag
                        .with_message(format!("immediate `{value}` does not fit in 64 bits"))
                        .with_note("matchers only compare immediates of up to 64 bits"),
                }
            }
            PatternError::UnknownType { spelling } => Diagnostic::error(code)
                .with_message(format!("unknown type `{}`", interner.lookup(*spelling)))
                .with_suggestion("use a scalar (`s32`, `i32`), pointer (`p0`) or vector (`v4s32`)"),
            PatternError::OperandKindMismatch {
                operand,
                expected,
                found,
            } => {
                let subject = match operand {
                    Some(name) => format!("operand `${}`", interner.lookup(*name)),
                    None => "operand".to_string(),
                };
                Diagnostic::error(code)
                    .with_message(format!("{subject} must be {expected}, found {found}"))
            }
            PatternError::MalformedDeclaration { detail } => Diagnostic::error(code)
                .with_message(format!("malformed declaration: {detail}")),
            PatternError::TypeConflict {
                operand,
                first,
                second,
            } => {
                let name = interner.lookup(*operand);
                Diagnostic::error(code)
                    .with_message(format!(
                        "operand `${name}` has conflicting types {first} and {second}"
                    ))
                    .with_note("all occurrences of a name must share one type")
                    .with_suggestion(format!(
                        "use a different name for the {second} operand"
                    ))
            }
            PatternError::UnboundOperand {
                operand,
                fragment,
                param,
                alternative,
            } => {
                let name = interner.lookup(*operand);
                let diag = Diagnostic::error(code)
                    .with_message(format!("operand `${name}` is not bound"));
                match (fragment, param, alternative) {
                    (Some(fragment), Some(param), Some(alt)) => diag
                        .with_note(format!(
                            "alternative {alt} of fragment `{}` does not bind `${}`",
                            interner.lookup(*fragment),
                            interner.lookup(*param)
                        ))
                        .with_suggestion(format!(
                            "bind `${name}` elsewhere in the pattern before this use"
                        )),
                    _ => diag.with_suggestion(format!(
                        "`${name}` must be matched, or defined by an earlier apply pattern"
                    )),
                }
            }
            PatternError::UnknownPlaceholder { placeholder } => Diagnostic::error(code)
                .with_message(format!(
                    "unknown placeholder `${{{}}}` in code snippet",
                    interner.lookup(*placeholder)
                ))
                .with_note("placeholders may name matched operands, patterns, match data, built instructions or temporaries"),
            PatternError::UntypedTempRegister { operand } => Diagnostic::error(code)
                .with_message(format!(
                    "cannot infer a type for new register `${}`",
                    interner.lookup(*operand)
                ))
                .with_suggestion("add a type to the operand, e.g. `s32:$tmp`"),
            PatternError::DuplicateDefinition { name } => Diagnostic::error(code)
                .with_message(format!("`{}` is defined more than once", interner.lookup(*name))),
            PatternError::NestedFragment { fragment, nested } => Diagnostic::error(code)
                .with_message(format!(
                    "fragment `{}` uses fragment `{}`",
                    interner.lookup(*fragment),
                    interner.lookup(*nested)
                ))
                .with_note("fragments cannot nest"),
            PatternError::MultiRootFragment { fragment, roots } => Diagnostic::error(code)
                .with_message(format!(
                    "fragment `{}` declares {roots} root parameters",
                    interner.lookup(*fragment)
                ))
                .with_note("a fragment with instruction patterns needs exactly one `root` out-param"),
            PatternError::BrokenFragment { fragment } => Diagnostic::error(code)
                .with_message(format!(
                    "uses fragment `{}`, which failed to compile",
                    interner.lookup(*fragment)
                )),
            PatternError::RootNotRedefined { root, definitions } => {
                let name = interner.lookup(*root);
                let diag = Diagnostic::error(code);
                if *definitions == 0 {
                    diag.with_message(format!("apply does not define root `${name}`"))
                        .with_suggestion(format!("add a pattern that defines `${name}`"))
                } else {
                    diag.with_message(format!(
                        "apply defines root `${name}` {definitions} times"
                    ))
                    .with_note("the root must be defined exactly once")
                }
            }
            PatternError::UnsupportedRewrite { operand } => Diagnostic::error(code)
                .with_message(format!(
                    "apply redefines matched operand `${}`",
                    interner.lookup(*operand)
                ))
                .with_note("only the root may be rewritten"),
            PatternError::InvalidRoot { root, roots } => {
                let diag = Diagnostic::error(code);
                match root {
                    Some(root) => diag.with_message(format!(
                        "root `{}` is not defined or named by any match pattern",
                        interner.lookup(*root)
                    )),
                    None => diag
                        .with_message(format!("`defs` declares {roots} roots"))
                        .with_suggestion("declare exactly one `root:$name`"),
                }
            }
            PatternError::UnreachablePattern { pattern } => Diagnostic::error(code)
                .with_message(format!(
                    "match pattern `{}` is not reachable from the root",
                    interner.lookup(*pattern)
                ))
                .with_note("every match pattern must define an operand used on the way from the root"),
            PatternError::Internal { message } => Diagnostic::error(code)
                .with_message(format!("internal compiler error: {message}")),
        }
    }
}

/// Who a problem belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    Rule(Name),
    Fragment(Name),
}

impl Owner {
    fn origin(self, interner: &StringInterner) -> Origin {
        match self {
            Owner::Rule(name) => Origin::rule(interner.lookup(name)),
            Owner::Fragment(name) => Origin::fragment(interner.lookup(name)),
        }
    }
}

/// A [`PatternError`] plus the pattern it was found in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternProblem {
    pub error: PatternError,
    /// Named or auto-named pattern, when the failure is local to one.
    pub pattern: Option<Name>,
}

impl PatternProblem {
    pub fn new(error: PatternError) -> Self {
        PatternProblem {
            error,
            pattern: None,
        }
    }

    /// Attach a pattern name unless one is already present.
    #[must_use]
    pub fn in_pattern(mut self, pattern: Name) -> Self {
        self.pattern.get_or_insert(pattern);
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.error.code()
    }

    pub fn to_diagnostic(&self, owner: Owner, interner: &StringInterner) -> Diagnostic {
        let mut origin = owner.origin(interner);
        if let Some(pattern) = self.pattern {
            origin = origin.with_pattern(interner.lookup(pattern));
        }
        self.error.to_diagnostic(interner).with_origin(origin)
    }
}

impl From<PatternError> for PatternProblem {
    fn from(error: PatternError) -> Self {
        PatternProblem::new(error)
    }
}

/// Tag a pattern-local error with its pattern.
pub trait InPattern<T> {
    fn in_pattern(self, pattern: Name) -> Result<T, PatternProblem>;
}

impl<T> InPattern<T> for Result<T, PatternError> {
    fn in_pattern(self, pattern: Name) -> Result<T, PatternProblem> {
        self.map_err(|error| PatternProblem::new(error).in_pattern(pattern))
    }
}

impl<T> InPattern<T> for Result<T, PatternProblem> {
    fn in_pattern(self, pattern: Name) -> Result<T, PatternProblem> {
        self.map_err(|problem| problem.in_pattern(pattern))
    }
}
