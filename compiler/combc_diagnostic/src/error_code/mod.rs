//! Error codes for all compiler diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E2001`) whose first digit
//! names the compiler phase.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E1xxx: Ingestion errors (operators, arity, literals, declaration shape)
/// - E2xxx: Operand errors (types, binding, placeholders)
/// - E3xxx: Fragment errors
/// - E4xxx: Rule errors (root handling, rewrites)
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Ingestion Errors (E1xxx)
    /// Unknown operator
    E1001,
    /// Operand count does not match the operator signature
    E1002,
    /// Immediate literal too wide
    E1003,
    /// Unknown type
    E1004,
    /// Operand kind mismatch
    E1005,
    /// Malformed declaration
    E1006,

    // Operand Errors (E2xxx)
    /// Type conflict
    E2001,
    /// Unbound operand
    E2002,
    /// Unknown snippet placeholder
    E2003,
    /// Temporary register without a type
    E2004,
    /// Operand defined more than once
    E2005,

    // Fragment Errors (E3xxx)
    /// Fragment references another fragment
    E3001,
    /// Fragment root count is not one
    E3002,
    /// Rule uses a fragment that failed validation
    E3003,

    // Rule Errors (E4xxx)
    /// Apply does not redefine the root exactly once
    E4001,
    /// Apply redefines a non-root matched operand
    E4002,
    /// Root cannot be resolved
    E4003,
    /// Match pattern not reachable from the root
    E4004,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    pub const ALL: &[ErrorCode] = &[
        // Ingestion
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        // Operand
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        // Fragment
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        // Rule
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E4003,
        ErrorCode::E4004,
        // Internal
        ErrorCode::E9001,
    ];

    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Short kind name, as used in documentation and test expectations.
    pub fn kind(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "UnknownOperator",
            ErrorCode::E1002 => "ArityMismatch",
            ErrorCode::E1003 => "ImmediateTooWide",
            ErrorCode::E1004 => "UnknownType",
            ErrorCode::E1005 => "OperandKindMismatch",
            ErrorCode::E1006 => "MalformedDeclaration",
            ErrorCode::E2001 => "TypeConflict",
            ErrorCode::E2002 => "UnboundOperand",
            ErrorCode::E2003 => "UnknownPlaceholder",
            ErrorCode::E2004 => "UntypedTempRegister",
            ErrorCode::E2005 => "DuplicateDefinition",
            ErrorCode::E3001 => "NestedFragment",
            ErrorCode::E3002 => "MultiRootFragment",
            ErrorCode::E3003 => "BrokenFragment",
            ErrorCode::E4001 => "RootNotRedefined",
            ErrorCode::E4002 => "UnsupportedRewrite",
            ErrorCode::E4003 => "InvalidRoot",
            ErrorCode::E4004 => "UnreachablePattern",
            ErrorCode::E9001 => "Internal",
        }
    }

    /// Check if this is an ingestion error (E1xxx).
    pub fn is_ingestion_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E1001
                | ErrorCode::E1002
                | ErrorCode::E1003
                | ErrorCode::E1004
                | ErrorCode::E1005
                | ErrorCode::E1006
        )
    }

    /// Check if this is an operand error (E2xxx).
    pub fn is_operand_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E2001
                | ErrorCode::E2002
                | ErrorCode::E2003
                | ErrorCode::E2004
                | ErrorCode::E2005
        )
    }

    /// Check if this is a fragment error (E3xxx).
    pub fn is_fragment_error(&self) -> bool {
        matches!(self, ErrorCode::E3001 | ErrorCode::E3002 | ErrorCode::E3003)
    }

    /// Check if this is a rule error (E4xxx).
    pub fn is_rule_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::E4001 | ErrorCode::E4002 | ErrorCode::E4003 | ErrorCode::E4004
        )
    }

    /// Check if this is an internal compiler error (E9xxx).
    pub fn is_internal_error(&self) -> bool {
        matches!(self, ErrorCode::E9001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper || code.kind() == s)
            .copied()
            .ok_or(())
    }
}
