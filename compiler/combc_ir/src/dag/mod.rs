//! Record DAG handed over by the declaration reader.
//!
//! This is the dynamically-shaped tree the upstream reader produces for each
//! top-level declaration. It is converted exactly once, at ingestion, into
//! the strongly-typed pattern model in [`crate::pattern`]; nothing past that
//! boundary inspects a `DagNode`.
//!
//! Names are plain strings here. A leading `$` on reference names is
//! accepted and stripped during ingestion.

/// One DAG node: `(operator arg, arg, ...):$name`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DagNode {
    /// Operator: a grouping keyword, a mnemonic or a fragment name.
    pub operator: String,
    /// Optional node name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    /// Ordered arguments.
    #[cfg_attr(feature = "serde", serde(default))]
    pub args: Vec<DagArg>,
}

/// One DAG argument.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DagArg {
    /// `$x`, `i32:$x`, `root:$x`, or an anonymous `?` when `name` is absent.
    Ref {
        #[cfg_attr(feature = "serde", serde(default))]
        name: Option<String>,
        #[cfg_attr(feature = "serde", serde(default))]
        ty: Option<String>,
    },
    /// Untyped integer literal.
    Literal(i128),
    /// Typed literal wrapper `(i32 0)`.
    TypedLiteral { ty: String, value: i128 },
    /// Native code snippet.
    Code(String),
    /// Nested DAG.
    Dag(DagNode),
}

impl DagNode {
    /// Create a node with no arguments.
    pub fn new(operator: impl Into<String>) -> Self {
        DagNode {
            operator: operator.into(),
            name: None,
            args: Vec::new(),
        }
    }

    /// Set the node name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append an argument.
    #[must_use]
    pub fn arg(mut self, arg: DagArg) -> Self {
        self.args.push(arg);
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args(mut self, args: impl IntoIterator<Item = DagArg>) -> Self {
        self.args.extend(args);
        self
    }
}

impl DagArg {
    /// Named untyped reference.
    pub fn reference(name: impl Into<String>) -> Self {
        DagArg::Ref {
            name: Some(name.into()),
            ty: None,
        }
    }

    /// Named reference with a type or kind annotation.
    pub fn typed(ty: impl Into<String>, name: impl Into<String>) -> Self {
        DagArg::Ref {
            name: Some(name.into()),
            ty: Some(ty.into()),
        }
    }

    /// Anonymous reference.
    pub fn anonymous() -> Self {
        DagArg::Ref {
            name: None,
            ty: None,
        }
    }

    /// Typed literal.
    pub fn typed_literal(ty: impl Into<String>, value: i128) -> Self {
        DagArg::TypedLiteral {
            ty: ty.into(),
            value,
        }
    }

    /// Native code snippet.
    pub fn code(code: impl Into<String>) -> Self {
        DagArg::Code(code.into())
    }
}

/// A `GICombineRule`-style declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleDecl {
    pub name: String,
    /// `(defs root:$x, ...)`
    pub defs: DagNode,
    /// `(match ...)`
    #[cfg_attr(feature = "serde", serde(rename = "match"))]
    pub match_: DagNode,
    /// `(apply ...)`
    pub apply: DagNode,
}

/// A `GICombinePatFrag`-style declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FragmentDecl {
    pub name: String,
    /// `(outs root:$r, ...)`
    pub outs: DagNode,
    /// `(ins $x, gi_imm:$i, ...)`
    pub ins: DagNode,
    /// One `(pattern ...)` node per alternative.
    pub alternatives: Vec<DagNode>,
}

#[cfg(test)]
mod tests;
