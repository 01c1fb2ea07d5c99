//! Typed syntax tree, as produced by the semantic analyser.
//!
//! Mirrors the untyped tree with every expression node carrying its inferred
//! type. Name references keep their identifier text; the analysed method's
//! symbol table maps each to its symbol record.

use super::untyped::{BinaryOp, EeKind, LogicOp, Name, RelOp, UnaryOp};
use crate::foundation::{ObjectKind, Span, Type};
use serde::{Deserialize, Serialize};

/// A typed expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedExpr {
    pub kind: TypedKind,
    pub ty: Type,
    pub span: Span,
}

impl TypedExpr {
    pub fn new(kind: TypedKind, ty: Type, span: Span) -> Self {
        Self { kind, ty, span }
    }
}

/// Typed expression kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypedKind {
    Number { value: f64 },
    Name(Name),
    Str(String),
    Subscript { name: Name, indices: Vec<TypedExpr> },
    Unary { op: UnaryOp, operand: Box<TypedExpr> },
    Binary {
        op: BinaryOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    Call { function: Name, arg: Box<TypedExpr> },
    Sum { index: Name, body: Box<TypedExpr> },
    Ee {
        row: Name,
        col: Name,
        diag: Box<TypedExpr>,
        off: Box<TypedExpr>,
        rhs: Box<TypedExpr>,
        kind: EeKind,
        radius: Option<Box<TypedExpr>>,
    },
}

/// Typed assignment target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypedLValue {
    /// Bare name with the type of the slot being written
    Name { name: Name, ty: Type },
    /// Subscripted array element write
    Subscript {
        name: Name,
        indices: Vec<Name>,
        /// Element type of the slot being written
        ty: Type,
    },
}

/// Typed statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypedStatement {
    Assign {
        lhs: TypedLValue,
        rhs: TypedExpr,
        span: Span,
    },
    For {
        var: Name,
        from: TypedExpr,
        to: TypedExpr,
        body: Vec<TypedStatement>,
        span: Span,
    },
    ForEach {
        name: Name,
        kind: ObjectKind,
        decomposition: Option<(Name, Name)>,
        constraint: Option<TypedConstraint>,
        body: Vec<TypedStatement>,
        span: Span,
    },
}

/// Typed constraint tree; comparisons carry typed operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypedConstraint {
    Logical {
        op: LogicOp,
        left: Box<TypedConstraint>,
        right: Box<TypedConstraint>,
        span: Span,
    },
    Not {
        inner: Box<TypedConstraint>,
        span: Span,
    },
    Compare {
        op: RelOp,
        left: TypedExpr,
        right: TypedExpr,
        span: Span,
    },
    Predicate {
        name: Name,
        args: Vec<TypedExpr>,
        span: Span,
    },
}
