//! CCL abstract syntax tree.
//!
//! `untyped` is what the parser emits; `typed` is the mirror the analyser
//! produces, with every expression carrying its inferred type.

pub mod typed;
pub mod untyped;

pub use typed::{TypedConstraint, TypedExpr, TypedKind, TypedLValue, TypedStatement};
pub use untyped::{
    Annotation, BinaryOp, Constraint, EeKind, Expr, LValue, LogicOp, Method, Name, RelOp,
    Statement, SubstitutionLhs, UnaryOp, UntypedKind,
};
