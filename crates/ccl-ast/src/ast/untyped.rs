//! Untyped syntax tree, as produced by the parser.
//!
//! A method is a statement list followed by an annotation block. Expressions
//! and constraints are separate grammars: expressions are numeric-valued,
//! constraints are the boolean trees attached to annotations, loops, and
//! substitution clauses.
//!
//! Constraints and expressions implement span-insensitive structural
//! equality (`structurally_eq`); the analyser uses it to reject duplicate
//! substitution clauses.

use crate::foundation::{NumericKind, ObjectKind, ParameterKind, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An identifier with its source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub text: String,
    pub span: Span,
}

impl Name {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A complete CCL method: optional header name, body, annotation block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: Option<Name>,
    pub statements: Vec<Statement>,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Pow => write!(f, "^"),
        }
    }
}

/// Unary sign operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Pos,
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Pos => write!(f, "+"),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}

/// Relational operator in constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelOp::Lt => write!(f, "<"),
            RelOp::Le => write!(f, "<="),
            RelOp::Gt => write!(f, ">"),
            RelOp::Ge => write!(f, ">="),
            RelOp::Eq => write!(f, "=="),
            RelOp::Ne => write!(f, "!="),
        }
    }
}

/// Logical connective in constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicOp {
    And,
    Or,
}

/// Variant selector of an `EE` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EeKind {
    Full,
    Cutoff,
    Cover,
}

/// An expression node with its source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: UntypedKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: UntypedKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The identifier text, if this is a bare name.
    pub fn as_name(&self) -> Option<&Name> {
        match &self.kind {
            UntypedKind::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Structural equality ignoring spans.
    pub fn structurally_eq(&self, other: &Expr) -> bool {
        use UntypedKind::*;
        match (&self.kind, &other.kind) {
            (Number { value: a, kind: ka }, Number { value: b, kind: kb }) => a == b && ka == kb,
            (Name(a), Name(b)) => a.text == b.text,
            (Str(a), Str(b)) => a == b,
            (
                Subscript {
                    name: n1,
                    indices: i1,
                },
                Subscript {
                    name: n2,
                    indices: i2,
                },
            ) => {
                n1.text == n2.text
                    && i1.len() == i2.len()
                    && i1.iter().zip(i2).all(|(a, b)| a.structurally_eq(b))
            }
            (Unary { op: o1, operand: e1 }, Unary { op: o2, operand: e2 }) => {
                o1 == o2 && e1.structurally_eq(e2)
            }
            (
                Binary {
                    op: o1,
                    left: l1,
                    right: r1,
                },
                Binary {
                    op: o2,
                    left: l2,
                    right: r2,
                },
            ) => o1 == o2 && l1.structurally_eq(l2) && r1.structurally_eq(r2),
            (
                Call {
                    function: f1,
                    arg: a1,
                },
                Call {
                    function: f2,
                    arg: a2,
                },
            ) => f1.text == f2.text && a1.structurally_eq(a2),
            (
                Sum {
                    index: n1,
                    body: b1,
                },
                Sum {
                    index: n2,
                    body: b2,
                },
            ) => n1.text == n2.text && b1.structurally_eq(b2),
            _ => false,
        }
    }
}

/// Expression kinds of the surface grammar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UntypedKind {
    /// Numeric literal; `kind` is `Int` when the lexeme had no dot
    Number { value: f64, kind: NumericKind },
    /// Identifier reference
    Name(Name),
    /// String literal (element names in predicate arguments)
    Str(String),
    /// `x[e]` or `x[e1, e2]`
    Subscript { name: Name, indices: Vec<Expr> },
    /// `-e` / `+e`
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// `a op b`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `f(e)` - built-in mathematical function application
    Call { function: Name, arg: Box<Expr> },
    /// `sum[i](e)`
    Sum { index: Name, body: Box<Expr> },
    /// `EE[i, j](diag, off, rhs [, cutoff|cover, r])`
    Ee {
        row: Name,
        col: Name,
        diag: Box<Expr>,
        off: Box<Expr>,
        rhs: Box<Expr>,
        kind: EeKind,
        radius: Option<Box<Expr>>,
    },
}

/// Assignment target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LValue {
    Name(Name),
    Subscript { name: Name, indices: Vec<Name> },
}

impl LValue {
    pub fn name(&self) -> &Name {
        match self {
            LValue::Name(name) => name,
            LValue::Subscript { name, .. } => name,
        }
    }
}

/// A statement of the method body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// `lhs = rhs`
    Assign {
        lhs: LValue,
        rhs: Expr,
        span: Span,
    },
    /// `for i = lo to hi: body done`
    For {
        var: Name,
        from: Expr,
        to: Expr,
        body: Vec<Statement>,
        span: Span,
    },
    /// `for each (atom|bond) name [= [i, j]] [such that c]: body done`
    ForEach {
        name: Name,
        kind: ObjectKind,
        decomposition: Option<(Name, Name)>,
        constraint: Option<Constraint>,
        body: Vec<Statement>,
        span: Span,
    },
}

/// A boolean constraint tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    Logical {
        op: LogicOp,
        left: Box<Constraint>,
        right: Box<Constraint>,
        span: Span,
    },
    Not {
        inner: Box<Constraint>,
        span: Span,
    },
    Compare {
        op: RelOp,
        left: Expr,
        right: Expr,
        span: Span,
    },
    Predicate {
        name: Name,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Constraint {
    pub fn span(&self) -> Span {
        match self {
            Constraint::Logical { span, .. }
            | Constraint::Not { span, .. }
            | Constraint::Compare { span, .. }
            | Constraint::Predicate { span, .. } => *span,
        }
    }

    /// Structural equality ignoring spans.
    pub fn structurally_eq(&self, other: &Constraint) -> bool {
        match (self, other) {
            (
                Constraint::Logical {
                    op: o1,
                    left: l1,
                    right: r1,
                    ..
                },
                Constraint::Logical {
                    op: o2,
                    left: l2,
                    right: r2,
                    ..
                },
            ) => o1 == o2 && l1.structurally_eq(l2) && r1.structurally_eq(r2),
            (Constraint::Not { inner: a, .. }, Constraint::Not { inner: b, .. }) => {
                a.structurally_eq(b)
            }
            (
                Constraint::Compare {
                    op: o1,
                    left: l1,
                    right: r1,
                    ..
                },
                Constraint::Compare {
                    op: o2,
                    left: l2,
                    right: r2,
                    ..
                },
            ) => o1 == o2 && l1.structurally_eq(l2) && r1.structurally_eq(r2),
            (
                Constraint::Predicate {
                    name: n1, args: a1, ..
                },
                Constraint::Predicate {
                    name: n2, args: a2, ..
                },
            ) => {
                n1.text == n2.text
                    && a1.len() == a2.len()
                    && a1.iter().zip(a2).all(|(x, y)| x.structurally_eq(y))
            }
            _ => false,
        }
    }

    /// Visit every predicate in the tree.
    pub fn for_each_predicate<'a>(&'a self, f: &mut impl FnMut(&'a Name, &'a [Expr])) {
        match self {
            Constraint::Logical { left, right, .. } => {
                left.for_each_predicate(f);
                right.for_each_predicate(f);
            }
            Constraint::Not { inner, .. } => inner.for_each_predicate(f),
            Constraint::Compare { .. } => {}
            Constraint::Predicate { name, args, .. } => f(name, args),
        }
    }
}

/// Left-hand side of a substitution annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubstitutionLhs {
    /// `d = ...` - zero-arity
    Name(Name),
    /// `d[i] = ...` / `d[i, j] = ...` with clause-local formal index names
    Indexed { name: Name, indices: Vec<Name> },
}

impl SubstitutionLhs {
    pub fn name(&self) -> &Name {
        match self {
            SubstitutionLhs::Name(name) => name,
            SubstitutionLhs::Indexed { name, .. } => name,
        }
    }
}

/// An annotation of the `where` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Annotation {
    /// `name is (atom|bond|common) parameter`
    Parameter {
        name: Name,
        kind: ParameterKind,
        span: Span,
    },
    /// `name is (atom|bond) [such that c]`, optionally `name = [i, j] is bond`
    Object {
        name: Name,
        kind: ObjectKind,
        decomposition: Option<(Name, Name)>,
        constraint: Option<Constraint>,
        span: Span,
    },
    /// `name is <property words>`
    Property {
        name: Name,
        property: String,
        span: Span,
    },
    /// `name is <property> of <element>`
    Constant {
        name: Name,
        property: String,
        element: String,
        span: Span,
    },
    /// `lhs = rhs [if c]` - one clause of a substitution
    Substitution {
        lhs: SubstitutionLhs,
        rhs: Expr,
        constraint: Option<Constraint>,
        span: Span,
    },
}
