//! The CCL type algebra.
//!
//! CCL mixes scalar numeric types with shape-indexed array types and the
//! parameter categories of the annotation language:
//!
//! - `Int`, `Float`, `Bool`, `String` - scalars; `Int` promotes to `Float`
//!   in rvalue contexts only
//! - `Atom`, `Bond` - object types, doubling as the index kinds of arrays
//! - `Float[Atom]`, `Int[Atom, Bond]`, ... - arrays indexed by one or two
//!   object domains
//! - `Atom Parameter`, `Bond Parameter`, `Common Parameter` - externally
//!   supplied constants
//!
//! `Display` output is interpolated verbatim into diagnostics, so the
//! renderings here are part of the analyser's acceptance contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Object kind: a molecular entity, and the index domain of an array axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Atom,
    Bond,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Atom => write!(f, "Atom"),
            ObjectKind::Bond => write!(f, "Bond"),
        }
    }
}

/// Scalar numeric kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericKind {
    Int,
    Float,
}

impl NumericKind {
    /// Result kind of an arithmetic operation over two numeric operands:
    /// `Float` wins.
    pub fn unify(self, other: NumericKind) -> NumericKind {
        if self == NumericKind::Float || other == NumericKind::Float {
            NumericKind::Float
        } else {
            NumericKind::Int
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericKind::Int => write!(f, "Int"),
            NumericKind::Float => write!(f, "Float"),
        }
    }
}

/// Parameter category from a `... is (atom|bond|common) parameter`
/// annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    Atom,
    Bond,
    Common,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Atom => write!(f, "Atom Parameter"),
            ParameterKind::Bond => write!(f, "Bond Parameter"),
            ParameterKind::Common => write!(f, "Common Parameter"),
        }
    }
}

/// Index-domain tuple of an array: one or two object kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    kinds: Vec<ObjectKind>,
}

impl Shape {
    /// Vector shape `[k]`.
    pub fn vector(kind: ObjectKind) -> Self {
        Self { kinds: vec![kind] }
    }

    /// Matrix shape `[rows, cols]`.
    pub fn matrix(rows: ObjectKind, cols: ObjectKind) -> Self {
        Self {
            kinds: vec![rows, cols],
        }
    }

    /// Shape from an index-kind list.
    ///
    /// # Panics
    /// Panics if the list is empty or longer than two entries.
    pub fn from_kinds(kinds: Vec<ObjectKind>) -> Self {
        assert!(
            !kinds.is_empty() && kinds.len() <= 2,
            "array shapes have one or two index kinds, got {}",
            kinds.len()
        );
        Self { kinds }
    }

    pub fn dim(&self) -> usize {
        self.kinds.len()
    }

    pub fn kinds(&self) -> &[ObjectKind] {
        &self.kinds
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.kinds.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{kind}")?;
        }
        Ok(())
    }
}

/// A type in the CCL type system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    /// An atom or bond object (a bound iterator, or an object template)
    Object(ObjectKind),
    /// Array with numeric elements indexed by object domains
    Array(NumericKind, Shape),
    /// Atom/bond/common parameter category
    Parameter(ParameterKind),
}

impl Type {
    /// Scalar `Int` or `Float`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(..))
    }

    /// Numeric kind of a scalar numeric type.
    pub fn numeric_kind(&self) -> Option<NumericKind> {
        match self {
            Type::Int => Some(NumericKind::Int),
            Type::Float => Some(NumericKind::Float),
            _ => None,
        }
    }

    pub fn scalar(kind: NumericKind) -> Type {
        match kind {
            NumericKind::Int => Type::Int,
            NumericKind::Float => Type::Float,
        }
    }

    pub fn vector(elem: NumericKind, kind: ObjectKind) -> Type {
        Type::Array(elem, Shape::vector(kind))
    }

    pub fn matrix(elem: NumericKind, rows: ObjectKind, cols: ObjectKind) -> Type {
        Type::Array(elem, Shape::matrix(rows, cols))
    }

    /// Whether an rvalue of this type may flow into a slot of type `target`.
    ///
    /// Exact matches always do; `Int` additionally promotes to `Float`.
    /// Arrays must agree on shape, while their element kinds follow the same
    /// scalar rule.
    pub fn assignable_to(&self, target: &Type) -> bool {
        match (self, target) {
            (Type::Int, Type::Float) => true,
            (Type::Array(from, s1), Type::Array(to, s2)) => {
                s1 == s2 && (from == to || (*from == NumericKind::Int && *to == NumericKind::Float))
            }
            _ => self == target,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Float => write!(f, "Float"),
            Type::Bool => write!(f, "Bool"),
            Type::String => write!(f, "String"),
            Type::Object(kind) => write!(f, "{kind}"),
            Type::Array(elem, shape) => write!(f, "{elem}[{shape}]"),
            Type::Parameter(kind) => write!(f, "{kind}"),
        }
    }
}

/// Render a list of index types the way diagnostics quote them:
/// `Atom`, `Atom, Bond`, ...
pub fn display_types(types: &[Type]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
