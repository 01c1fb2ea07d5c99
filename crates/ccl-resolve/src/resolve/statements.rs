//! Statement checking: assignments, integer-range loops, object loops.
//!
//! Loops push fresh scopes closed at `done`. Assignments check the rhs
//! first; the lhs name's class then decides legality, and a fresh lhs
//! creates the variable - arrays land in the innermost scope that defines
//! none of their index iterators, so they outlive the loop filling them.

use super::scope::{Symbol, SymbolKind};
use super::Analyser;
use ccl_ast::{
    Diagnostic, DiagnosticKind, Expr, LValue, Name, ObjectKind, Shape, Span, Statement, Type,
    TypedExpr, TypedLValue, TypedStatement,
};

impl Analyser {
    /// Check one statement.
    pub(crate) fn check_statement(
        &mut self,
        statement: &Statement,
    ) -> Result<TypedStatement, Diagnostic> {
        match statement {
            Statement::Assign { lhs, rhs, span } => self.check_assign(lhs, rhs, *span),
            Statement::For {
                var,
                from,
                to,
                body,
                span,
            } => self.check_for(var, from, to, body, *span),
            Statement::ForEach {
                name,
                kind,
                decomposition,
                constraint,
                body,
                span,
            } => self.check_for_each(name, *kind, decomposition.as_ref(), constraint.as_ref(), body, *span),
        }
    }

    /// `lhs = rhs`.
    fn check_assign(
        &mut self,
        lhs: &LValue,
        rhs: &Expr,
        span: Span,
    ) -> Result<TypedStatement, Diagnostic> {
        let rhs = self.check_expr(rhs)?;

        let lhs = match lhs {
            LValue::Name(name) => self.check_name_target(name, &rhs, span)?,
            LValue::Subscript { name, indices } => {
                self.check_subscript_target(name, indices, &rhs, span)?
            }
        };

        Ok(TypedStatement::Assign { lhs, rhs, span })
    }

    /// Bare-name assignment target.
    fn check_name_target(
        &mut self,
        name: &Name,
        rhs: &TypedExpr,
        span: Span,
    ) -> Result<TypedLValue, Diagnostic> {
        let existing = self.scopes.resolve(&name.text).map(|s| s.kind.clone());

        let slot = match existing {
            Some(SymbolKind::LoopVariable) | Some(SymbolKind::Object { .. })
            | Some(SymbolKind::Formal { .. }) => {
                return Err(self.error(
                    DiagnosticKind::ClassMisuse,
                    span,
                    format!("Cannot assign to loop variable {}.", name.text),
                ));
            }
            Some(SymbolKind::Substitution(_)) => {
                return Err(self.error(
                    DiagnosticKind::ClassMisuse,
                    span,
                    format!("Cannot assign to a substitution symbol {}.", name.text),
                ));
            }
            Some(SymbolKind::Parameter(_)) => {
                return Err(self.error(
                    DiagnosticKind::ClassMisuse,
                    span,
                    format!("Cannot assign to a parameter symbol {}.", name.text),
                ));
            }
            Some(SymbolKind::Property(_)) => {
                return Err(self.error(
                    DiagnosticKind::ClassMisuse,
                    span,
                    format!("Cannot assign to a property symbol {}.", name.text),
                ));
            }
            Some(SymbolKind::Constant) => {
                return Err(self.error(
                    DiagnosticKind::ClassMisuse,
                    span,
                    format!("Cannot assign to a constant symbol {}.", name.text),
                ));
            }
            Some(SymbolKind::Scalar(kind)) => {
                let slot = Type::scalar(kind);
                self.check_assignable(&rhs.ty, &slot, name, span)?;
                slot
            }
            Some(SymbolKind::Array { elem, shape }) => {
                let slot = Type::Array(elem, shape);
                self.check_assignable(&rhs.ty, &slot, name, span)?;
                slot
            }
            None => {
                // A fresh bare lhs adopts the rhs type exactly.
                let kind = match &rhs.ty {
                    Type::Int | Type::Float => {
                        SymbolKind::Scalar(rhs.ty.numeric_kind().expect("numeric"))
                    }
                    Type::Array(elem, shape) => SymbolKind::Array {
                        elem: *elem,
                        shape: shape.clone(),
                    },
                    other => {
                        return Err(self.error(
                            DiagnosticKind::TypeMismatch,
                            span,
                            format!("Only Numbers and Arrays can be assigned not {other}."),
                        ));
                    }
                };
                let ty = rhs.ty.clone();
                self.scopes
                    .define(Symbol::new(name.text.clone(), kind, name.span))?;
                ty
            }
        };

        Ok(TypedLValue::Name {
            name: name.clone(),
            ty: slot,
        })
    }

    /// Subscripted assignment target `x[a(, b)] = rhs`.
    fn check_subscript_target(
        &mut self,
        name: &Name,
        indices: &[Name],
        rhs: &TypedExpr,
        span: Span,
    ) -> Result<TypedLValue, Diagnostic> {
        let existing = self.scopes.resolve(&name.text).map(|s| s.kind.clone());

        match existing {
            Some(SymbolKind::Substitution(_)) => Err(self.error(
                DiagnosticKind::ClassMisuse,
                span,
                format!("Cannot assign to a substitution symbol {}.", name.text),
            )),
            Some(SymbolKind::Parameter(kind)) => Err(self.error(
                DiagnosticKind::ClassMisuse,
                span,
                format!("Cannot assign to non-Array type {kind}."),
            )),
            Some(SymbolKind::Property(_)) => Err(self.error(
                DiagnosticKind::ClassMisuse,
                span,
                format!("Cannot assign to a property symbol {}.", name.text),
            )),
            Some(SymbolKind::Constant) => Err(self.error(
                DiagnosticKind::ClassMisuse,
                span,
                format!("Cannot assign to a constant symbol {}.", name.text),
            )),
            Some(SymbolKind::Array { elem, shape }) => {
                let index_types = self.check_index_names(indices)?;
                let kinds = object_kinds(&index_types);

                if index_types.len() != shape.dim() {
                    // The write pattern has the wrong rank for the array.
                    let written = match kinds {
                        Some(kinds) => Type::Array(elem, Shape::from_kinds(kinds)).to_string(),
                        None => display_types(&index_types),
                    };
                    return Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!(
                            "Cannot assign {written} to the variable {} of type {}.",
                            name.text,
                            Type::Array(elem, shape)
                        ),
                    ));
                }

                if kinds.as_deref() != Some(shape.kinds()) {
                    return Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!(
                            "Cannot index Array of type {} using index/indices of type(s) {}.",
                            Type::Array(elem, shape),
                            display_types(&index_types)
                        ),
                    ));
                }

                let slot = Type::scalar(elem);
                if !rhs.ty.is_numeric() {
                    return Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!(
                            "Only Numbers can be assigned to an Array element not {}.",
                            rhs.ty
                        ),
                    ));
                }
                if !rhs.ty.assignable_to(&slot) {
                    return Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!(
                            "Cannot assign {} to the variable {} of type {}.",
                            rhs.ty,
                            name.text,
                            Type::Array(elem, shape)
                        ),
                    ));
                }

                Ok(TypedLValue::Subscript {
                    name: name.clone(),
                    indices: indices.to_vec(),
                    ty: slot,
                })
            }
            Some(other) => {
                let index_types = self.check_index_names(indices)?;
                Err(self.error(
                    DiagnosticKind::TypeMismatch,
                    span,
                    format!(
                        "Cannot index type {} with indices of type(s) {}.",
                        other.describe(),
                        display_types(&index_types)
                    ),
                ))
            }
            None => {
                // First assignment creates the array: the subscript names
                // must be bound object iterators and fix the index-kind
                // tuple; the element type is the rhs's.
                let index_types = self.check_index_names(indices)?;
                let Some(kinds) = object_kinds(&index_types) else {
                    return Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        "Cannot index by type other than Atom or Bond.",
                    ));
                };

                let Some(elem) = rhs.ty.numeric_kind() else {
                    return Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        span,
                        format!(
                            "Only Numbers can be assigned to an Array element not {}.",
                            rhs.ty
                        ),
                    ));
                };

                let shape = Shape::from_kinds(kinds);
                let slot = Type::scalar(elem);
                let index_names: Vec<&str> =
                    indices.iter().map(|index| index.text.as_str()).collect();
                let frame = self.scopes.outermost_not_defining(&index_names);
                self.scopes.insert_at(
                    frame,
                    Symbol::new(
                        name.text.clone(),
                        SymbolKind::Array { elem, shape },
                        name.span,
                    ),
                );

                Ok(TypedLValue::Subscript {
                    name: name.clone(),
                    indices: indices.to_vec(),
                    ty: slot,
                })
            }
        }
    }

    /// `for i = lo to hi: body done`.
    fn check_for(
        &mut self,
        var: &Name,
        from: &Expr,
        to: &Expr,
        body: &[Statement],
        span: Span,
    ) -> Result<TypedStatement, Diagnostic> {
        let from = self.check_expr(from)?;
        if from.ty != Type::Int {
            return Err(self.error(
                DiagnosticKind::TypeMismatch,
                from.span,
                "For loop lower bound not Int.",
            ));
        }
        let to = self.check_expr(to)?;
        if to.ty != Type::Int {
            return Err(self.error(
                DiagnosticKind::TypeMismatch,
                to.span,
                "For loop upper bound not Int.",
            ));
        }

        if self.scopes.resolve(&var.text).is_some() {
            return Err(self.error(
                DiagnosticKind::Redefinition,
                var.span,
                format!("Loop variable {} already defined.", var.text),
            ));
        }

        self.scopes.push();
        self.scopes.insert(Symbol::new(
            var.text.clone(),
            SymbolKind::LoopVariable,
            var.span,
        ));

        let body = self.check_body(body);
        self.scopes.pop();

        Ok(TypedStatement::For {
            var: var.clone(),
            from,
            to,
            body: body?,
            span,
        })
    }

    /// `for each (atom|bond) name [= [i, j]] [such that c]: body done`.
    fn check_for_each(
        &mut self,
        name: &Name,
        kind: ObjectKind,
        decomposition: Option<&(Name, Name)>,
        constraint: Option<&ccl_ast::Constraint>,
        body: &[Statement],
        span: Span,
    ) -> Result<TypedStatement, Diagnostic> {
        if self.scopes.resolve(&name.text).is_some() {
            return Err(self.error(
                DiagnosticKind::Redefinition,
                name.span,
                format!("Loop variable {} already defined.", name.text),
            ));
        }

        if let Some((first, second)) = decomposition {
            let fresh = first.text != second.text
                && first.text != name.text
                && second.text != name.text
                && self.scopes.resolve(&first.text).is_none()
                && self.scopes.resolve(&second.text).is_none();
            if !fresh {
                return Err(self.error(
                    DiagnosticKind::Redefinition,
                    span,
                    format!(
                        "Decomposition of bond symbol {} used already defined names.",
                        name.text
                    ),
                ));
            }
        }

        self.scopes.push();
        self.scopes.insert(Symbol::new(
            name.text.clone(),
            SymbolKind::Object {
                kind,
                constraint: None,
            },
            name.span,
        ));
        self.mark_iterating(&name.text);

        let bonded_mark = self.bonded_mark();
        if let Some((first, second)) = decomposition {
            for atom in [first, second] {
                self.scopes.insert(Symbol::new(
                    atom.text.clone(),
                    SymbolKind::Object {
                        kind: ObjectKind::Atom,
                        constraint: None,
                    },
                    atom.span,
                ));
                self.mark_iterating(&atom.text);
            }
            self.push_bonded_pair(first, second);
        }

        let result = self.check_for_each_inner(constraint, body);

        self.restore_bonded(bonded_mark);
        self.unmark_iterating(&name.text);
        if let Some((first, second)) = decomposition {
            self.unmark_iterating(&first.text);
            self.unmark_iterating(&second.text);
        }
        self.scopes.pop();

        let (constraint, body) = result?;
        Ok(TypedStatement::ForEach {
            name: name.clone(),
            kind,
            decomposition: decomposition.cloned(),
            constraint,
            body,
            span,
        })
    }

    #[allow(clippy::type_complexity)]
    fn check_for_each_inner(
        &mut self,
        constraint: Option<&ccl_ast::Constraint>,
        body: &[Statement],
    ) -> Result<(Option<ccl_ast::TypedConstraint>, Vec<TypedStatement>), Diagnostic> {
        let constraint = match constraint {
            Some(constraint) => {
                let typed = self.check_constraint(constraint)?;
                self.collect_bonded(constraint);
                Some(typed)
            }
            None => None,
        };
        let body = self.check_body(body)?;
        Ok((constraint, body))
    }

    fn check_body(&mut self, body: &[Statement]) -> Result<Vec<TypedStatement>, Diagnostic> {
        body.iter()
            .map(|statement| self.check_statement(statement))
            .collect()
    }

    /// Type the index names of a subscripted lhs.
    fn check_index_names(&mut self, indices: &[Name]) -> Result<Vec<Type>, Diagnostic> {
        indices
            .iter()
            .map(|index| self.check_name(index))
            .collect()
    }

    /// Scalar or array assignment compatibility, with the shared wording.
    fn check_assignable(
        &self,
        rhs: &Type,
        slot: &Type,
        name: &Name,
        span: Span,
    ) -> Result<(), Diagnostic> {
        if rhs.assignable_to(slot) {
            return Ok(());
        }
        if !rhs.is_numeric() && !rhs.is_array() {
            return Err(self.error(
                DiagnosticKind::TypeMismatch,
                span,
                format!("Only Numbers and Arrays can be assigned not {rhs}."),
            ));
        }
        Err(self.error(
            DiagnosticKind::TypeMismatch,
            span,
            format!(
                "Cannot assign {rhs} to the variable {} of type {slot}.",
                name.text
            ),
        ))
    }
}

/// The object kinds of a list of index types, or `None` if any index is not
/// an object iterator.
fn object_kinds(types: &[Type]) -> Option<Vec<ObjectKind>> {
    types
        .iter()
        .map(|ty| match ty {
            Type::Object(kind) => Some(*kind),
            _ => None,
        })
        .collect()
}

fn display_types(types: &[Type]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
