//! Constraint and predicate checking.
//!
//! Constraints are Bool-typed trees of `and`/`or`/`not`, relational
//! comparisons over scalar numerics, and predicate calls validated against
//! the built-in registry.

use super::registry::{self, PredicateArg};
use super::scope::SymbolKind;
use super::Analyser;
use ccl_ast::{
    Constraint, Diagnostic, DiagnosticKind, Expr, Name, ObjectKind, Span, Type, TypedConstraint,
    TypedExpr, TypedKind, UntypedKind,
};

impl Analyser {
    /// Validate a constraint tree, producing its typed mirror.
    pub(crate) fn check_constraint(
        &mut self,
        constraint: &Constraint,
    ) -> Result<TypedConstraint, Diagnostic> {
        match constraint {
            Constraint::Logical {
                op,
                left,
                right,
                span,
            } => {
                let left = self.check_constraint(left)?;
                let right = self.check_constraint(right)?;
                Ok(TypedConstraint::Logical {
                    op: *op,
                    left: Box::new(left),
                    right: Box::new(right),
                    span: *span,
                })
            }
            Constraint::Not { inner, span } => {
                let inner = self.check_constraint(inner)?;
                Ok(TypedConstraint::Not {
                    inner: Box::new(inner),
                    span: *span,
                })
            }
            Constraint::Compare {
                op,
                left,
                right,
                span,
            } => {
                let left = self.check_expr(left)?;
                let right = self.check_expr(right)?;
                if !left.ty.is_numeric() || !right.ty.is_numeric() {
                    return Err(self.error(
                        DiagnosticKind::TypeMismatch,
                        *span,
                        format!("Cannot perform {op} for types {} and {}.", left.ty, right.ty),
                    ));
                }
                Ok(TypedConstraint::Compare {
                    op: *op,
                    left,
                    right,
                    span: *span,
                })
            }
            Constraint::Predicate { name, args, span } => self.check_predicate(name, args, *span),
        }
    }

    /// Validate a predicate call against the registry.
    fn check_predicate(
        &mut self,
        name: &Name,
        args: &[Expr],
        span: Span,
    ) -> Result<TypedConstraint, Diagnostic> {
        let Some(sig) = registry::predicate(&name.text) else {
            return Err(self.error(
                DiagnosticKind::PredicateMisuse,
                name.span,
                format!("Predicate {} not defined.", name.text),
            ));
        };

        if args.len() != sig.args.len() {
            return Err(self.error(
                DiagnosticKind::PredicateMisuse,
                span,
                format!(
                    "Predicate {} should have {} arguments but got {} instead.",
                    name.text,
                    sig.args.len(),
                    args.len()
                ),
            ));
        }

        let mut typed = Vec::with_capacity(args.len());
        for (arg, slot) in args.iter().zip(sig.args) {
            let typed_arg = match slot {
                PredicateArg::Atom => self.check_object_argument(name, arg, Some(ObjectKind::Atom))?,
                PredicateArg::Object => self.check_object_argument(name, arg, None)?,
                PredicateArg::Numeric => {
                    let typed_arg = self.check_expr(arg)?;
                    if !typed_arg.ty.is_numeric() {
                        return Err(self.error(
                            DiagnosticKind::PredicateMisuse,
                            arg.span,
                            format!("Predicate {} expected numeric argument.", name.text),
                        ));
                    }
                    typed_arg
                }
                PredicateArg::Int => {
                    let typed_arg = self.check_expr(arg)?;
                    if typed_arg.ty != Type::Int {
                        return Err(self.error(
                            DiagnosticKind::PredicateMisuse,
                            arg.span,
                            format!("Predicate {} expected numeric argument.", name.text),
                        ));
                    }
                    typed_arg
                }
                PredicateArg::Element => self.check_element_argument(arg)?,
            };
            typed.push(typed_arg);
        }

        Ok(TypedConstraint::Predicate {
            name: name.clone(),
            args: typed,
            span,
        })
    }

    /// An argument that must be a bound object iterator, optionally of a
    /// required kind. Open formal kinds are forced by the requirement.
    fn check_object_argument(
        &mut self,
        predicate: &Name,
        arg: &Expr,
        required: Option<ObjectKind>,
    ) -> Result<TypedExpr, Diagnostic> {
        let wrong_kind = |analyser: &Self| {
            let expected = match required {
                Some(kind) => kind.to_string(),
                None => "Atom or Bond".to_string(),
            };
            analyser.error(
                DiagnosticKind::PredicateMisuse,
                arg.span,
                format!(
                    "Predicate's {} argument is not {expected}.",
                    predicate.text
                ),
            )
        };

        let Some(arg_name) = arg.as_name() else {
            return Err(wrong_kind(self));
        };

        let Some(symbol) = self.scopes.resolve(&arg_name.text) else {
            return Err(self.undefined(arg_name));
        };

        let kind = match &symbol.kind {
            SymbolKind::Object { kind, .. } => {
                let kind = *kind;
                if !self.is_iterating(&arg_name.text) {
                    return Err(self.error(
                        DiagnosticKind::ClassMisuse,
                        arg.span,
                        format!("Object {} not bound to ForEach or Sum.", arg_name.text),
                    ));
                }
                if let Some(required) = required {
                    if kind != required {
                        return Err(wrong_kind(self));
                    }
                }
                kind
            }
            SymbolKind::Formal { kind } => match (kind, required) {
                (Some(kind), Some(required)) if *kind != required => {
                    return Err(wrong_kind(self));
                }
                (Some(kind), _) => *kind,
                (None, Some(required)) => {
                    // The predicate fixes this formal's kind.
                    if let Some(symbol) = self.scopes.resolve_mut(&arg_name.text) {
                        symbol.kind = SymbolKind::Formal {
                            kind: Some(required),
                        };
                    }
                    required
                }
                (None, None) => ObjectKind::Atom,
            },
            _ => return Err(wrong_kind(self)),
        };

        Ok(TypedExpr::new(
            TypedKind::Name(arg_name.clone()),
            Type::Object(kind),
            arg.span,
        ))
    }

    /// The element-name argument of `element(i, s)`: a string literal or a
    /// bare identifier naming a known element.
    fn check_element_argument(&mut self, arg: &Expr) -> Result<TypedExpr, Diagnostic> {
        let element = match &arg.kind {
            UntypedKind::Str(text) => text.clone(),
            UntypedKind::Name(name) => name.text.clone(),
            _ => {
                return Err(self.error(
                    DiagnosticKind::PredicateMisuse,
                    arg.span,
                    "Predicate element expected string argument.",
                ));
            }
        };

        if !registry::is_element(&element) {
            return Err(self.error(
                DiagnosticKind::PredicateMisuse,
                arg.span,
                format!("Unknown element {element}."),
            ));
        }

        Ok(TypedExpr::new(
            TypedKind::Str(element),
            Type::String,
            arg.span,
        ))
    }
}
