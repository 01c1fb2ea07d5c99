//! Annotation resolution.
//!
//! Processes the `where` block in source order, populating the global scope
//! with parameters, objects, properties, constants, and substitution rule
//! sets. Earlier annotations are visible to later ones. Substitution clauses
//! are grouped by name and must agree on index kinds and result type; a
//! substitution with constrained clauses needs an unconstrained default.

use super::registry;
use super::scope::{PropertySig, SubstitutionClause, SubstitutionSymbol, Symbol, SymbolKind};
use super::Analyser;
use ccl_ast::{
    Annotation, Constraint, Diagnostic, DiagnosticKind, Expr, Name, ObjectKind, Span,
    SubstitutionLhs, Type,
};

impl Analyser {
    /// Phase one: build the global scope from the annotation list.
    pub(crate) fn process_annotations(
        &mut self,
        annotations: &[Annotation],
    ) -> Result<(), Diagnostic> {
        for annotation in annotations {
            match annotation {
                Annotation::Parameter { name, kind, span } => {
                    self.scopes.define(Symbol::new(
                        name.text.clone(),
                        SymbolKind::Parameter(*kind),
                        *span,
                    ))?;
                }
                Annotation::Object {
                    name,
                    kind,
                    decomposition,
                    constraint,
                    span,
                } => {
                    if let Some((first, second)) = decomposition {
                        let fresh = first.text != second.text
                            && self.scopes.resolve(&first.text).is_none()
                            && self.scopes.resolve(&second.text).is_none();
                        if !fresh {
                            return Err(self.error(
                                DiagnosticKind::Redefinition,
                                *span,
                                format!(
                                    "Decomposition of bond symbol {} used already defined names.",
                                    name.text
                                ),
                            ));
                        }
                    }
                    // The constraint is stored unvalidated; it is checked
                    // when the object is bound by a for-each or sum.
                    self.scopes.define(Symbol::new(
                        name.text.clone(),
                        SymbolKind::Object {
                            kind: *kind,
                            constraint: constraint.clone(),
                        },
                        *span,
                    ))?;
                }
                Annotation::Property {
                    name,
                    property,
                    span,
                } => {
                    let Some(args) = registry::property_args(property) else {
                        return Err(self.error(
                            DiagnosticKind::UndefinedSymbol,
                            *span,
                            format!("Property {property} is not known."),
                        ));
                    };
                    self.scopes.define(Symbol::new(
                        name.text.clone(),
                        SymbolKind::Property(PropertySig {
                            property: property.clone(),
                            args,
                        }),
                        *span,
                    ))?;
                }
                Annotation::Constant {
                    name,
                    property,
                    element,
                    span,
                } => {
                    if !registry::is_element_property(property) {
                        return Err(self.error(
                            DiagnosticKind::UndefinedSymbol,
                            *span,
                            format!("Function {property} is not a property."),
                        ));
                    }
                    if !registry::is_element(element) {
                        return Err(self.error(
                            DiagnosticKind::UndefinedSymbol,
                            *span,
                            format!("Element {element} not known."),
                        ));
                    }
                    self.scopes.define(Symbol::new(
                        name.text.clone(),
                        SymbolKind::Constant,
                        *span,
                    ))?;
                }
                Annotation::Substitution {
                    lhs,
                    rhs,
                    constraint,
                    span,
                } => {
                    self.process_substitution_clause(lhs, rhs, constraint.as_ref(), *span)?;
                }
            }
        }
        Ok(())
    }

    /// One clause of a substitution: group with earlier clauses of the same
    /// name, agree on index kinds and result type, track the default state.
    fn process_substitution_clause(
        &mut self,
        lhs: &SubstitutionLhs,
        rhs: &Expr,
        constraint: Option<&Constraint>,
        span: Span,
    ) -> Result<(), Diagnostic> {
        let name = lhs.name();
        let formals: &[Name] = match lhs {
            SubstitutionLhs::Name(_) => &[],
            SubstitutionLhs::Indexed { indices, .. } => indices,
        };

        if formals.is_empty() && constraint.is_some() {
            return Err(self.error(
                DiagnosticKind::SubstitutionConsistency,
                span,
                format!("Substitution symbol {} cannot have a constraint.", name.text),
            ));
        }

        let mut sub = match self.scopes.resolve(&name.text) {
            None => SubstitutionSymbol {
                index_kinds: vec![None; formals.len()],
                ..SubstitutionSymbol::default()
            },
            Some(symbol) => match &symbol.kind {
                SymbolKind::Substitution(sub) => sub.clone(),
                _ => {
                    return Err(self.error(
                        DiagnosticKind::Redefinition,
                        span,
                        format!("Symbol {} already defined as something else.", name.text),
                    ));
                }
            },
        };
        let is_new = sub.clauses.is_empty();

        if sub.index_kinds.len() != formals.len() {
            return Err(self.different_indices(name, span));
        }

        for clause in &sub.clauses {
            let duplicate = match (&clause.constraint, constraint) {
                (None, None) => true,
                (Some(a), Some(b)) => a.structurally_eq(b),
                _ => false,
            };
            if duplicate {
                return Err(self.error(
                    DiagnosticKind::SubstitutionConsistency,
                    span,
                    format!("Same constraint already defined for symbol {}.", name.text),
                ));
            }
        }

        // Clause scope: the formals are clause-local iterator names whose
        // kinds the constraint and the rhs refine bottom-up. Each clause
        // infers its kinds independently; agreement is checked afterwards.
        self.scopes.push();
        for formal in formals {
            self.scopes.define(Symbol::new(
                formal.text.clone(),
                SymbolKind::Formal { kind: None },
                formal.span,
            ))?;
            self.mark_iterating(&formal.text);
        }

        let result = self.check_clause(rhs, constraint, &name.text);

        let clause_kinds: Vec<Option<ObjectKind>> = formals
            .iter()
            .map(|formal| match self.scopes.resolve(&formal.text).map(|s| &s.kind) {
                Some(SymbolKind::Formal { kind }) => *kind,
                _ => None,
            })
            .collect();

        for formal in formals {
            self.unmark_iterating(&formal.text);
        }
        self.scopes.pop();

        let rhs_typed = result?;

        // Kind agreement across clauses; open kinds are adopted.
        for (declared, used) in sub.index_kinds.iter_mut().zip(&clause_kinds) {
            match (*declared, *used) {
                (Some(a), Some(b)) if a != b => {
                    return Err(self.different_indices(name, span));
                }
                (None, Some(b)) => *declared = Some(b),
                _ => {}
            }
        }

        // Result agreement up to Int -> Float promotion.
        sub.result = Some(match sub.result.take() {
            None => rhs_typed.ty.clone(),
            Some(existing) => match unify_results(&existing, &rhs_typed.ty) {
                Some(unified) => unified,
                None => {
                    return Err(self.error(
                        DiagnosticKind::SubstitutionConsistency,
                        span,
                        format!(
                            "All expressions within a substitution symbol {} must have same type.",
                            name.text
                        ),
                    ));
                }
            },
        });

        if constraint.is_some() {
            sub.has_constrained = true;
        } else {
            sub.complete = true;
        }
        sub.clauses.push(SubstitutionClause {
            formals: formals.iter().map(|f| f.text.clone()).collect(),
            constraint: constraint.cloned(),
            rhs: rhs_typed,
        });

        if is_new {
            self.scopes.define(Symbol::new(
                name.text.clone(),
                SymbolKind::Substitution(sub),
                span,
            ))?;
        } else if let Some(symbol) = self.scopes.resolve_mut(&name.text) {
            symbol.kind = SymbolKind::Substitution(sub);
        }

        Ok(())
    }

    /// Constraint then rhs of one clause, in the clause scope.
    fn check_clause(
        &mut self,
        rhs: &Expr,
        constraint: Option<&Constraint>,
        name: &str,
    ) -> Result<ccl_ast::TypedExpr, Diagnostic> {
        let bonded_mark = self.bonded_mark();
        if let Some(constraint) = constraint {
            self.check_constraint(constraint)?;
            self.collect_bonded(constraint);
        }

        self.current_substitution = Some(name.to_string());
        let rhs_typed = self.check_expr(rhs);
        self.current_substitution = None;
        self.restore_bonded(bonded_mark);

        rhs_typed
    }

    /// Phase-one epilogue: every substitution with constrained clauses must
    /// have reached the complete state via an unconstrained default.
    pub(crate) fn check_substitution_defaults(&self) -> Result<(), Diagnostic> {
        for symbol in self.scopes.globals() {
            if let SymbolKind::Substitution(sub) = &symbol.kind {
                if sub.has_constrained && !sub.complete {
                    return Err(self.error(
                        DiagnosticKind::SubstitutionConsistency,
                        symbol.defined_at,
                        format!(
                            "No default option specified for Substitution symbol {}.",
                            symbol.name
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    fn different_indices(&self, name: &Name, span: Span) -> Diagnostic {
        self.error(
            DiagnosticKind::SubstitutionConsistency,
            span,
            format!("Substitution symbol {} has different indices defined.", name.text),
        )
    }
}

/// Least upper bound of two clause result types under Int -> Float
/// promotion, or `None` when they disagree.
fn unify_results(a: &Type, b: &Type) -> Option<Type> {
    if a == b {
        return Some(a.clone());
    }
    match (a, b) {
        (Type::Int, Type::Float) | (Type::Float, Type::Int) => Some(Type::Float),
        (Type::Array(ae, ashape), Type::Array(be, bshape)) if ashape == bshape => {
            Some(Type::Array(ae.unify(*be), ashape.clone()))
        }
        _ => None,
    }
}
