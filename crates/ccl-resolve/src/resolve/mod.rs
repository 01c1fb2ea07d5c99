//! The semantic analysis pass.
//!
//! Two-phase, single-threaded, fail-fast: the annotation resolver populates
//! the global scope first (the body references names the annotations
//! introduce), then the statement checker walks the body top to bottom,
//! pushing scopes for loops. The first diagnostic aborts the run.
//!
//! # Pipeline position
//!
//! ```text
//! Lex → Parse → Analyse → (code generation, external)
//!                ^^^^^^
//! ```

pub mod registry;
pub mod scope;

mod annotations;
mod constraints;
mod exprs;
mod statements;

#[cfg(test)]
mod tests;

use ccl_ast::{Constraint, Diagnostic, DiagnosticKind, Method, Name, NumericKind, ObjectKind,
    Shape, Span, TypedStatement};
use indexmap::IndexMap;
use scope::{PropertySig, ScopeStack, Symbol, SymbolKind};
use std::collections::HashSet;

/// A successfully analysed method: the typed statement list plus the global
/// symbol table built from the annotations.
#[derive(Debug)]
pub struct AnalysedMethod {
    pub name: Option<String>,
    pub statements: Vec<TypedStatement>,
    symbols: IndexMap<String, Symbol>,
}

impl AnalysedMethod {
    /// Look up a global symbol record by name.
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Global symbols in definition order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}

/// Analyse a parsed method.
///
/// Returns the typed tree, or the diagnostic for the first rule violated in
/// the deterministic traversal order: annotations before body, source order
/// within each.
pub fn analyse(method: &Method) -> Result<AnalysedMethod, Diagnostic> {
    let mut analyser = Analyser::new();

    analyser.process_annotations(&method.annotations)?;
    analyser.check_substitution_defaults()?;

    let statements = method
        .statements
        .iter()
        .map(|statement| analyser.check_statement(statement))
        .collect::<Result<Vec<_>, Diagnostic>>()?;

    Ok(AnalysedMethod {
        name: method.name.as_ref().map(|n| n.text.clone()),
        statements,
        symbols: analyser.scopes.into_global(),
    })
}

/// Analyser state threaded through the passes.
pub(crate) struct Analyser {
    pub(crate) scopes: ScopeStack,
    /// Names currently bound as iterators (for-each loops, sums, EE
    /// indices, bond decompositions, substitution formals)
    iterating: HashSet<String>,
    /// Stack of atom iterator pairs known to be bonded, from bond
    /// decompositions and `bonded` predicates in governing constraints
    bonded: Vec<(String, String)>,
    /// Set while a substitution clause rhs is being typed; used to reject
    /// nested substitutions
    current_substitution: Option<String>,
}

impl Analyser {
    fn new() -> Self {
        let mut scopes = ScopeStack::new();

        // The charge vector every method computes into, and the distance
        // matrix shorthand used by EE-style methods.
        scopes.insert(Symbol::new(
            "q",
            SymbolKind::Array {
                elem: NumericKind::Float,
                shape: Shape::vector(ObjectKind::Atom),
            },
            Span::zero(),
        ));
        scopes.insert(Symbol::new(
            "R",
            SymbolKind::Property(PropertySig {
                property: "distance".to_string(),
                args: vec![ObjectKind::Atom, ObjectKind::Atom],
            }),
            Span::zero(),
        ));

        Self {
            scopes,
            iterating: HashSet::new(),
            bonded: Vec::new(),
            current_substitution: None,
        }
    }

    pub(crate) fn is_iterating(&self, name: &str) -> bool {
        self.iterating.contains(name)
    }

    /// Mark a name as a bound iterator; returns whether it was newly
    /// inserted so nested bindings of the same template unwind correctly.
    pub(crate) fn mark_iterating(&mut self, name: &str) -> bool {
        self.iterating.insert(name.to_string())
    }

    pub(crate) fn unmark_iterating(&mut self, name: &str) {
        self.iterating.remove(name);
    }

    pub(crate) fn bonded_mark(&self) -> usize {
        self.bonded.len()
    }

    pub(crate) fn restore_bonded(&mut self, mark: usize) {
        self.bonded.truncate(mark);
    }

    pub(crate) fn push_bonded_pair(&mut self, a: &Name, b: &Name) {
        self.bonded.push((a.text.clone(), b.text.clone()));
    }

    pub(crate) fn is_bonded(&self, a: &str, b: &str) -> bool {
        self.bonded
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Record every `bonded(x, y)` predicate of a governing constraint so
    /// bond parameters may be indexed by the tied atom pair.
    pub(crate) fn collect_bonded(&mut self, constraint: &Constraint) {
        let mut pairs = Vec::new();
        constraint.for_each_predicate(&mut |name, args| {
            if name.text == "bonded" && args.len() == 2 {
                if let (Some(a), Some(b)) = (args[0].as_name(), args[1].as_name()) {
                    pairs.push((a.clone(), b.clone()));
                }
            }
        });
        for (a, b) in pairs {
            self.push_bonded_pair(&a, &b);
        }
    }

    pub(crate) fn error(
        &self,
        kind: DiagnosticKind,
        span: Span,
        message: impl Into<String>,
    ) -> Diagnostic {
        Diagnostic::new(kind, span, message)
    }

    pub(crate) fn undefined(&self, name: &Name) -> Diagnostic {
        Diagnostic::new(
            DiagnosticKind::UndefinedSymbol,
            name.span,
            format!("Symbol {} not defined.", name.text),
        )
    }
}
