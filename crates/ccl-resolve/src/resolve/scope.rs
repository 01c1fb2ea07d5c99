//! Scoped symbol table.
//!
//! An ordered stack of name → symbol maps. The outermost (global) frame is
//! populated exclusively by annotations; `for` / `for each` loops, `sum`,
//! `EE` and substitution clauses push inner frames. Lookup walks from
//! innermost out. There is no shadowing: inserting a name that already
//! resolves anywhere on the walk is the redefinition error, regardless of
//! symbol class.

use ccl_ast::{Constraint, Diagnostic, DiagnosticKind, NumericKind, ObjectKind, ParameterKind,
    Shape, Span, Type, TypedExpr};
use indexmap::IndexMap;

/// One symbol record: class, type information, defining site.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub defined_at: Span,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, defined_at: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            defined_at,
        }
    }
}

/// Symbol classes. Classes are disjoint; a name has exactly one.
#[derive(Debug, Clone)]
pub enum SymbolKind {
    /// Scalar variable created by assignment
    Scalar(NumericKind),
    /// Array variable; index-kind tuple fixed at the defining assignment
    Array { elem: NumericKind, shape: Shape },
    /// Integer-range loop variable
    LoopVariable,
    /// Object variable: a `for each`/`EE` iterator, or an annotation
    /// template bindable by `sum`
    Object {
        kind: ObjectKind,
        constraint: Option<Constraint>,
    },
    /// Clause-local formal index of a substitution; the kind is refined
    /// while the clause is checked and may stay open until a use site
    Formal { kind: Option<ObjectKind> },
    /// Atom/bond/common parameter
    Parameter(ParameterKind),
    /// Atom- or bond-indexed built-in property
    Property(PropertySig),
    /// Property-of-element constant, scalar `Float`
    Constant,
    /// Named substitution rule set
    Substitution(SubstitutionSymbol),
}

impl SymbolKind {
    /// How diagnostics name this symbol's class-level type. Differs from
    /// `value_type` for common parameters, which read as `Float` in rvalue
    /// position but are reported as `Common Parameter`.
    pub fn describe(&self) -> String {
        match self {
            SymbolKind::Scalar(kind) => kind.to_string(),
            SymbolKind::Array { elem, shape } => Type::Array(*elem, shape.clone()).to_string(),
            SymbolKind::LoopVariable => "Int".to_string(),
            SymbolKind::Object { kind, .. } => kind.to_string(),
            SymbolKind::Formal { kind } => kind.unwrap_or(ObjectKind::Atom).to_string(),
            SymbolKind::Parameter(kind) => kind.to_string(),
            SymbolKind::Property(_) => "Function".to_string(),
            SymbolKind::Constant => "Float".to_string(),
            SymbolKind::Substitution(_) => "Substitution".to_string(),
        }
    }

    /// The type a bare reference to this symbol would have, where one
    /// exists. Used for diagnostics naming the symbol's type.
    pub fn value_type(&self) -> Option<Type> {
        match self {
            SymbolKind::Scalar(kind) => Some(Type::scalar(*kind)),
            SymbolKind::Array { elem, shape } => Some(Type::Array(*elem, shape.clone())),
            SymbolKind::LoopVariable => Some(Type::Int),
            SymbolKind::Object { kind, .. } => Some(Type::Object(*kind)),
            SymbolKind::Formal { kind } => {
                Some(Type::Object(kind.unwrap_or(ObjectKind::Atom)))
            }
            SymbolKind::Parameter(ParameterKind::Common) => Some(Type::Float),
            SymbolKind::Parameter(kind) => Some(Type::Parameter(*kind)),
            SymbolKind::Constant => Some(Type::Float),
            SymbolKind::Property(sig) => Some(sig.bare_type()),
            SymbolKind::Substitution(_) => None,
        }
    }
}

/// Signature of a built-in property bound by a property annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySig {
    /// Canonical property name
    pub property: String,
    /// Index kinds the property is subscripted with
    pub args: Vec<ObjectKind>,
}

impl PropertySig {
    /// Type of a bare (unsubscripted) reference: the whole indexed array.
    pub fn bare_type(&self) -> Type {
        Type::Array(NumericKind::Float, Shape::from_kinds(self.args.clone()))
    }
}

/// A substitution rule set: index kinds, result type, clause list, and the
/// default-clause state machine.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionSymbol {
    /// One entry per index; `None` until some clause or use site fixes it
    pub index_kinds: Vec<Option<ObjectKind>>,
    /// Result type all clauses agree on
    pub result: Option<Type>,
    pub clauses: Vec<SubstitutionClause>,
    /// An unconstrained (default) clause has been seen
    pub complete: bool,
    /// At least one constrained clause has been seen
    pub has_constrained: bool,
}

/// One clause of a substitution.
#[derive(Debug, Clone)]
pub struct SubstitutionClause {
    /// Clause-local formal index names
    pub formals: Vec<String>,
    pub constraint: Option<Constraint>,
    pub rhs: TypedExpr,
}

/// The scope stack.
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<IndexMap<String, Symbol>>,
}

impl ScopeStack {
    /// New stack holding only the global frame.
    pub fn new() -> Self {
        Self {
            frames: vec![IndexMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(IndexMap::new());
    }

    pub fn pop(&mut self) {
        debug_assert!(self.frames.len() > 1, "cannot pop the global frame");
        self.frames.pop();
    }

    /// Resolve a name, walking from innermost frame out.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
    }

    /// Mutable resolve, for refining formal and substitution index kinds.
    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name))
    }

    /// Insert into the innermost frame; any name already resolving on the
    /// walk is the redefinition error.
    pub fn define(&mut self, symbol: Symbol) -> Result<(), Diagnostic> {
        if self.resolve(&symbol.name).is_some() {
            return Err(Diagnostic::new(
                DiagnosticKind::Redefinition,
                symbol.defined_at,
                format!("Symbol {} already defined.", symbol.name),
            ));
        }
        self.insert(symbol);
        Ok(())
    }

    /// Insert into the innermost frame without the redefinition check.
    /// Used for the pre-defined globals and for in-place updates.
    pub fn insert(&mut self, symbol: Symbol) {
        self.frames
            .last_mut()
            .expect("scope stack always has the global frame")
            .insert(symbol.name.clone(), symbol);
    }

    /// Insert into a specific frame (see `outermost_not_defining`).
    pub fn insert_at(&mut self, frame: usize, symbol: Symbol) {
        self.frames[frame].insert(symbol.name.clone(), symbol);
    }

    /// Index of the innermost frame that defines none of `names`.
    ///
    /// A first assignment `x[i, j] = e` defines `x` here, so the array
    /// outlives the loops that bind its index iterators.
    pub fn outermost_not_defining(&self, names: &[&str]) -> usize {
        let mut remaining: Vec<&str> = names.to_vec();
        for idx in (0..self.frames.len()).rev() {
            if remaining.is_empty() {
                return idx;
            }
            remaining.retain(|name| !self.frames[idx].contains_key(*name));
        }
        0
    }

    /// Whether a name is defined in the global frame.
    pub fn is_global(&self, name: &str) -> bool {
        self.frames[0].contains_key(name)
    }

    /// Snapshot of the global frame, in definition order.
    pub fn into_global(mut self) -> IndexMap<String, Symbol> {
        self.frames.truncate(1);
        self.frames.pop().expect("global frame")
    }

    /// Iterate the global frame in definition order.
    pub fn globals(&self) -> impl Iterator<Item = &Symbol> {
        self.frames[0].values()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(name: &str, kind: SymbolKind) -> Symbol {
        Symbol::new(name, kind, Span::zero())
    }

    #[test]
    fn test_no_shadowing_across_frames() {
        let mut scopes = ScopeStack::new();
        scopes
            .define(symbol("q", SymbolKind::Scalar(NumericKind::Float)))
            .unwrap();
        scopes.push();
        let err = scopes
            .define(symbol("q", SymbolKind::LoopVariable))
            .unwrap_err();
        assert_eq!(err.message, "Symbol q already defined.");
    }

    #[test]
    fn test_lookup_walks_outward() {
        let mut scopes = ScopeStack::new();
        scopes
            .define(symbol("a", SymbolKind::Scalar(NumericKind::Int)))
            .unwrap();
        scopes.push();
        scopes.define(symbol("i", SymbolKind::LoopVariable)).unwrap();
        assert!(scopes.resolve("a").is_some());
        assert!(scopes.resolve("i").is_some());
        scopes.pop();
        assert!(scopes.resolve("i").is_none());
    }

    #[test]
    fn test_outermost_not_defining() {
        let mut scopes = ScopeStack::new();
        scopes.push(); // frame 1: for k
        scopes.define(symbol("k", SymbolKind::LoopVariable)).unwrap();
        scopes.push(); // frame 2: for each atom i
        scopes
            .define(
                symbol(
                    "i",
                    SymbolKind::Object {
                        kind: ObjectKind::Atom,
                        constraint: None,
                    },
                ),
            )
            .unwrap();
        // x[i] should land in the frame just outside the one defining i
        assert_eq!(scopes.outermost_not_defining(&["i"]), 1);
        // no index names: the innermost frame
        assert_eq!(scopes.outermost_not_defining(&[]), 2);
    }
}
