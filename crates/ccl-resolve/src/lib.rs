//! Semantic analyser for CCL.
//!
//! Given a parsed method, the analyser resolves every identifier to a symbol
//! record, checks every expression, statement, annotation, constraint and
//! predicate against the CCL type system, and produces either a fully typed
//! tree or the single diagnostic for the first rule violated.

pub mod resolve;

pub use resolve::{analyse, AnalysedMethod};
pub use resolve::registry;
pub use resolve::scope::{
    PropertySig, ScopeStack, SubstitutionClause, SubstitutionSymbol, Symbol, SymbolKind,
};
