//! # CCL compiler front end
//!
//! CCL (Charge Calculation Language) is a small domain-specific language for
//! describing empirical methods that compute partial atomic charges for
//! molecules. This crate is a facade over the pipeline stages:
//!
//! ```text
//! ccl-ast      - AST + foundation types (Span, Type, Shape, Diagnostic)
//! ccl-lexer    - tokenization (logos)
//! ccl-parser   - hand-written recursive descent parser
//! ccl-resolve  - semantic analysis: symbols, types, substitutions
//! ```
//!
//! ## Usage
//!
//! ```
//! let source = "for each atom a:\n    q[a] = 0.0\ndone";
//! let analysed = ccl::analyse_source(source).unwrap();
//! assert_eq!(analysed.symbol("q").unwrap().kind.describe(), "Float[Atom]");
//! ```
//!
//! Analysis is fail-fast: the first rule violated aborts the run with a
//! single-sentence [`Diagnostic`] whose wording is part of the contract.

// Re-export AST and foundation types
pub use ccl_ast::{self as ast, *};

// Re-export lexer
pub use ccl_lexer as lexer;
pub use ccl_lexer::Token;

// Re-export parser
pub use ccl_parser as parser;
pub use ccl_parser::{parse_method, ParseError};

// Re-export the analyser
pub use ccl_resolve as resolve;
pub use ccl_resolve::{analyse, AnalysedMethod, Symbol, SymbolKind};

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the full front end on a method source: lex, parse, analyse.
///
/// Parse errors are converted into `Syntax` diagnostics so callers deal with
/// a single error type.
pub fn analyse_source(source: &str) -> Result<AnalysedMethod, Diagnostic> {
    let file = SourceFile::new(source.to_string());
    let tokens = ccl_lexer::lex(source)?;
    let method = ccl_parser::parse_method(&tokens, &file)
        .map_err(|err| Diagnostic::syntax(err.span, err.message))?;
    ccl_resolve::analyse(&method)
}

/// Parse a method source without analysing it.
pub fn parse_source(source: &str) -> Result<Method, Diagnostic> {
    let file = SourceFile::new(source.to_string());
    let tokens = ccl_lexer::lex(source)?;
    ccl_parser::parse_method(&tokens, &file)
        .map_err(|err| Diagnostic::syntax(err.span, err.message))
}
