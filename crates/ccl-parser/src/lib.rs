//! Hand-written recursive descent parser for CCL.
//!
//! Produces the untyped syntax tree of `ccl-ast` from the token stream of
//! `ccl-lexer`. Expressions use a small Pratt core; constraints and the five
//! annotation shapes are keyword-dispatched with one-token backtracking
//! where the grammar needs it.

pub mod parser;

pub use parser::{parse_method, ParseError, ParseErrorKind};

// Re-export lexer for convenience
pub use ccl_lexer::Token;
