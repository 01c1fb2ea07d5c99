//! Recursive descent parser for CCL methods.
//!
//! - `stream`: TokenStream wrapper with lookahead and rewind
//! - `error`: ParseError
//! - `expr`: Pratt expression parser
//! - `constraint`: boolean constraint parser
//! - `decl`: statements and the five annotation shapes

mod error;
mod stream;

pub use error::{ParseError, ParseErrorKind};
pub(crate) use stream::TokenStream;

mod constraint;
mod decl;
mod expr;

use ccl_ast::{Method, SourceFile};
use ccl_lexer::Token;
use std::ops::Range;

/// Parse a token stream into a `Method`.
///
/// The method header name is optional: a leading lone identifier (not
/// followed by `=` or `[`) is taken as the header, anything else starts the
/// statement list. Annotations follow the `where` keyword.
pub fn parse_method(
    tokens: &[(Token, Range<usize>)],
    file: &SourceFile,
) -> Result<Method, ParseError> {
    let mut stream = TokenStream::new(tokens, file);
    let start = stream.current_pos();

    let name = match (stream.peek(), stream.peek_nth(1)) {
        (Some(Token::Ident(_)), next)
            if !matches!(next, Some(Token::Assign) | Some(Token::LBracket)) =>
        {
            Some(stream.expect_ident("method name")?)
        }
        _ => None,
    };

    let statements = decl::parse_statements(&mut stream)?;

    let annotations = if stream.check(&Token::Where) {
        stream.advance();
        decl::parse_annotations(&mut stream)?
    } else {
        Vec::new()
    };

    if !stream.at_end() {
        return Err(ParseError::unexpected(
            stream.peek(),
            "after method",
            stream.current_span(),
        ));
    }

    Ok(Method {
        name,
        statements,
        annotations,
        span: stream.span_from(start),
    })
}
