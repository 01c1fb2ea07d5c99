//! Parse error types.

use ccl_ast::Span;
use ccl_lexer::Token;
use std::fmt;

/// Parse error with source location and context.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Kind of parse error
    pub kind: ParseErrorKind,
    /// Source location where the error occurred
    pub span: Span,
    /// Human-readable error message
    pub message: String,
}

/// Category of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A specific token was expected but a different one was found
    UnexpectedToken,
    /// End of input while a construct was incomplete
    UnexpectedEof,
    /// Tokens present but violating the grammar structurally
    InvalidSyntax,
}

impl ParseError {
    /// Create an "expected token" error.
    pub fn expected(expected: &str, found: Option<&Token>, span: Span) -> Self {
        let message = match found {
            Some(token) => format!("Expected {expected}, found '{token}'."),
            None => format!("Expected {expected}, found end of input."),
        };
        Self {
            kind: if found.is_none() {
                ParseErrorKind::UnexpectedEof
            } else {
                ParseErrorKind::UnexpectedToken
            },
            span,
            message,
        }
    }

    /// Create an "unexpected token" error with surrounding context.
    pub fn unexpected(found: Option<&Token>, context: &str, span: Span) -> Self {
        let message = match found {
            Some(token) => format!("Unexpected '{token}' {context}."),
            None => format!("Unexpected end of input {context}."),
        };
        Self {
            kind: if found.is_none() {
                ParseErrorKind::UnexpectedEof
            } else {
                ParseErrorKind::UnexpectedToken
            },
            span,
            message,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::InvalidSyntax,
            span,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}
