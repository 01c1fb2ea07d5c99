//! Token stream wrapper for the hand-written parser.

use super::ParseError;
use ccl_ast::{Name, SourceFile, Span};
use ccl_lexer::Token;
use std::ops::Range;

/// Token stream with lookahead, position tracking, and rewind.
///
/// Each token is paired with its byte span in the method source. The stream
/// keeps a reference to the `SourceFile` so spans it hands out carry real
/// line numbers. `rewind` enables the one-token backtracking the constraint
/// grammar needs.
pub struct TokenStream<'src> {
    tokens: &'src [(Token, Range<usize>)],
    file: &'src SourceFile,
    pos: usize,
}

impl<'src> TokenStream<'src> {
    pub fn new(tokens: &'src [(Token, Range<usize>)], file: &'src SourceFile) -> Self {
        Self {
            tokens,
            file,
            pos: 0,
        }
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    /// Peek at the nth token ahead without consuming.
    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(tok, _)| tok)
    }

    /// Advance to the next token and return the consumed one.
    pub fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos).map(|(tok, _)| tok);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Check whether the current token matches `expected` (by discriminant).
    pub fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(t) if std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    /// Consume the current token if it matches, reporting `what` otherwise.
    pub fn expect(&mut self, expected: Token, what: &str) -> Result<Span, ParseError> {
        if self.check(&expected) {
            let start = self.pos;
            self.advance();
            Ok(self.span_from(start))
        } else {
            Err(ParseError::expected(what, self.peek(), self.current_span()))
        }
    }

    /// Consume an identifier token, returning it as a `Name`.
    pub fn expect_ident(&mut self, what: &str) -> Result<Name, ParseError> {
        let span = self.current_span();
        match self.peek() {
            Some(Token::Ident(text)) => {
                let name = Name::new(text.clone(), span);
                self.advance();
                Ok(name)
            }
            found => Err(ParseError::expected(what, found, span)),
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Current position, for `span_from` and `rewind`.
    pub fn current_pos(&self) -> usize {
        self.pos
    }

    /// Reset the stream to a previously saved position.
    pub fn rewind(&mut self, pos: usize) {
        debug_assert!(pos <= self.tokens.len());
        self.pos = pos;
    }

    /// Span from the token at `start` through the last consumed token.
    pub fn span_from(&self, start: usize) -> Span {
        let Some((_, first)) = self.tokens.get(start) else {
            return self.current_span();
        };
        let start_byte = first.start as u32;
        let end_byte = if self.pos > start {
            self.tokens
                .get(self.pos - 1)
                .map(|(_, r)| r.end as u32)
                .unwrap_or(start_byte)
        } else {
            first.end as u32
        };
        Span::new(start_byte, end_byte, self.file.line_of(start_byte))
    }

    /// Span of the current token, or a point span at EOF.
    pub fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, range)) => Span::new(
                range.start as u32,
                range.end as u32,
                self.file.line_of(range.start as u32),
            ),
            None => {
                let end = self
                    .tokens
                    .last()
                    .map(|(_, r)| r.end as u32)
                    .unwrap_or(0);
                Span::new(end, end, self.file.line_of(end))
            }
        }
    }
}
