//! Constraint parser.
//!
//! Constraints are boolean trees over `and`/`or`/`not`, parenthesised
//! sub-constraints, relational comparisons, and predicate calls. At atom
//! position the grammar is ambiguous one token in (`(` may open a constraint
//! or a comparison operand; `name(` may start a predicate or a function call
//! inside a comparison), so the parser saves the stream position and
//! backtracks once.

use super::expr::parse_expr;
use super::{ParseError, TokenStream};
use ccl_ast::{Constraint, Expr, LogicOp, RelOp};
use ccl_lexer::Token;

/// Parse a constraint.
pub fn parse_constraint(stream: &mut TokenStream) -> Result<Constraint, ParseError> {
    parse_or(stream)
}

fn parse_or(stream: &mut TokenStream) -> Result<Constraint, ParseError> {
    let start = stream.current_pos();
    let mut left = parse_and(stream)?;
    while stream.check(&Token::Or) {
        stream.advance();
        let right = parse_and(stream)?;
        left = Constraint::Logical {
            op: LogicOp::Or,
            left: Box::new(left),
            right: Box::new(right),
            span: stream.span_from(start),
        };
    }
    Ok(left)
}

fn parse_and(stream: &mut TokenStream) -> Result<Constraint, ParseError> {
    let start = stream.current_pos();
    let mut left = parse_not(stream)?;
    while stream.check(&Token::And) {
        stream.advance();
        let right = parse_not(stream)?;
        left = Constraint::Logical {
            op: LogicOp::And,
            left: Box::new(left),
            right: Box::new(right),
            span: stream.span_from(start),
        };
    }
    Ok(left)
}

fn parse_not(stream: &mut TokenStream) -> Result<Constraint, ParseError> {
    if stream.check(&Token::Not) {
        let start = stream.current_pos();
        stream.advance();
        let inner = parse_not(stream)?;
        Ok(Constraint::Not {
            inner: Box::new(inner),
            span: stream.span_from(start),
        })
    } else {
        parse_constraint_atom(stream)
    }
}

/// Atom position: parenthesised constraint, comparison, or predicate.
fn parse_constraint_atom(stream: &mut TokenStream) -> Result<Constraint, ParseError> {
    let start = stream.current_pos();

    if stream.check(&Token::LParen) {
        // Try a parenthesised constraint first; on failure it was the left
        // parenthesis of a comparison operand.
        stream.advance();
        match parse_constraint(stream) {
            Ok(inner) if stream.check(&Token::RParen) => {
                stream.advance();
                return Ok(inner);
            }
            _ => stream.rewind(start),
        }
        return parse_compare(stream);
    }

    // Try a comparison; `bonded(i, j)` fails its expression parse (calls
    // take a single argument) or the relational operator check, and falls
    // back to a predicate.
    match parse_compare(stream) {
        Ok(compare) => Ok(compare),
        Err(_) => {
            stream.rewind(start);
            parse_predicate(stream)
        }
    }
}

fn rel_op(token: &Token) -> Option<RelOp> {
    match token {
        Token::Lt => Some(RelOp::Lt),
        Token::Le => Some(RelOp::Le),
        Token::Gt => Some(RelOp::Gt),
        Token::Ge => Some(RelOp::Ge),
        Token::EqEq => Some(RelOp::Eq),
        Token::BangEq => Some(RelOp::Ne),
        _ => None,
    }
}

fn parse_compare(stream: &mut TokenStream) -> Result<Constraint, ParseError> {
    let start = stream.current_pos();
    let left = parse_expr(stream)?;
    let op_span = stream.current_span();
    let op = stream
        .peek()
        .and_then(rel_op)
        .ok_or_else(|| ParseError::expected("relational operator", stream.peek(), op_span))?;
    stream.advance();
    let right = parse_expr(stream)?;
    Ok(Constraint::Compare {
        op,
        left,
        right,
        span: stream.span_from(start),
    })
}

fn parse_predicate(stream: &mut TokenStream) -> Result<Constraint, ParseError> {
    let start = stream.current_pos();
    let name = stream.expect_ident("predicate name")?;
    stream.expect(Token::LParen, "'('")?;
    let mut args: Vec<Expr> = Vec::new();
    if !stream.check(&Token::RParen) {
        args.push(parse_expr(stream)?);
        while stream.check(&Token::Comma) {
            stream.advance();
            args.push(parse_expr(stream)?);
        }
    }
    stream.expect(Token::RParen, "')'")?;
    Ok(Constraint::Predicate {
        name,
        args,
        span: stream.span_from(start),
    })
}
