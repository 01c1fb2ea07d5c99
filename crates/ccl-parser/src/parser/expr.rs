//! Expression parser - Pratt core plus the CCL special forms.

use super::{ParseError, TokenStream};
use ccl_ast::{BinaryOp, EeKind, Expr, NumericKind, UnaryOp, UntypedKind};
use ccl_lexer::Token;

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
}

/// Binary operator metadata: (precedence, associativity, op).
///
/// Higher precedence binds tighter; this table is the single source of truth
/// for arithmetic parsing.
fn binary_op_info(token: &Token) -> Option<(u8, Assoc, BinaryOp)> {
    match token {
        Token::Plus => Some((10, Assoc::Left, BinaryOp::Add)),
        Token::Minus => Some((10, Assoc::Left, BinaryOp::Sub)),
        Token::Star => Some((20, Assoc::Left, BinaryOp::Mul)),
        Token::Slash => Some((20, Assoc::Left, BinaryOp::Div)),
        Token::Caret => Some((40, Assoc::Right, BinaryOp::Pow)),
        _ => None,
    }
}

/// Parse an expression.
pub fn parse_expr(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    parse_pratt(stream, 0)
}

/// Precedence climbing over `binary_op_info`.
fn parse_pratt(stream: &mut TokenStream, min_prec: u8) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let mut left = parse_prefix(stream)?;

    while let Some(token) = stream.peek() {
        let Some((prec, assoc, op)) = binary_op_info(token) else {
            break;
        };
        if prec < min_prec {
            break;
        }
        stream.advance();

        let next_prec = if assoc == Assoc::Left { prec + 1 } else { prec };
        let right = parse_pratt(stream, next_prec)?;

        let span = stream.span_from(start);
        left = Expr::new(
            UntypedKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        );
    }

    Ok(left)
}

/// Prefix position: unary sign or an atom.
fn parse_prefix(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    match stream.peek() {
        Some(Token::Minus) | Some(Token::Plus) => {
            let start = stream.current_pos();
            let op = match stream.advance() {
                Some(Token::Minus) => UnaryOp::Neg,
                _ => UnaryOp::Pos,
            };
            let operand = parse_prefix(stream)?;
            let span = stream.span_from(start);
            Ok(Expr::new(
                UntypedKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ))
        }
        _ => parse_atom(stream),
    }
}

/// Atoms: literals, names, subscripts, calls, `sum`, `EE`, parens.
fn parse_atom(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    let span = stream.current_span();

    match stream.peek() {
        Some(Token::Int(value)) => {
            let value = *value as f64;
            stream.advance();
            Ok(Expr::new(
                UntypedKind::Number {
                    value,
                    kind: NumericKind::Int,
                },
                span,
            ))
        }
        Some(Token::Float(value)) => {
            let value = *value;
            stream.advance();
            Ok(Expr::new(
                UntypedKind::Number {
                    value,
                    kind: NumericKind::Float,
                },
                span,
            ))
        }
        Some(Token::Str(text)) => {
            let text = text.clone();
            stream.advance();
            Ok(Expr::new(UntypedKind::Str(text), span))
        }
        Some(Token::Sum) => parse_sum(stream),
        Some(Token::Ee) => parse_ee(stream),
        Some(Token::LParen) => {
            stream.advance();
            let inner = parse_expr(stream)?;
            stream.expect(Token::RParen, "')'")?;
            Ok(inner)
        }
        Some(Token::Ident(_)) => {
            let name = stream.expect_ident("identifier")?;
            match stream.peek() {
                Some(Token::LBracket) => {
                    let indices = parse_indices(stream)?;
                    Ok(Expr::new(
                        UntypedKind::Subscript { name, indices },
                        stream.span_from(start),
                    ))
                }
                Some(Token::LParen) => {
                    stream.advance();
                    let arg = parse_expr(stream)?;
                    stream.expect(Token::RParen, "')'")?;
                    Ok(Expr::new(
                        UntypedKind::Call {
                            function: name,
                            arg: Box::new(arg),
                        },
                        stream.span_from(start),
                    ))
                }
                _ => Ok(Expr::new(UntypedKind::Name(name), span)),
            }
        }
        found => Err(ParseError::unexpected(found, "in expression", span)),
    }
}

/// `[e]` or `[e1, e2]` - subscript indices, at most two.
fn parse_indices(stream: &mut TokenStream) -> Result<Vec<Expr>, ParseError> {
    stream.expect(Token::LBracket, "'['")?;
    let mut indices = vec![parse_expr(stream)?];
    while stream.check(&Token::Comma) {
        stream.advance();
        if indices.len() == 2 {
            return Err(ParseError::invalid_syntax(
                "Subscripts take at most two indices.",
                stream.current_span(),
            ));
        }
        indices.push(parse_expr(stream)?);
    }
    stream.expect(Token::RBracket, "']'")?;
    Ok(indices)
}

/// `sum[i](e)`
fn parse_sum(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Sum, "'sum'")?;
    stream.expect(Token::LBracket, "'['")?;
    let index = stream.expect_ident("sum index name")?;
    stream.expect(Token::RBracket, "']'")?;
    stream.expect(Token::LParen, "'('")?;
    let body = parse_expr(stream)?;
    stream.expect(Token::RParen, "')'")?;
    Ok(Expr::new(
        UntypedKind::Sum {
            index,
            body: Box::new(body),
        },
        stream.span_from(start),
    ))
}

/// `EE[i, j](diag, off, rhs [, cutoff|cover, r])`
fn parse_ee(stream: &mut TokenStream) -> Result<Expr, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::Ee, "'EE'")?;
    stream.expect(Token::LBracket, "'['")?;
    let row = stream.expect_ident("EE row index name")?;
    stream.expect(Token::Comma, "','")?;
    let col = stream.expect_ident("EE column index name")?;
    stream.expect(Token::RBracket, "']'")?;
    stream.expect(Token::LParen, "'('")?;
    let diag = parse_expr(stream)?;
    stream.expect(Token::Comma, "','")?;
    let off = parse_expr(stream)?;
    stream.expect(Token::Comma, "','")?;
    let rhs = parse_expr(stream)?;

    let (kind, radius) = if stream.check(&Token::Comma) {
        stream.advance();
        let kind_span = stream.current_span();
        let kind = match stream.advance() {
            Some(Token::Cutoff) => EeKind::Cutoff,
            Some(Token::Cover) => EeKind::Cover,
            found => return Err(ParseError::expected("'cutoff' or 'cover'", found, kind_span)),
        };
        stream.expect(Token::Comma, "','")?;
        let radius = parse_expr(stream)?;
        (kind, Some(Box::new(radius)))
    } else {
        (EeKind::Full, None)
    };

    stream.expect(Token::RParen, "')'")?;
    Ok(Expr::new(
        UntypedKind::Ee {
            row,
            col,
            diag: Box::new(diag),
            off: Box::new(off),
            rhs: Box::new(rhs),
            kind,
            radius,
        },
        stream.span_from(start),
    ))
}
