//! Statement and annotation parsers, keyword-dispatched.

use super::constraint::parse_constraint;
use super::expr::parse_expr;
use super::{ParseError, TokenStream};
use ccl_ast::{Annotation, LValue, Name, ObjectKind, ParameterKind, Statement, SubstitutionLhs};
use ccl_lexer::Token;

/// Known property phrases, longest first so multi-word names win the match.
const PROPERTY_PHRASES: &[&[&str]] = &[
    &["van", "der", "waals", "radius"],
    &["covalent", "radius"],
    &["bond", "order"],
    &["bond", "distance"],
    &["formal", "charge"],
    &["electronegativity"],
    &["covradius"],
    &["vdwradius"],
    &["distance"],
];

/// Parse statements until `where`, `done`, or end of input.
pub fn parse_statements(stream: &mut TokenStream) -> Result<Vec<Statement>, ParseError> {
    let mut statements = Vec::new();
    loop {
        match stream.peek() {
            None | Some(Token::Where) | Some(Token::Done) => break,
            Some(Token::For) => statements.push(parse_for(stream)?),
            Some(Token::Ident(_)) => statements.push(parse_assign(stream)?),
            found => {
                return Err(ParseError::unexpected(
                    found,
                    "in statement position",
                    stream.current_span(),
                ))
            }
        }
    }
    Ok(statements)
}

/// `lhs = rhs` where lhs is a name or `name[i(, j)]`.
fn parse_assign(stream: &mut TokenStream) -> Result<Statement, ParseError> {
    let start = stream.current_pos();
    let name = stream.expect_ident("assignment target")?;

    let lhs = if stream.check(&Token::LBracket) {
        stream.advance();
        let mut indices = vec![stream.expect_ident("index name")?];
        while stream.check(&Token::Comma) {
            stream.advance();
            if indices.len() == 2 {
                return Err(ParseError::invalid_syntax(
                    "Subscripts take at most two indices.",
                    stream.current_span(),
                ));
            }
            indices.push(stream.expect_ident("index name")?);
        }
        stream.expect(Token::RBracket, "']'")?;
        LValue::Subscript { name, indices }
    } else {
        LValue::Name(name)
    };

    stream.expect(Token::Assign, "'='")?;
    let rhs = parse_expr(stream)?;
    Ok(Statement::Assign {
        lhs,
        rhs,
        span: stream.span_from(start),
    })
}

/// `for i = lo to hi: body done` or `for each ...`.
fn parse_for(stream: &mut TokenStream) -> Result<Statement, ParseError> {
    let start = stream.current_pos();
    stream.expect(Token::For, "'for'")?;

    if stream.check(&Token::Each) {
        stream.advance();
        return parse_for_each(stream, start);
    }

    let var = stream.expect_ident("loop variable name")?;
    stream.expect(Token::Assign, "'='")?;
    let from = parse_expr(stream)?;
    stream.expect(Token::To, "'to'")?;
    let to = parse_expr(stream)?;
    stream.expect(Token::Colon, "':'")?;
    let body = parse_statements(stream)?;
    stream.expect(Token::Done, "'done'")?;

    Ok(Statement::For {
        var,
        from,
        to,
        body,
        span: stream.span_from(start),
    })
}

/// `for each (atom|bond) name [= [i, j]] [such that c]: body done`
fn parse_for_each(stream: &mut TokenStream, start: usize) -> Result<Statement, ParseError> {
    let kind = parse_object_kind(stream)?;
    let name = stream.expect_ident("iterator name")?;

    let decomposition = if stream.check(&Token::Assign) {
        stream.advance();
        let decomposition = parse_decomposition(stream)?;
        if kind != ObjectKind::Bond {
            return Err(ParseError::invalid_syntax(
                "Only bonds can be decomposed.",
                stream.span_from(start),
            ));
        }
        Some(decomposition)
    } else {
        None
    };

    let constraint = parse_such_that(stream)?;
    stream.expect(Token::Colon, "':'")?;
    let body = parse_statements(stream)?;
    stream.expect(Token::Done, "'done'")?;

    Ok(Statement::ForEach {
        name,
        kind,
        decomposition,
        constraint,
        body,
        span: stream.span_from(start),
    })
}

fn parse_object_kind(stream: &mut TokenStream) -> Result<ObjectKind, ParseError> {
    let span = stream.current_span();
    match stream.peek() {
        Some(Token::Atom) => {
            stream.advance();
            Ok(ObjectKind::Atom)
        }
        Some(Token::Bond) => {
            stream.advance();
            Ok(ObjectKind::Bond)
        }
        found => Err(ParseError::expected("'atom' or 'bond'", found, span)),
    }
}

/// `[i, j]` of a bond decomposition.
fn parse_decomposition(stream: &mut TokenStream) -> Result<(Name, Name), ParseError> {
    stream.expect(Token::LBracket, "'['")?;
    let first = stream.expect_ident("atom index name")?;
    stream.expect(Token::Comma, "','")?;
    let second = stream.expect_ident("atom index name")?;
    stream.expect(Token::RBracket, "']'")?;
    Ok((first, second))
}

/// Optional `such that constraint`.
fn parse_such_that(stream: &mut TokenStream) -> Result<Option<ccl_ast::Constraint>, ParseError> {
    if stream.check(&Token::Such) {
        stream.advance();
        stream.expect(Token::That, "'that'")?;
        Ok(Some(parse_constraint(stream)?))
    } else {
        Ok(None)
    }
}

/// Parse annotations until end of input.
pub fn parse_annotations(stream: &mut TokenStream) -> Result<Vec<Annotation>, ParseError> {
    let mut annotations = Vec::new();
    while !stream.at_end() {
        annotations.push(parse_annotation(stream)?);
    }
    Ok(annotations)
}

/// One annotation, dispatched on the token after the leading name.
fn parse_annotation(stream: &mut TokenStream) -> Result<Annotation, ParseError> {
    let start = stream.current_pos();
    let name = stream.expect_ident("annotation name")?;

    match stream.peek() {
        Some(Token::Is) => {
            stream.advance();
            parse_is_annotation(stream, name, start)
        }
        Some(Token::Assign) => {
            stream.advance();
            if stream.check(&Token::LBracket) {
                // `name = [i, j] is bond` - decomposed object annotation
                let decomposition = parse_decomposition(stream)?;
                stream.expect(Token::Is, "'is'")?;
                let kind = parse_object_kind(stream)?;
                if kind != ObjectKind::Bond {
                    return Err(ParseError::invalid_syntax(
                        "Only bonds can be decomposed.",
                        stream.span_from(start),
                    ));
                }
                let constraint = parse_such_that(stream)?;
                Ok(Annotation::Object {
                    name,
                    kind,
                    decomposition: Some(decomposition),
                    constraint,
                    span: stream.span_from(start),
                })
            } else {
                parse_substitution(stream, SubstitutionLhs::Name(name), start)
            }
        }
        Some(Token::LBracket) => {
            // `name[i(, j)] = rhs [if c]`
            stream.advance();
            let mut indices = vec![stream.expect_ident("index name")?];
            while stream.check(&Token::Comma) {
                stream.advance();
                if indices.len() == 2 {
                    return Err(ParseError::invalid_syntax(
                        "Subscripts take at most two indices.",
                        stream.current_span(),
                    ));
                }
                indices.push(stream.expect_ident("index name")?);
            }
            stream.expect(Token::RBracket, "']'")?;
            stream.expect(Token::Assign, "'='")?;
            parse_substitution(stream, SubstitutionLhs::Indexed { name, indices }, start)
        }
        found => Err(ParseError::unexpected(
            found,
            "in annotation",
            stream.current_span(),
        )),
    }
}

/// The `name is ...` annotation family.
fn parse_is_annotation(
    stream: &mut TokenStream,
    name: Name,
    start: usize,
) -> Result<Annotation, ParseError> {
    match (stream.peek(), stream.peek_nth(1)) {
        (Some(Token::Atom), Some(Token::Parameter)) => {
            stream.advance();
            stream.advance();
            Ok(Annotation::Parameter {
                name,
                kind: ParameterKind::Atom,
                span: stream.span_from(start),
            })
        }
        (Some(Token::Bond), Some(Token::Parameter)) => {
            stream.advance();
            stream.advance();
            Ok(Annotation::Parameter {
                name,
                kind: ParameterKind::Bond,
                span: stream.span_from(start),
            })
        }
        (Some(Token::Common), _) => {
            stream.advance();
            stream.expect(Token::Parameter, "'parameter'")?;
            Ok(Annotation::Parameter {
                name,
                kind: ParameterKind::Common,
                span: stream.span_from(start),
            })
        }
        (Some(Token::Atom), _) => {
            stream.advance();
            let constraint = parse_such_that(stream)?;
            Ok(Annotation::Object {
                name,
                kind: ObjectKind::Atom,
                decomposition: None,
                constraint,
                span: stream.span_from(start),
            })
        }
        // `bond order` / `bond distance` are property phrases; a bare
        // `is bond` is an object annotation.
        (Some(Token::Bond), next) if !is_property_continuation(next) => {
            stream.advance();
            let constraint = parse_such_that(stream)?;
            Ok(Annotation::Object {
                name,
                kind: ObjectKind::Bond,
                decomposition: None,
                constraint,
                span: stream.span_from(start),
            })
        }
        _ => parse_property_or_constant(stream, name, start),
    }
}

fn is_property_continuation(token: Option<&Token>) -> bool {
    matches!(token, Some(Token::Ident(text)) if text == "order" || text == "distance")
}

/// Text of a token usable as a property-phrase word.
fn word_text(token: Option<&Token>) -> Option<&str> {
    match token {
        Some(Token::Ident(text)) => Some(text.as_str()),
        Some(Token::Bond) => Some("bond"),
        _ => None,
    }
}

/// `name is <phrase>` or `name is <phrase> of <element>`.
///
/// The phrase is matched longest-first against the known property names; an
/// unmatched word is kept verbatim for the resolver to reject.
fn parse_property_or_constant(
    stream: &mut TokenStream,
    name: Name,
    start: usize,
) -> Result<Annotation, ParseError> {
    let mut property = None;
    for phrase in PROPERTY_PHRASES {
        let matches = phrase
            .iter()
            .enumerate()
            .all(|(i, word)| word_text(stream.peek_nth(i)) == Some(*word));
        if matches {
            for _ in 0..phrase.len() {
                stream.advance();
            }
            property = Some(phrase.join(" "));
            break;
        }
    }

    let property = match property {
        Some(property) => property,
        None => {
            let span = stream.current_span();
            match word_text(stream.peek()) {
                Some(word) => {
                    let word = word.to_string();
                    stream.advance();
                    word
                }
                None => {
                    return Err(ParseError::expected(
                        "property name",
                        stream.peek(),
                        span,
                    ))
                }
            }
        }
    };

    if matches!(stream.peek(), Some(Token::Ident(text)) if text == "of") {
        stream.advance();
        let element = stream.expect_ident("element name")?;
        return Ok(Annotation::Constant {
            name,
            property,
            element: element.text,
            span: stream.span_from(start),
        });
    }

    Ok(Annotation::Property {
        name,
        property,
        span: stream.span_from(start),
    })
}

/// Rhs and optional `if` clause of a substitution annotation.
fn parse_substitution(
    stream: &mut TokenStream,
    lhs: SubstitutionLhs,
    start: usize,
) -> Result<Annotation, ParseError> {
    let rhs = parse_expr(stream)?;
    let constraint = if stream.check(&Token::If) {
        stream.advance();
        Some(parse_constraint(stream)?)
    } else {
        None
    };
    Ok(Annotation::Substitution {
        lhs,
        rhs,
        constraint,
        span: stream.span_from(start),
    })
}
