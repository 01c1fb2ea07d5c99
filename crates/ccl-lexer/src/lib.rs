//! Lexical analysis for CCL.
//!
//! Tokenization of CCL method source using logos. Multi-word keywords of the
//! surface syntax (`for each`, `such that`) are emitted as token pairs and
//! recombined by the parser. `#` comments and whitespace are skipped.

use ccl_ast::{Diagnostic, SourceFile, Span};
use logos::Logos;
use std::fmt;
use std::ops::Range;

/// CCL token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    // === Keywords ===
    #[token("to")]
    To,
    #[token("such")]
    Such,
    #[token("that")]
    That,
    #[token("each")]
    Each,
    #[token("for")]
    For,
    #[token("where")]
    Where,
    #[token("done")]
    Done,
    #[token("is")]
    Is,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("parameter")]
    Parameter,
    #[token("if")]
    If,
    #[token("sum")]
    Sum,
    #[token("atom")]
    Atom,
    #[token("bond")]
    Bond,
    #[token("common")]
    Common,
    #[token("EE")]
    Ee,
    #[token("cutoff")]
    Cutoff,
    #[token("cover")]
    Cover,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("=")]
    Assign,

    // === Relational ===
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,

    // === Brackets and punctuation ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    // === Literals and identifiers ===
    #[regex(r"[A-Za-z][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Ident(String),

    #[regex(r"[0-9]+\.[0-9]*", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_owned()
    })]
    Str(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::To => write!(f, "to"),
            Token::Such => write!(f, "such"),
            Token::That => write!(f, "that"),
            Token::Each => write!(f, "each"),
            Token::For => write!(f, "for"),
            Token::Where => write!(f, "where"),
            Token::Done => write!(f, "done"),
            Token::Is => write!(f, "is"),
            Token::And => write!(f, "and"),
            Token::Or => write!(f, "or"),
            Token::Not => write!(f, "not"),
            Token::Parameter => write!(f, "parameter"),
            Token::If => write!(f, "if"),
            Token::Sum => write!(f, "sum"),
            Token::Atom => write!(f, "atom"),
            Token::Bond => write!(f, "bond"),
            Token::Common => write!(f, "common"),
            Token::Ee => write!(f, "EE"),
            Token::Cutoff => write!(f, "cutoff"),
            Token::Cover => write!(f, "cover"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::Assign => write!(f, "="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::EqEq => write!(f, "=="),
            Token::BangEq => write!(f, "!="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Float(v) => write!(f, "{v}"),
            Token::Int(v) => write!(f, "{v}"),
            Token::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Tokenize a method source into `(token, byte range)` pairs.
///
/// An unlexable character aborts with a `Syntax` diagnostic pointing at it.
pub fn lex(source: &str) -> Result<Vec<(Token, Range<usize>)>, Diagnostic> {
    let file = SourceFile::new(source.to_string());
    let mut tokens = Vec::new();
    for (result, range) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push((token, range)),
            Err(()) => {
                let span = Span::new(
                    range.start as u32,
                    range.end as u32,
                    file.line_of(range.start as u32),
                );
                let bad = &source[range.clone()];
                return Err(Diagnostic::syntax(
                    span,
                    format!("Unexpected character '{bad}'."),
                ));
            }
        }
    }
    Ok(tokens)
}
