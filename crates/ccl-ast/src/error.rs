//! Diagnostics.
//!
//! The analyser is fail-fast: it reports exactly one diagnostic per run, and
//! the wording of that single sentence is the acceptance contract. A
//! `Diagnostic` therefore carries the finished message; `Display` prints it
//! verbatim and nothing else.

use crate::foundation::{SourceFile, Span};
use std::fmt;

/// A single fatal diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Category of the violated rule
    pub kind: DiagnosticKind,
    /// Where the first violation was detected
    pub span: Span,
    /// The fixed, capitalised sentence
    pub message: String,
}

/// Category of diagnostic, by the class of rule violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Lexing or parsing failure
    Syntax,
    /// A name did not resolve to any symbol
    UndefinedSymbol,
    /// A name was already bound on the scope walk
    Redefinition,
    /// A symbol of one class used as another (assigning to a parameter,
    /// indexing a common parameter, ...)
    ClassMisuse,
    /// Array shape, operator, or function signature violation
    TypeMismatch,
    /// Substitution clause set inconsistency (missing default, disagreeing
    /// clause types or index kinds, nesting)
    SubstitutionConsistency,
    /// Predicate misuse (unknown, wrong arity, bad argument)
    PredicateMisuse,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn syntax(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Syntax, span, message)
    }

    /// Render as `line:col: message` against the method source.
    pub fn format_with_location(&self, file: &SourceFile) -> String {
        let (line, col) = file.line_col(self.span.start);
        format!("{}:{}: {}", line, col, self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_message_only() {
        let d = Diagnostic::new(
            DiagnosticKind::Redefinition,
            Span::new(0, 1, 1),
            "Symbol a already defined.",
        );
        assert_eq!(d.to_string(), "Symbol a already defined.");
    }

    #[test]
    fn test_format_with_location() {
        let file = SourceFile::new("q = 1\nwhere\na is atom".to_string());
        let d = Diagnostic::new(
            DiagnosticKind::Redefinition,
            Span::new(12, 13, 3),
            "Symbol a already defined.",
        );
        assert_eq!(
            d.format_with_location(&file),
            "3:1: Symbol a already defined."
        );
    }
}
