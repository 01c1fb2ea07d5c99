//! AST and foundation types for CCL (Charge Calculation Language).
//!
//! CCL describes empirical methods that compute partial atomic charges for
//! molecules. This crate holds everything the pipeline stages share:
//!
//! - `foundation` - source spans, the type algebra (scalars, object kinds,
//!   shape-indexed arrays, parameter categories)
//! - `ast` - the untyped tree produced by the parser and the typed mirror
//!   produced by the analyser
//! - `error` - the single-sentence diagnostic type whose wording is the
//!   acceptance contract of the analyser

pub mod ast;
pub mod error;
pub mod foundation;

pub use ast::*;
pub use error::{Diagnostic, DiagnosticKind};
pub use foundation::{NumericKind, ObjectKind, ParameterKind, Shape, SourceFile, Span, Type};
