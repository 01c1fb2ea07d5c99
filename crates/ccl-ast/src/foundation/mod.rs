//! Foundation types shared by every stage of the pipeline.

pub mod span;
pub mod types;

pub use span::{SourceFile, Span};
pub use types::{NumericKind, ObjectKind, ParameterKind, Shape, Type};
