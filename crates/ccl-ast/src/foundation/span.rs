//! Source location tracking for diagnostics.
//!
//! The analyser processes a single method per run, so a span is just a byte
//! range into that one source plus a cached line number. `SourceFile` keeps
//! the line-start index needed to turn offsets into `(line, column)` pairs.

use serde::{Deserialize, Serialize};

/// Byte range in the method source, with a cached 1-based start line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the start position
    pub start: u32,
    /// Byte offset of the end position (exclusive)
    pub end: u32,
    /// 1-based line of the start position
    pub line: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(start: u32, end: u32, line: u32) -> Self {
        Self { start, end, line }
    }

    /// Zero-length span at the start of the source.
    pub fn zero() -> Self {
        Self::new(0, 0, 1)
    }

    /// Span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line.min(other.line),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A single method source with line indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Original source text
    pub source: String,
    /// Byte offsets of each line start; `line_starts[0]` is always 0 and the
    /// last entry is the EOF sentinel
    line_starts: Vec<u32>,
}

impl SourceFile {
    pub fn new(source: String) -> Self {
        let line_starts = compute_line_starts(&source);
        Self {
            source,
            line_starts,
        }
    }

    /// 1-based `(line, column)` for a byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.source.len() as u32);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.max(1) - 1,
        };
        let line = (line_idx + 1) as u32;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Source text covered by a span.
    pub fn snippet(&self, span: &Span) -> &str {
        &self.source[span.start as usize..span.end as usize]
    }

    /// Text of a 1-based line, without the trailing newline.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        if line == 0 || line as usize >= self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[(line - 1) as usize] as usize;
        let end = self.line_starts[line as usize] as usize;
        Some(self.source[start..end].trim_end_matches('\n'))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len() - 1
    }

    /// Line number (1-based) a byte offset falls on.
    pub fn line_of(&self, offset: u32) -> u32 {
        self.line_col(offset).0
    }
}

fn compute_line_starts(source: &str) -> Vec<u32> {
    let mut line_starts = vec![0];
    for (idx, ch) in source.char_indices() {
        if ch == '\n' {
            line_starts.push((idx + 1) as u32);
        }
    }
    if line_starts.last() != Some(&(source.len() as u32)) {
        line_starts.push(source.len() as u32);
    }
    line_starts
}
