//! Byte-offset to line/column conversion.
//!
//! Tree nodes and errors carry byte-offset [`Span`]s; line and column are
//! derived lazily, only when a diagnostic is actually rendered.

use crate::ast::Span;

/// Convert a byte offset into (line, col), both 1-indexed.
pub fn offset_to_line_col(offset: usize, source: &str) -> (usize, usize) {
    let mut line = 1;
    let mut line_start = 0;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            line_start = i + 1;
        }
    }
    (line, offset - line_start + 1)
}

/// Line/col of the start of a span.
pub fn span_start_line_col(span: Span, source: &str) -> (usize, usize) {
    offset_to_line_col(span.start as usize, source)
}
