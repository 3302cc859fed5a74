//! Parse driver: read files, parse each one, and collect per-file reports.
//!
//! Files are independent, so the whole pass runs on rayon's thread pool.
//! Parse failures are data, not errors — a [`FileReport`] either carries the
//! statement count of a clean parse or the structured error that aborted it.
//! Only I/O failures (unreadable file, bad encoding) propagate as `anyhow`
//! errors.

use crate::error::ParseError;
use crate::location::span_start_line_col;
use crate::parser::parse;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Outcome of parsing one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    /// `None` when the file parsed cleanly.
    pub error: Option<ReportedError>,
    /// Top-level statement count, for quick summaries.
    pub statements: usize,
}

/// A parse failure with its position resolved to line/column.
#[derive(Debug, Clone, Serialize)]
pub struct ReportedError {
    /// Stable category name: `LexicalError`, `SyntaxError`, or
    /// `UnsupportedConstructError`.
    pub kind: String,
    pub message: String,
    /// 1-indexed.
    pub line: usize,
    /// 1-indexed.
    pub col: usize,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Parse every file in parallel.  Reports come back sorted by file name so
/// output is deterministic regardless of scheduling.
pub fn check_files(files: &[PathBuf]) -> Result<Vec<FileReport>> {
    let mut reports = files
        .par_iter()
        .map(check_file)
        .collect::<Result<Vec<_>>>()?;
    reports.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(reports)
}

fn check_file(path: &PathBuf) -> Result<FileReport> {
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let file = path.to_string_lossy().to_string();
    Ok(report_source(file, &source))
}

/// Parse one source buffer and build its report.
pub fn report_source(file: String, source: &str) -> FileReport {
    match parse(source) {
        Ok(module) => FileReport {
            file,
            error: None,
            statements: module.body.len(),
        },
        Err(e) => FileReport {
            file,
            error: Some(resolve_error(e, source)),
            statements: 0,
        },
    }
}

fn resolve_error(e: ParseError, source: &str) -> ReportedError {
    let (line, col) = span_start_line_col(e.span, source);
    ReportedError {
        kind: e.kind.as_str().to_string(),
        message: e.message,
        line,
        col,
    }
}

// ── tests ────────────────────────────────────────────────────────────────────
