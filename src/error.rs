//! Structured parse failure reporting.
//!
//! One error type for the whole pipeline: the lexer, the statement parser,
//! and the interpolated-string engine all fail with a [`ParseError`] carrying
//! a kind, a human-readable message, and the offending source span.  The
//! first error aborts the parse — there is no recovery and never a partial
//! tree alongside an error.

use crate::ast::Span;
use thiserror::Error;

/// Coarse failure category, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid character, unterminated string/bracket, inconsistent
    /// indentation.
    Lexical,
    /// Unexpected or missing token, malformed clause ordering.
    Syntax,
    /// Syntactically recognisable but intentionally unimplemented forms,
    /// e.g. chained comparisons.
    Unsupported,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "LexicalError",
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Unsupported => "UnsupportedConstructError",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("{}: {message} at {span}", kind.as_str())]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn lexical(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ErrorKind::Lexical,
            message: message.into(),
            span,
        }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            message: message.into(),
            span,
        }
    }

    pub fn unsupported(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ErrorKind::Unsupported,
            message: message.into(),
            span,
        }
    }
}

/// Result alias used throughout the parser.
pub type ParseResult<T> = Result<T, ParseError>;
