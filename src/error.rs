//! Diagnostic model: single-shot parse-or-fail with a located message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::span::Span;

/// Internal failure taxonomy used while parsing. Never exposed past the
/// crate boundary — callers see [`Diagnostic`] instead, which is the stable
/// wire shape described by the JSON diagnostic format.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{message}")]
    Lex { message: String, span: Span },
    #[error("{message}")]
    Syntax { message: String, span: Span },
    #[error("{message}")]
    Shape { message: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex { span, .. }
            | ParseError::Syntax { span, .. }
            | ParseError::Shape { span, .. } => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::Lex { message, .. }
            | ParseError::Syntax { message, .. }
            | ParseError::Shape { message, .. } => message,
        }
    }

    pub fn lex(message: impl Into<String>, span: Span) -> Self {
        ParseError::Lex {
            message: message.into(),
            span,
        }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        ParseError::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn shape(message: impl Into<String>, span: Span) -> Self {
        ParseError::Shape {
            message: message.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

/// The one diagnostic a `parse`/`lint` call can ever produce. Carries enough
/// to compute the `{line, column, offset, length}` wire tuple from the
/// original source text on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn from_parse_error(source: &str, err: &ParseError) -> Self {
        let _ = source;
        Diagnostic {
            message: err.message().to_string(),
            span: err.span(),
            severity: Severity::Error,
        }
    }

    /// Computes 1-based line/column for this diagnostic's span start by
    /// scanning the consumed prefix of `source`. Only paid for on the error
    /// path; the lexer/parser hot path never tracks line/column eagerly.
    pub fn line_column(&self, source: &str) -> (usize, usize) {
        let mut line = 1usize;
        let mut col = 1usize;
        for byte in source.as_bytes().iter().take(self.span.begin) {
            if *byte == b'\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    pub fn to_json(&self, source: &str) -> serde_json::Value {
        let (line, column) = self.line_column(source);
        serde_json::json!({
            "line": line,
            "column": column,
            "offset": self.span.begin,
            "length": self.span.len(),
            "severity": "error",
            "message": self.message,
        })
    }
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        Diagnostic {
            message: err.message().to_string(),
            span: err.span(),
            severity: Severity::Error,
        }
    }
}
