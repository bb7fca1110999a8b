//! Diagnostics for `.bdd` scripts.
//!
//! The lexer and parser produce plain [`CompileError`]s carrying byte spans. [`SyntaxReport`]
//! attaches the file name and source text so the CLI can render them through `miette`.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::ast::Span;

/// A lexing or parsing error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub kind: ErrorKind,
    pub hints: Vec<String>,
}

impl CompileError {
    pub fn new(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            kind: ErrorKind::Lexical,
            hints: Vec::new(),
        }
    }

    pub fn syntax(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            kind: ErrorKind::Syntax,
            hints: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Lexical => write!(f, "lexical error"),
            ErrorKind::Syntax => write!(f, "syntax error"),
        }
    }
}

/// One error rendered against its source file.
#[derive(Debug, Error, Diagnostic)]
#[error("{kind}: {message}")]
#[diagnostic(code(specdrive::syntax))]
pub struct SyntaxDiagnostic {
    pub kind: ErrorKind,
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: SourceSpan,
    #[help]
    pub help: Option<String>,
}

/// Every error found in one file.
#[derive(Debug, Error, Diagnostic)]
#[error("could not parse {file} ({} error(s))", .errors.len())]
#[diagnostic(code(specdrive::parse_failed))]
pub struct SyntaxReport {
    pub file: String,
    #[related]
    pub errors: Vec<SyntaxDiagnostic>,
}

impl SyntaxReport {
    pub fn new(file: &str, source: &str, errors: &[CompileError]) -> Self {
        let errors = errors
            .iter()
            .map(|err| {
                let start = err.span.start.min(source.len());
                let len = err.span.len().min(source.len() - start);
                SyntaxDiagnostic {
                    kind: err.kind,
                    message: err.message.clone(),
                    src: NamedSource::new(file, source.to_string()),
                    span: (start, len).into(),
                    help: if err.hints.is_empty() {
                        None
                    } else {
                        Some(err.hints.join("\n"))
                    },
                }
            })
            .collect();
        Self {
            file: file.to_string(),
            errors,
        }
    }
}

/// Line/column lookup for byte offsets.
///
/// Built once per source file so failure traces can name `file:line:col` cheaply.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// 1-based line and column for a byte offset (clamped to the source length).
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }
}
