use std::fmt;

use crate::types::LiteralError;

/// Which stage rejected the input. Callers usually only need to know that
/// parsing failed; the kind is there for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// No token matches the input at some position.
    Lexical,
    /// The tokens do not form an expression.
    Grammar,
    /// A literal failed its field's validation.
    Validation,
}

/// Errors produced when parsing filter text.
#[derive(Debug, Clone)]
pub struct ParseError {
    kind: ParseErrorKind,
    message: String,
    offset: Option<usize>,
    source: Option<LiteralError>,
}

impl ParseError {
    pub(crate) fn lexical(offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::Lexical,
            message: message.into(),
            offset: Some(offset),
            source: None,
        }
    }

    pub(crate) fn grammar(offset: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::Grammar,
            message: message.into(),
            offset,
            source: None,
        }
    }

    pub(crate) fn validation(offset: usize, source: LiteralError) -> Self {
        Self {
            kind: ParseErrorKind::Validation,
            message: source.to_string(),
            offset: Some(offset),
            source: Some(source),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// Byte offset into the source text, when the failure has a position.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "parse error at offset {offset}: {}", self.message),
            None => write!(f, "parse error: {}", self.message),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
