use thiserror::Error;

use crate::parse::ParseError;

/// Unified error type covering parsing, schema loading and I/O.
///
/// Returned by convenience constructors like
/// [`FilterCompiler::from_file()`](crate::FilterCompiler::from_file).
#[derive(Debug, Error)]
pub enum RulecastError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid schema JSON: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
