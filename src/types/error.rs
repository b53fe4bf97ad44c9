use thiserror::Error;

use super::field::FieldFamily;
use super::operator::DslOp;
use super::value::ValueKind;

/// A `(field, operator, value)` triple that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("'{op}' cannot be used with {family} field '{field}'")]
    UnsupportedOperator {
        field: String,
        family: FieldFamily,
        op: DslOp,
    },

    #[error("'{field} {op}' expects a {expected}, got a {found}")]
    KindMismatch {
        field: String,
        op: DslOp,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("'{field}' only accepts true or false, got '{value}'")]
    NonCanonicalBool { field: String, value: String },

    #[error("invalid IPv4 address '{value}' for '{field}'")]
    InvalidIp { field: String, value: String },

    #[error("invalid network prefix in '{value}' for '{field}'")]
    InvalidPrefix { field: String, value: String },

    #[error("empty list given to '{field}'")]
    EmptyList { field: String },

    #[error("{0}")]
    Custom(String),
}
