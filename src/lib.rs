//! Compiles a typed boolean filter language into disjunctive normal form and
//! renders it as nested-array rule notation.
//!
//! ```
//! let filter = rulecast::parse(
//!     "http.method == 'GET' and (ip.geoip.asn == 1234 or ip.geoip.asn == 345)",
//! )
//! .unwrap();
//! assert!(!filter.original_was_dnf());
//! assert_eq!(
//!     filter.to_json(),
//!     serde_json::json!([
//!         "OR",
//!         ["AND", ["request_method", "==", "GET"], ["geoip2_data_asn", "==", "1234"]],
//!         ["AND", ["request_method", "==", "GET"], ["geoip2_data_asn", "==", "345"]]
//!     ])
//! );
//! ```

mod algebra;
mod error;
pub mod parse;
mod render;
mod types;

pub use error::RulecastError;
pub use parse::{ParseError, ParseErrorKind};
pub use render::Renderer;
pub use types::{
    validate_default, BoolTargets, Conjunction, DefaultBehavior, Disjunction, DslOp, Expr, Field,
    FieldFamily, FieldKey, FieldMap, FieldSpec, Filter, FilterCompiler, KeyedSpec, Literal,
    LiteralBehavior, LiteralError, Notation, OperatorTable, ParseOptions, Schema, Value, ValueKind,
};

/// Parse `input` against the built-in HTTP/IP schema.
///
/// Parentheses are handled by recursion, one level per group, so extremely
/// deep nesting can exhaust the thread's stack.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid filter.
pub fn parse(input: &str) -> Result<Filter, ParseError> {
    FilterCompiler::default().parse(input)
}
