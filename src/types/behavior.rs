use std::fmt;
use std::net::Ipv4Addr;
use std::sync::{Arc, LazyLock};

use super::error::LiteralError;
use super::expr::Literal;
use super::field::{Field, FieldFamily};
use super::notation::Notation;
use super::value::Value;
use crate::render::Renderer;

/// Per-field strategy for validating and rendering literals.
///
/// Every method has a default that applies the stock rules, so an
/// override only implements what it changes. Overrides are registered per
/// parse through [`ParseOptions::literal_behavior`](crate::ParseOptions::literal_behavior)
/// and only affect literals of the field they are registered for.
///
/// ```
/// use rulecast::{Literal, LiteralBehavior, LiteralError, ParseOptions, Value};
///
/// #[derive(Debug)]
/// struct TwoLetterCountry;
///
/// impl LiteralBehavior for TwoLetterCountry {
///     fn validate(&self, literal: &Literal) -> Result<(), LiteralError> {
///         match literal.value() {
///             Value::Str(code) if code.len() == 2 => Ok(()),
///             other => Err(LiteralError::Custom(format!("{other} is not a country code"))),
///         }
///     }
/// }
///
/// let options = ParseOptions::new().literal_behavior("ip.geoip.country", TwoLetterCountry);
/// let compiler = rulecast::FilterCompiler::default();
/// assert!(compiler.parse_with("ip.geoip.country == 'DE'", &options).is_ok());
/// assert!(compiler.parse_with("ip.geoip.country == 'DEU'", &options).is_err());
/// ```
pub trait LiteralBehavior: fmt::Debug + Send + Sync {
    /// Reject literals this field cannot express.
    ///
    /// # Errors
    ///
    /// Returns a [`LiteralError`] describing the rejected triple.
    fn validate(&self, literal: &Literal) -> Result<(), LiteralError> {
        validate_default(literal)
    }

    /// Target field name.
    fn lvalue(&self, literal: &Literal, renderer: &Renderer<'_>) -> String {
        renderer.resolve_field(literal.field())
    }

    /// Target value.
    fn rvalue(&self, literal: &Literal, renderer: &Renderer<'_>) -> Notation {
        renderer.default_value(literal)
    }
}

/// The behavior every field gets unless an override is registered.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBehavior;

impl LiteralBehavior for DefaultBehavior {}

static DEFAULT_BEHAVIOR: LazyLock<Arc<dyn LiteralBehavior>> =
    LazyLock::new(|| Arc::new(DefaultBehavior));

pub(crate) fn default_behavior() -> Arc<dyn LiteralBehavior> {
    Arc::clone(&DEFAULT_BEHAVIOR)
}

/// Stock validation: the triple must be in the production table, boolean
/// fields take only `true`/`false`, IP values must be real IPv4 addresses
/// and lists must not be empty.
///
/// # Errors
///
/// Returns the first rule the literal breaks.
pub fn validate_default(literal: &Literal) -> Result<(), LiteralError> {
    let field = literal.field();
    let family = field.family();
    let op = literal.op();
    let value = literal.value();

    let Some(expected) = family.expected_kind(op) else {
        return Err(LiteralError::UnsupportedOperator {
            field: field.name().to_owned(),
            family,
            op,
        });
    };

    if let (FieldFamily::Boolean, Value::Str(s)) = (family, value) {
        return Err(LiteralError::NonCanonicalBool {
            field: field.name().to_owned(),
            value: s.clone(),
        });
    }

    if value.kind() != expected {
        return Err(LiteralError::KindMismatch {
            field: field.name().to_owned(),
            op,
            expected,
            found: value.kind(),
        });
    }

    match value {
        Value::Ip(addr) => check_ip(field, addr, false),
        Value::IpList(items) => {
            non_empty(field, items)?;
            items.iter().try_for_each(|item| check_ip(field, item, true))
        }
        Value::StrList(items) => non_empty(field, items),
        Value::NumList(items) => non_empty(field, items),
        Value::Str(_) | Value::Num(_) | Value::Bool(_) => Ok(()),
    }
}

fn non_empty<T>(field: &Field, items: &[T]) -> Result<(), LiteralError> {
    if items.is_empty() {
        return Err(LiteralError::EmptyList {
            field: field.name().to_owned(),
        });
    }
    Ok(())
}

fn check_ip(field: &Field, text: &str, allow_prefix: bool) -> Result<(), LiteralError> {
    let invalid_ip = || LiteralError::InvalidIp {
        field: field.name().to_owned(),
        value: text.to_owned(),
    };

    let (addr, prefix) = match text.split_once('/') {
        Some((addr, prefix)) if allow_prefix => (addr, Some(prefix)),
        Some(_) => return Err(invalid_ip()),
        None => (text, None),
    };

    addr.parse::<Ipv4Addr>().map_err(|_| invalid_ip())?;

    if let Some(prefix) = prefix {
        match prefix.parse::<u8>() {
            Ok(1..=32) => {}
            _ => {
                return Err(LiteralError::InvalidPrefix {
                    field: field.name().to_owned(),
                    value: text.to_owned(),
                })
            }
        }
    }
    Ok(())
}
