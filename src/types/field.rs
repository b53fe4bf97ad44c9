use std::fmt;

use serde::{Deserialize, Serialize};

use super::operator::DslOp;
use super::value::ValueKind;

/// Type family of a source field. Decides which operators and value kinds
/// may follow the field in a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldFamily {
    String,
    List,
    Ip,
    Numeric,
    Boolean,
}

/// The `(family, operator, value kind)` triples a literal may take.
const PRODUCTIONS: &[(FieldFamily, DslOp, ValueKind)] = &[
    (FieldFamily::String, DslOp::Eq, ValueKind::Str),
    (FieldFamily::String, DslOp::Neq, ValueKind::Str),
    (FieldFamily::String, DslOp::Contains, ValueKind::Str),
    (FieldFamily::String, DslOp::NotContains, ValueKind::Str),
    (FieldFamily::String, DslOp::In, ValueKind::StrList),
    (FieldFamily::String, DslOp::NotIn, ValueKind::StrList),
    (FieldFamily::List, DslOp::Has, ValueKind::Str),
    (FieldFamily::List, DslOp::NotHas, ValueKind::Str),
    (FieldFamily::Ip, DslOp::Eq, ValueKind::Ip),
    (FieldFamily::Ip, DslOp::Neq, ValueKind::Ip),
    (FieldFamily::Ip, DslOp::In, ValueKind::IpList),
    (FieldFamily::Ip, DslOp::NotIn, ValueKind::IpList),
    (FieldFamily::Numeric, DslOp::Eq, ValueKind::Num),
    (FieldFamily::Numeric, DslOp::Neq, ValueKind::Num),
    (FieldFamily::Numeric, DslOp::Gte, ValueKind::Num),
    (FieldFamily::Numeric, DslOp::Lte, ValueKind::Num),
    (FieldFamily::Numeric, DslOp::In, ValueKind::NumList),
    (FieldFamily::Numeric, DslOp::NotIn, ValueKind::NumList),
    (FieldFamily::Boolean, DslOp::Eq, ValueKind::Bool),
];

impl FieldFamily {
    /// Whether `field op value` is a legal literal for this family.
    #[must_use]
    pub fn accepts(self, op: DslOp, kind: ValueKind) -> bool {
        PRODUCTIONS
            .iter()
            .any(|&(family, o, k)| family == self && o == op && k == kind)
    }

    /// Whether the operator is usable with this family at all.
    #[must_use]
    pub fn supports(self, op: DslOp) -> bool {
        PRODUCTIONS
            .iter()
            .any(|&(family, o, _)| family == self && o == op)
    }

    /// The value kind expected after `op`, if the operator is supported.
    #[must_use]
    pub fn expected_kind(self, op: DslOp) -> Option<ValueKind> {
        PRODUCTIONS
            .iter()
            .find(|&&(family, o, _)| family == self && o == op)
            .map(|&(_, _, kind)| kind)
    }
}

impl fmt::Display for FieldFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldFamily::String => write!(f, "string"),
            FieldFamily::List => write!(f, "list"),
            FieldFamily::Ip => write!(f, "ip"),
            FieldFamily::Numeric => write!(f, "numeric"),
            FieldFamily::Boolean => write!(f, "boolean"),
        }
    }
}

/// Captured `container['key']` parts of a keyed field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub container: String,
    pub key: String,
}

/// A source field as it appeared in the filter text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    family: FieldFamily,
    key: Option<FieldKey>,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, family: FieldFamily) -> Self {
        Self {
            name: name.into(),
            family,
            key: None,
        }
    }

    /// A keyed field such as `http.headers['content-type']`.
    #[must_use]
    pub fn keyed(container: &str, key: &str, family: FieldFamily) -> Self {
        Self {
            name: format!("{container}['{key}']"),
            family,
            key: Some(FieldKey {
                container: container.to_owned(),
                key: key.to_owned(),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn family(&self) -> FieldFamily {
        self.family
    }

    #[must_use]
    pub fn key(&self) -> Option<&FieldKey> {
        self.key.as_ref()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
