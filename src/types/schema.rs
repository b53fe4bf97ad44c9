use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::field::FieldFamily;
use super::operator::OperatorTable;
use crate::error::RulecastError;

/// Target strings a boolean field renders to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoolTargets {
    #[serde(rename = "true")]
    pub when_true: String,
    #[serde(rename = "false")]
    pub when_false: String,
}

/// A field the lexer recognizes, and how it renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub family: FieldFamily,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<BoolTargets>,
}

impl FieldSpec {
    #[must_use]
    pub fn new(family: FieldFamily) -> Self {
        Self {
            family,
            target: None,
            values: None,
        }
    }

    #[must_use]
    pub fn target(mut self, target: &str) -> Self {
        self.target = Some(target.to_owned());
        self
    }

    #[must_use]
    pub fn bool_targets(mut self, when_true: &str, when_false: &str) -> Self {
        self.values = Some(BoolTargets {
            when_true: when_true.to_owned(),
            when_false: when_false.to_owned(),
        });
        self
    }
}

/// A container accepting `container['key']` fields. The target name is
/// `{namespace}_{key}` with hyphens turned into underscores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyedSpec {
    pub family: FieldFamily,
    pub namespace: String,
}

/// Deployment data: which fields exist, their families, target names and
/// the operator table.
///
/// `Schema::default()` is the built-in HTTP/IP deployment. Other
/// deployments are built with [`Schema::empty`] and the builder methods, or
/// loaded from JSON:
///
/// ```
/// use rulecast::{FieldFamily, Schema};
///
/// let schema = Schema::from_json(r#"{
///     "fields": {
///         "user.name": { "family": "string", "target": "username" },
///         "user.admin": { "family": "boolean", "values": { "true": "yes", "false": "no" } }
///     }
/// }"#).unwrap();
/// assert_eq!(schema.lookup("user.name").unwrap().family, FieldFamily::String);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    #[serde(default)]
    fields: BTreeMap<String, FieldSpec>,
    #[serde(default)]
    keyed: BTreeMap<String, KeyedSpec>,
    #[serde(default)]
    operators: OperatorTable,
}

impl Default for Schema {
    fn default() -> Self {
        use FieldFamily as F;

        Self::empty()
            .field(
                "ip.geoip.country",
                FieldSpec::new(F::String).target("geoip2_data_country_iso_code"),
            )
            .field(
                "ip.geoip.continent",
                FieldSpec::new(F::String).target("geoip2_data_continent_code"),
            )
            .field("http.method", FieldSpec::new(F::String).target("request_method"))
            .field("http.version", FieldSpec::new(F::String).target("server_protocol"))
            .field("http.headers.user_agent", FieldSpec::new(F::String).target("http_user_agent"))
            .field(
                "http.headers.x_forwarded_for",
                FieldSpec::new(F::String).target("http_x_forwarded_for"),
            )
            .field("http.headers.referer", FieldSpec::new(F::String).target("http_referer"))
            .field("device", FieldSpec::new(F::String))
            .field("http.headers", FieldSpec::new(F::List).target("headers"))
            .field("ip.addr", FieldSpec::new(F::Ip).target("remote_addr"))
            .field("ip.geoip.asn", FieldSpec::new(F::Numeric).target("geoip2_data_asn"))
            .field("ip.reputation", FieldSpec::new(F::Numeric))
            .field(
                "http.secure",
                FieldSpec::new(F::Boolean).target("scheme").bool_targets("https", "http"),
            )
            .keyed("http.headers", F::String, "http")
    }
}

impl Schema {
    /// A schema with no fields and the default operator table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            fields: BTreeMap::new(),
            keyed: BTreeMap::new(),
            operators: OperatorTable::default(),
        }
    }

    /// Register (or replace) a field.
    #[must_use]
    pub fn field(mut self, name: &str, spec: FieldSpec) -> Self {
        self.fields.insert(name.to_owned(), spec);
        self
    }

    /// Register a keyed container such as `http.headers['...']`.
    #[must_use]
    pub fn keyed(mut self, container: &str, family: FieldFamily, namespace: &str) -> Self {
        self.keyed.insert(
            container.to_owned(),
            KeyedSpec {
                family,
                namespace: namespace.to_owned(),
            },
        );
        self
    }

    #[must_use]
    pub fn operators(mut self, operators: OperatorTable) -> Self {
        self.operators = operators;
        self
    }

    /// Parse and check a JSON schema.
    ///
    /// # Errors
    ///
    /// Returns [`RulecastError::Schema`] for malformed JSON and
    /// [`RulecastError::InvalidSchema`] for entries the lexer could never
    /// match or that cannot render.
    pub fn from_json(input: &str) -> Result<Self, RulecastError> {
        let schema: Schema = serde_json::from_str(input)?;
        schema.check()?;
        Ok(schema)
    }

    /// Read a JSON schema file.
    ///
    /// # Errors
    ///
    /// Returns [`RulecastError`] on I/O or schema failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, RulecastError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input)
    }

    /// Serialize to pretty JSON, the same format [`from_json`](Self::from_json) reads.
    ///
    /// # Errors
    ///
    /// Returns [`RulecastError::Schema`] if serialization fails.
    pub fn to_json(&self) -> Result<String, RulecastError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn keyed_container(&self, container: &str) -> Option<&KeyedSpec> {
        self.keyed.get(container)
    }

    #[must_use]
    pub fn operator_table(&self) -> &OperatorTable {
        &self.operators
    }

    /// Iterate over all registered fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn check(&self) -> Result<(), RulecastError> {
        for (name, spec) in &self.fields {
            if !is_field_word(name) {
                return Err(RulecastError::InvalidSchema(format!(
                    "'{name}' is not a valid field name"
                )));
            }
            if KEYWORDS.contains(&name.as_str()) {
                return Err(RulecastError::InvalidSchema(format!(
                    "'{name}' is a keyword and cannot name a field"
                )));
            }
            if spec.values.is_some() && spec.family != FieldFamily::Boolean {
                return Err(RulecastError::InvalidSchema(format!(
                    "'{name}' declares boolean values but is a {} field",
                    spec.family
                )));
            }
        }
        for (container, spec) in &self.keyed {
            if !is_field_word(container) {
                return Err(RulecastError::InvalidSchema(format!(
                    "'{container}' is not a valid container name"
                )));
            }
            if KEYWORDS.contains(&container.as_str()) {
                return Err(RulecastError::InvalidSchema(format!(
                    "'{container}' is a keyword and cannot name a container"
                )));
            }
            if spec.namespace.is_empty() {
                return Err(RulecastError::InvalidSchema(format!(
                    "keyed container '{container}' needs a namespace"
                )));
            }
        }
        Ok(())
    }
}

/// Words the lexer reads as connectives, operators or booleans.
const KEYWORDS: [&str; 10] = [
    "and", "AND", "or", "OR", "in", "has", "contains", "true", "false", "not",
];

/// Same shape the lexer accepts for field names.
fn is_field_word(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
