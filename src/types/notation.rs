use std::fmt;

use serde::Serialize;

/// Nested-array target notation, e.g.
/// `["AND", ["request_method", "==", "GET"], ["remote_addr", "ipmatch", ["10.0.0.0/8"]]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Notation {
    Atom(String),
    List(Vec<Notation>),
}

impl Notation {
    /// The empty sequence an empty filter renders to.
    #[must_use]
    pub fn empty() -> Self {
        Notation::List(Vec::new())
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Notation::Atom(s) => serde_json::Value::String(s.clone()),
            Notation::List(items) => {
                serde_json::Value::Array(items.iter().map(Notation::to_json).collect())
            }
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Notation]> {
        match self {
            Notation::List(items) => Some(items),
            Notation::Atom(_) => None,
        }
    }
}

impl From<&str> for Notation {
    fn from(s: &str) -> Self {
        Notation::Atom(s.to_owned())
    }
}

impl From<String> for Notation {
    fn from(s: String) -> Self {
        Notation::Atom(s)
    }
}

impl From<Vec<Notation>> for Notation {
    fn from(items: Vec<Notation>) -> Self {
        Notation::List(items)
    }
}

/// Compact JSON text.
impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
