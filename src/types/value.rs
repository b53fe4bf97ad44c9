use std::fmt;

/// Values that can appear on the right-hand side of a literal.
///
/// Quotes are already stripped and list items trimmed when a value comes
/// out of the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A quoted string, without its quotes.
    Str(String),
    /// A dotted IPv4 address, or `address/prefix` inside IP lists.
    Ip(String),
    /// An unsigned number of at most 11 digits, kept as written so leading
    /// zeros survive rendering.
    Num(String),
    /// `true` or `false`.
    Bool(bool),
    StrList(Vec<String>),
    IpList(Vec<String>),
    NumList(Vec<String>),
}

/// Family tag of a [`Value`], used by the literal production table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Str,
    Ip,
    Num,
    Bool,
    StrList,
    IpList,
    NumList,
}

impl Value {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Str(_) => ValueKind::Str,
            Value::Ip(_) => ValueKind::Ip,
            Value::Num(_) => ValueKind::Num,
            Value::Bool(_) => ValueKind::Bool,
            Value::StrList(_) => ValueKind::StrList,
            Value::IpList(_) => ValueKind::IpList,
            Value::NumList(_) => ValueKind::NumList,
        }
    }

    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Value::StrList(_) | Value::IpList(_) | Value::NumList(_)
        )
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Num(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Str => write!(f, "string"),
            ValueKind::Ip => write!(f, "ip address"),
            ValueKind::Num => write!(f, "number"),
            ValueKind::Bool => write!(f, "boolean"),
            ValueKind::StrList => write!(f, "string list"),
            ValueKind::IpList => write!(f, "ip/cidr list"),
            ValueKind::NumList => write!(f, "number list"),
        }
    }
}

fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    quote: bool,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        if quote {
            write!(f, "'{item}'")?;
        } else {
            write!(f, "{item}")?;
        }
    }
    f.write_str("]")
}

/// Renders the value back in filter syntax.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(v) => write!(f, "'{v}'"),
            Value::Ip(v) => write!(f, "{v}"),
            Value::Num(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::StrList(items) => write_list(f, items, true),
            Value::IpList(items) => write_list(f, items, false),
            Value::NumList(items) => write_list(f, items, false),
        }
    }
}
