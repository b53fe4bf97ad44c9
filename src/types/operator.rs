use std::fmt;

use serde::{Deserialize, Serialize};

use super::field::FieldFamily;

/// Operators of the filter language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DslOp {
    Eq,
    Neq,
    Has,
    NotHas,
    Contains,
    NotContains,
    In,
    NotIn,
    Gte,
    Lte,
}

impl DslOp {
    /// The negated counterpart of `has`, `contains` and `in`.
    #[must_use]
    pub fn negated(self) -> Option<DslOp> {
        match self {
            DslOp::Has => Some(DslOp::NotHas),
            DslOp::Contains => Some(DslOp::NotContains),
            DslOp::In => Some(DslOp::NotIn),
            _ => None,
        }
    }

    /// For negated operators, the positive operator they negate.
    #[must_use]
    pub fn positive(self) -> Option<DslOp> {
        match self {
            DslOp::NotHas => Some(DslOp::Has),
            DslOp::NotContains => Some(DslOp::Contains),
            DslOp::NotIn => Some(DslOp::In),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_membership(self) -> bool {
        matches!(self, DslOp::In | DslOp::NotIn)
    }
}

impl fmt::Display for DslOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DslOp::Eq => write!(f, "=="),
            DslOp::Neq => write!(f, "!="),
            DslOp::Has => write!(f, "has"),
            DslOp::NotHas => write!(f, "not has"),
            DslOp::Contains => write!(f, "contains"),
            DslOp::NotContains => write!(f, "not contains"),
            DslOp::In => write!(f, "in"),
            DslOp::NotIn => write!(f, "not in"),
            DslOp::Gte => write!(f, ">="),
            DslOp::Lte => write!(f, "<="),
        }
    }
}

/// Target notation tokens for each filter operator.
///
/// Negated operators render as `[negation, positive]`. Membership on
/// IP-family fields uses `network_match` instead of `in`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperatorTable {
    pub eq: String,
    pub neq: String,
    pub has: String,
    pub contains: String,
    #[serde(rename = "in")]
    pub member: String,
    pub network_match: String,
    pub gte: String,
    pub lte: String,
    pub negation: String,
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self {
            eq: "==".to_owned(),
            neq: "~=".to_owned(),
            has: "has".to_owned(),
            contains: "~~".to_owned(),
            member: "in".to_owned(),
            network_match: "ipmatch".to_owned(),
            gte: ">=".to_owned(),
            lte: "<=".to_owned(),
            negation: "!".to_owned(),
        }
    }
}

impl OperatorTable {
    /// Target tokens for `op` applied to a field of `family`.
    #[must_use]
    pub fn tokens(&self, op: DslOp, family: FieldFamily) -> Vec<String> {
        match op.positive() {
            Some(positive) => vec![
                self.negation.clone(),
                self.positive_token(positive, family).to_owned(),
            ],
            None => vec![self.positive_token(op, family).to_owned()],
        }
    }

    fn positive_token(&self, op: DslOp, family: FieldFamily) -> &str {
        match op {
            DslOp::Eq => &self.eq,
            DslOp::Neq => &self.neq,
            DslOp::Has | DslOp::NotHas => &self.has,
            DslOp::Contains | DslOp::NotContains => &self.contains,
            DslOp::In | DslOp::NotIn if family == FieldFamily::Ip => &self.network_match,
            DslOp::In | DslOp::NotIn => &self.member,
            DslOp::Gte => &self.gte,
            DslOp::Lte => &self.lte,
        }
    }
}
