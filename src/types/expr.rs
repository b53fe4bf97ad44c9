use std::fmt;
use std::sync::Arc;

use super::behavior::{default_behavior, LiteralBehavior};
use super::error::LiteralError;
use super::field::Field;
use super::operator::DslOp;
use super::value::Value;

/// Atomic predicate `(field, operator, value)`.
///
/// A `Literal` can only be obtained through validation by its
/// [`LiteralBehavior`], so every literal in a tree is well-formed.
#[derive(Clone)]
pub struct Literal {
    field: Field,
    op: DslOp,
    value: Value,
    behavior: Arc<dyn LiteralBehavior>,
}

/// AND of literals, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conjunction {
    literals: Vec<Literal>,
}

/// OR of conjunctions, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Disjunction {
    conjunctions: Vec<Conjunction>,
}

/// Any value the boolean algebra produces. There is no deeper nesting than
/// `Disjunction -> Conjunction -> Literal`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Conjunction(Conjunction),
    Disjunction(Disjunction),
}

impl Literal {
    /// Build and validate a literal with the default behavior.
    ///
    /// # Errors
    ///
    /// Returns [`LiteralError`] if the operator or value does not fit the
    /// field's family.
    pub fn new(field: Field, op: DslOp, value: Value) -> Result<Self, LiteralError> {
        Self::with_behavior(field, op, value, default_behavior())
    }

    /// Build and validate a literal with a caller-supplied behavior.
    ///
    /// # Errors
    ///
    /// Returns whatever the behavior's `validate` rejects.
    pub fn with_behavior(
        field: Field,
        op: DslOp,
        value: Value,
        behavior: Arc<dyn LiteralBehavior>,
    ) -> Result<Self, LiteralError> {
        let literal = Self {
            field,
            op,
            value,
            behavior,
        };
        literal.behavior.validate(&literal)?;
        Ok(literal)
    }

    #[must_use]
    pub fn field(&self) -> &Field {
        &self.field
    }

    #[must_use]
    pub fn op(&self) -> DslOp {
        self.op
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub fn behavior(&self) -> &dyn LiteralBehavior {
        self.behavior.as_ref()
    }
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.op == other.op && self.value == other.value
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Literal")
            .field("field", &self.field.name())
            .field("op", &self.op)
            .field("value", &self.value)
            .field("behavior", &self.behavior)
            .finish()
    }
}

impl Conjunction {
    #[must_use]
    pub fn new(literals: Vec<Literal>) -> Self {
        Self { literals }
    }

    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub(crate) fn prepend(mut self, literal: Literal) -> Self {
        self.literals.insert(0, literal);
        self
    }

    pub(crate) fn append(mut self, literal: Literal) -> Self {
        self.literals.push(literal);
        self
    }

    pub(crate) fn concat(mut self, other: &Conjunction) -> Self {
        self.literals.extend(other.literals.iter().cloned());
        self
    }
}

impl Disjunction {
    #[must_use]
    pub fn new(conjunctions: Vec<Conjunction>) -> Self {
        Self { conjunctions }
    }

    #[must_use]
    pub fn conjunctions(&self) -> &[Conjunction] {
        &self.conjunctions
    }

    #[must_use]
    pub fn into_conjunctions(self) -> Vec<Conjunction> {
        self.conjunctions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.conjunctions.len()
    }

    /// An empty disjunction is what empty filter text parses to.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conjunctions.is_empty()
    }

    /// All literals, conjunction by conjunction.
    pub fn literals(&self) -> impl Iterator<Item = &Literal> {
        self.conjunctions.iter().flat_map(|c| c.literals.iter())
    }
}

impl Expr {
    /// Lift to the outermost shape: a literal becomes a one-literal
    /// conjunction inside a one-conjunction disjunction.
    #[must_use]
    pub fn into_disjunction(self) -> Disjunction {
        match self {
            Expr::Literal(l) => Disjunction::new(vec![Conjunction::new(vec![l])]),
            Expr::Conjunction(c) => Disjunction::new(vec![c]),
            Expr::Disjunction(d) => d,
        }
    }

    #[must_use]
    pub fn is_disjunction(&self) -> bool {
        matches!(self, Expr::Disjunction(_))
    }
}

impl From<Literal> for Expr {
    fn from(l: Literal) -> Self {
        Expr::Literal(l)
    }
}

impl From<Conjunction> for Expr {
    fn from(c: Conjunction) -> Self {
        Expr::Conjunction(c)
    }
}

impl From<Disjunction> for Expr {
    fn from(d: Disjunction) -> Self {
        Expr::Disjunction(d)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.field, self.op, self.value)
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, literal) in self.literals.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{literal}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Disjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, conjunction) in self.conjunctions.iter().enumerate() {
            if i > 0 {
                f.write_str(" OR ")?;
            }
            write!(f, "{conjunction}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(l) => write!(f, "{l}"),
            Expr::Conjunction(c) => write!(f, "{c}"),
            Expr::Disjunction(d) => write!(f, "{d}"),
        }
    }
}
