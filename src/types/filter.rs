use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use super::behavior::LiteralBehavior;
use super::expr::Disjunction;
use super::notation::Notation;
use super::schema::Schema;
use crate::error::RulecastError;
use crate::parse::ParseError;
use crate::render::Renderer;

/// Source field name → target field name.
pub type FieldMap = HashMap<String, String>;

static DEFAULT_SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| Arc::new(Schema::default()));

/// Per-parse options: field-name overrides and literal-behavior overrides.
///
/// # Example
///
/// ```
/// use rulecast::{FilterCompiler, ParseOptions};
///
/// let options = ParseOptions::new().map_field("http.method", "verb");
/// let filter = FilterCompiler::default()
///     .parse_with("http.method == 'GET'", &options)
///     .unwrap();
/// assert_eq!(filter.to_notation().to_string(), r#"["verb","==","GET"]"#);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ParseOptions {
    pub(crate) field_overrides: FieldMap,
    pub(crate) literal_overrides: HashMap<String, Arc<dyn LiteralBehavior>>,
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `source` as `target`, ahead of the schema's own mapping.
    #[must_use]
    pub fn map_field(mut self, source: &str, target: &str) -> Self {
        self.field_overrides
            .insert(source.to_owned(), target.to_owned());
        self
    }

    /// Add every entry of `overrides`; later entries win.
    #[must_use]
    pub fn field_overrides(mut self, overrides: FieldMap) -> Self {
        self.field_overrides.extend(overrides);
        self
    }

    /// Validate and render literals of `field` with `behavior`.
    #[must_use]
    pub fn literal_behavior(
        mut self,
        field: &str,
        behavior: impl LiteralBehavior + 'static,
    ) -> Self {
        self.literal_overrides
            .insert(field.to_owned(), Arc::new(behavior));
        self
    }

    pub(crate) fn behavior_for(&self, field: &str) -> Option<Arc<dyn LiteralBehavior>> {
        self.literal_overrides.get(field).cloned()
    }
}

/// Parses filter text against a [`Schema`]. Cheap to clone and safe to share
/// across threads; every parse keeps its own state.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    schema: Arc<Schema>,
}

impl Default for FilterCompiler {
    /// Compiler for the built-in HTTP/IP schema.
    fn default() -> Self {
        Self {
            schema: Arc::clone(&DEFAULT_SCHEMA),
        }
    }
}

impl FilterCompiler {
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }

    /// Compiler for a JSON schema.
    ///
    /// # Errors
    ///
    /// Returns [`RulecastError`] if the schema is invalid.
    pub fn from_json(input: &str) -> Result<Self, RulecastError> {
        Ok(Self::new(Schema::from_json(input)?))
    }

    /// Compiler for a JSON schema file.
    ///
    /// # Errors
    ///
    /// Returns [`RulecastError`] on I/O or schema failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, RulecastError> {
        Ok(Self::new(Schema::from_file(path)?))
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Parse with no overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on lexical, grammar or validation failure.
    pub fn parse(&self, input: &str) -> Result<Filter, ParseError> {
        self.parse_with(input, &ParseOptions::default())
    }

    /// Parse with field and literal-behavior overrides.
    ///
    /// Each parenthesized group adds a level of recursion; input nested
    /// thousands of levels deep can overflow the stack.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on lexical, grammar or validation failure.
    pub fn parse_with(&self, input: &str, options: &ParseOptions) -> Result<Filter, ParseError> {
        let parsed = crate::parse::parse(input, &self.schema, options)?;
        Ok(Filter {
            root: parsed.root,
            original_was_dnf: parsed.original_was_dnf,
            schema: Arc::clone(&self.schema),
            field_overrides: options.field_overrides.clone(),
        })
    }
}

/// A parsed filter in disjunctive normal form.
///
/// Immutable apart from its field overrides, which can be swapped to render
/// the same tree under a different mapping.
#[derive(Debug, Clone)]
pub struct Filter {
    root: Disjunction,
    original_was_dnf: bool,
    schema: Arc<Schema>,
    field_overrides: FieldMap,
}

impl Filter {
    #[must_use]
    pub fn root(&self) -> &Disjunction {
        &self.root
    }

    #[must_use]
    pub fn into_root(self) -> Disjunction {
        self.root
    }

    /// `false` when the source ANDed a literal or conjunction directly with
    /// an OR result, so distribution had to rewrite it.
    #[must_use]
    pub fn original_was_dnf(&self) -> bool {
        self.original_was_dnf
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn field_overrides(&self) -> &FieldMap {
        &self.field_overrides
    }

    /// Replace the field overrides used by [`to_notation`](Self::to_notation).
    #[must_use]
    pub fn with_field_overrides(mut self, overrides: FieldMap) -> Self {
        self.field_overrides = overrides;
        self
    }

    pub fn set_field_overrides(&mut self, overrides: FieldMap) {
        self.field_overrides = overrides;
    }

    /// Render with the attached field overrides.
    #[must_use]
    pub fn to_notation(&self) -> Notation {
        self.render_with(&self.field_overrides)
    }

    /// Render with `overrides` in place of the attached ones.
    #[must_use]
    pub fn render_with(&self, overrides: &FieldMap) -> Notation {
        Renderer::new(&self.schema, overrides).render(&self.root)
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        self.to_notation().to_json()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
