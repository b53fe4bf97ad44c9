//! Target-notation emission.

use crate::types::{
    Conjunction, Disjunction, Expr, Field, FieldMap, Literal, Notation, Schema, Value,
};

const AND: &str = "AND";
const OR: &str = "OR";

/// Walks a tree and emits target notation. Pure; a renderer can be shared
/// freely between threads.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    schema: &'a Schema,
    overrides: &'a FieldMap,
}

impl<'a> Renderer<'a> {
    #[must_use]
    pub fn new(schema: &'a Schema, overrides: &'a FieldMap) -> Self {
        Self { schema, overrides }
    }

    #[must_use]
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// `[]` for an empty disjunction, the bare conjunction for one, and
    /// `["OR", ...]` otherwise.
    #[must_use]
    pub fn render(&self, disjunction: &Disjunction) -> Notation {
        match disjunction.conjunctions() {
            [] => Notation::empty(),
            [only] => self.render_conjunction(only),
            many => {
                let mut items = Vec::with_capacity(many.len() + 1);
                items.push(Notation::from(OR));
                items.extend(many.iter().map(|c| self.render_conjunction(c)));
                Notation::List(items)
            }
        }
    }

    #[must_use]
    pub fn render_expr(&self, expr: &Expr) -> Notation {
        match expr {
            Expr::Literal(l) => self.render_literal(l),
            Expr::Conjunction(c) => self.render_conjunction(c),
            Expr::Disjunction(d) => self.render(d),
        }
    }

    #[must_use]
    pub fn render_conjunction(&self, conjunction: &Conjunction) -> Notation {
        match conjunction.literals() {
            [only] => self.render_literal(only),
            many => {
                let mut items = Vec::with_capacity(many.len() + 1);
                items.push(Notation::from(AND));
                items.extend(many.iter().map(|l| self.render_literal(l)));
                Notation::List(items)
            }
        }
    }

    /// `[target_field, ...operator_tokens, target_value]`.
    #[must_use]
    pub fn render_literal(&self, literal: &Literal) -> Notation {
        let behavior = literal.behavior();
        let mut items = vec![Notation::Atom(behavior.lvalue(literal, self))];
        items.extend(self.operator_tokens(literal).into_iter().map(Notation::Atom));
        items.push(behavior.rvalue(literal, self));
        Notation::List(items)
    }

    /// Per-call override, then the schema's target, then the keyed
    /// container rule, then the source name unchanged.
    #[must_use]
    pub fn resolve_field(&self, field: &Field) -> String {
        if let Some(target) = self.overrides.get(field.name()) {
            return target.clone();
        }
        if let Some(target) = self
            .schema
            .lookup(field.name())
            .and_then(|spec| spec.target.as_ref())
        {
            return target.clone();
        }
        if let Some(key) = field.key() {
            if let Some(spec) = self.schema.keyed_container(&key.container) {
                return format!("{}_{}", spec.namespace, key.key.replace('-', "_"));
            }
        }
        field.name().to_owned()
    }

    #[must_use]
    pub fn operator_tokens(&self, literal: &Literal) -> Vec<String> {
        self.schema
            .operator_table()
            .tokens(literal.op(), literal.field().family())
    }

    /// Scalars as strings, lists as arrays of strings, booleans as the
    /// field's configured target strings.
    #[must_use]
    pub fn default_value(&self, literal: &Literal) -> Notation {
        match literal.value() {
            Value::Str(s) | Value::Ip(s) | Value::Num(s) => Notation::Atom(s.clone()),
            Value::Bool(b) => Notation::Atom(self.bool_target(literal.field(), *b)),
            Value::StrList(items) | Value::IpList(items) | Value::NumList(items) => Notation::List(
                items
                    .iter()
                    .map(|s| Notation::Atom(s.trim().to_owned()))
                    .collect(),
            ),
        }
    }

    fn bool_target(&self, field: &Field, value: bool) -> String {
        match self
            .schema
            .lookup(field.name())
            .and_then(|spec| spec.values.as_ref())
        {
            Some(targets) if value => targets.when_true.clone(),
            Some(targets) => targets.when_false.clone(),
            None => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{DslOp, FieldFamily, FieldSpec};

    fn schema() -> Schema {
        Schema::empty()
            .field("a.field", FieldSpec::new(FieldFamily::String).target("a_mapped"))
            .field("b.field", FieldSpec::new(FieldFamily::String))
            .field(
                "flag",
                FieldSpec::new(FieldFamily::Boolean).bool_targets("on", "off"),
            )
            .field("plain", FieldSpec::new(FieldFamily::Boolean))
            .field("addr", FieldSpec::new(FieldFamily::Ip))
            .keyed("hdr", FieldFamily::String, "ns")
    }

    fn literal(field: Field, op: DslOp, value: Value) -> Literal {
        Literal::new(field, op, value).unwrap()
    }

    #[test]
    fn field_resolution_order() {
        let schema = schema();
        let mut overrides = FieldMap::new();
        overrides.insert("a.field".into(), "override".into());

        let plain = FieldMap::new();
        let r = Renderer::new(&schema, &plain);
        let a = Field::new("a.field", FieldFamily::String);
        let b = Field::new("b.field", FieldFamily::String);
        assert_eq!(r.resolve_field(&a), "a_mapped");
        assert_eq!(r.resolve_field(&b), "b.field");

        let r = Renderer::new(&schema, &overrides);
        assert_eq!(r.resolve_field(&a), "override");
    }

    #[test]
    fn keyed_field_target() {
        let schema = schema();
        let overrides = FieldMap::new();
        let r = Renderer::new(&schema, &overrides);
        let field = Field::keyed("hdr", "content-type", FieldFamily::String);
        assert_eq!(r.resolve_field(&field), "ns_content_type");
    }

    #[test]
    fn keyed_field_override_wins() {
        let schema = schema();
        let mut overrides = FieldMap::new();
        overrides.insert("hdr['content-type']".into(), "ctype".into());
        let r = Renderer::new(&schema, &overrides);
        let field = Field::keyed("hdr", "content-type", FieldFamily::String);
        assert_eq!(r.resolve_field(&field), "ctype");
    }

    #[test]
    fn boolean_targets() {
        let schema = schema();
        let overrides = FieldMap::new();
        let r = Renderer::new(&schema, &overrides);
        let flag = Field::new("flag", FieldFamily::Boolean);
        let on = literal(flag.clone(), DslOp::Eq, Value::Bool(true));
        let off = literal(flag, DslOp::Eq, Value::Bool(false));
        let plain = Field::new("plain", FieldFamily::Boolean);
        let plain = literal(plain, DslOp::Eq, Value::Bool(true));
        assert_eq!(r.render_literal(&on).to_json(), json!(["flag", "==", "on"]));
        assert_eq!(r.render_literal(&off).to_json(), json!(["flag", "==", "off"]));
        assert_eq!(r.render_literal(&plain).to_json(), json!(["plain", "==", "true"]));
    }

    #[test]
    fn collapse_single_shapes() {
        let schema = schema();
        let overrides = FieldMap::new();
        let r = Renderer::new(&schema, &overrides);
        let l = literal(Field::new("b.field", FieldFamily::String), DslOp::Neq, Value::from("y"));
        let expected = json!(["b.field", "~=", "y"]);

        assert_eq!(r.render_literal(&l).to_json(), expected);
        let c = Conjunction::new(vec![l.clone()]);
        assert_eq!(r.render_conjunction(&c).to_json(), expected);
        let d = Disjunction::new(vec![c]);
        assert_eq!(r.render(&d).to_json(), expected);
        assert_eq!(r.render_expr(&Expr::Literal(l)).to_json(), expected);
    }

    #[test]
    fn empty_disjunction_is_empty_sequence() {
        let schema = schema();
        let overrides = FieldMap::new();
        let r = Renderer::new(&schema, &overrides);
        assert_eq!(r.render(&Disjunction::default()).to_json(), json!([]));
    }

    #[test]
    fn or_of_ands() {
        let schema = schema();
        let overrides = FieldMap::new();
        let r = Renderer::new(&schema, &overrides);
        let a = literal(Field::new("a.field", FieldFamily::String), DslOp::Eq, Value::from("x"));
        let b = literal(Field::new("b.field", FieldFamily::String), DslOp::Eq, Value::from("y"));
        let d = Disjunction::new(vec![
            Conjunction::new(vec![a.clone(), b.clone()]),
            Conjunction::new(vec![b]),
        ]);
        assert_eq!(
            r.render(&d).to_json(),
            json!([
                "OR",
                ["AND", ["a_mapped", "==", "x"], ["b.field", "==", "y"]],
                ["b.field", "==", "y"]
            ])
        );
    }

    #[test]
    fn ip_list_uses_network_match() {
        let schema = schema();
        let overrides = FieldMap::new();
        let r = Renderer::new(&schema, &overrides);
        let l = literal(
            Field::new("addr", FieldFamily::Ip),
            DslOp::NotIn,
            Value::IpList(vec!["10.0.0.0/8".into(), "192.168.1.1".into()]),
        );
        assert_eq!(
            r.render_literal(&l).to_json(),
            json!(["addr", "!", "ipmatch", ["10.0.0.0/8", "192.168.1.1"]])
        );
    }
}
