use std::error::Error;

use rulecast::{
    FieldFamily, FieldSpec, FilterCompiler, Literal, LiteralError, ParseErrorKind, ParseOptions,
    Schema,
};

fn kind(input: &str) -> ParseErrorKind {
    rulecast::parse(input).unwrap_err().kind()
}

fn literal_error(input: &str) -> LiteralError {
    let err = rulecast::parse(input).unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Validation);
    err.source()
        .and_then(|s| s.downcast_ref::<LiteralError>())
        .cloned()
        .unwrap()
}

#[test]
fn unknown_field() {
    let err = rulecast::parse("http.path == '/'").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Lexical);
    assert_eq!(err.offset(), Some(0));
    assert!(err.to_string().starts_with("parse error at offset 0:"));
}

#[test]
fn unrecognized_character_aborts() {
    let err = rulecast::parse("device == 'a' && device == 'b'").unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Lexical);
    assert_eq!(err.offset(), Some(14));
}

#[test]
fn unbalanced_parentheses() {
    assert_eq!(kind("(device == 'a' or device == 'b'"), ParseErrorKind::Grammar);
    assert_eq!(kind("device == 'a')"), ParseErrorKind::Grammar);
    assert_eq!(kind("()"), ParseErrorKind::Grammar);
}

#[test]
fn string_field_rejects_has() {
    assert_eq!(
        kind("http.headers.user_agent has 'curl/8.1-beta'"),
        ParseErrorKind::Grammar
    );
}

#[test]
fn boolean_field_rejects_neq() {
    assert_eq!(kind("http.secure != true"), ParseErrorKind::Grammar);
}

#[test]
fn quoted_number_rejected() {
    assert_eq!(kind("ip.geoip.asn == '1234'"), ParseErrorKind::Grammar);
}

#[test]
fn unterminated_strings() {
    assert_eq!(kind("http.secure != 'off"), ParseErrorKind::Lexical);
    assert_eq!(kind("http.secure == 'invalid value"), ParseErrorKind::Lexical);
}

#[test]
fn non_canonical_boolean() {
    assert!(matches!(
        literal_error("http.secure == 'yes'"),
        LiteralError::NonCanonicalBool { .. }
    ));
}

#[test]
fn ip_octet_out_of_range() {
    assert!(matches!(
        literal_error("ip.addr == 256.1.1.1"),
        LiteralError::InvalidIp { .. }
    ));
    assert!(matches!(
        literal_error("ip.addr in [10.0.0.1, 10.0.0.300]"),
        LiteralError::InvalidIp { .. }
    ));
}

#[test]
fn network_prefix() {
    assert_eq!(kind("ip.addr == 10.0.0.0/8"), ParseErrorKind::Lexical);
    assert!(matches!(
        literal_error("ip.addr in [10.0.0.0/33]"),
        LiteralError::InvalidPrefix { .. }
    ));
    assert!(matches!(
        literal_error("ip.addr in [10.0.0.0/0]"),
        LiteralError::InvalidPrefix { .. }
    ));
    assert!(rulecast::parse("ip.addr in [10.0.0.0/32]").is_ok());
}

#[test]
fn validation_offset_points_at_literal() {
    let err = rulecast::parse("device == 'a' and ip.addr == 1.2.3.999").unwrap_err();
    assert_eq!(err.offset(), Some(18));
}

#[test]
fn dnf_flag() {
    let flat = rulecast::parse("device == 'a' and device == 'b' or device == 'c'").unwrap();
    assert!(flat.original_was_dnf());

    let nested = rulecast::parse("device == 'a' and (device == 'b' or device == 'c')").unwrap();
    assert!(!nested.original_was_dnf());
    assert_eq!(nested.root().len(), 2);

    let single = rulecast::parse("device == 'a'").unwrap();
    assert!(single.original_was_dnf());
}

#[test]
fn or_is_looser_than_and() {
    let filter =
        rulecast::parse("device == 'a' or device == 'b' and device == 'c' or device == 'd'")
            .unwrap();
    let sizes: Vec<usize> = filter.root().conjunctions().iter().map(|c| c.len()).collect();
    assert_eq!(sizes, [1, 2, 1]);
}

#[test]
fn uppercase_keywords() {
    let lower = rulecast::parse("device == 'a' and device == 'b' or device == 'c'").unwrap();
    let upper = rulecast::parse("device == 'a' AND device == 'b' OR device == 'c'").unwrap();
    assert_eq!(lower.root(), upper.root());
}

#[test]
fn chained_disjunctions_blow_up() {
    let pair = "(device == 'a' or device == 'b')";
    let input = [pair; 5].join(" and ");
    let filter = rulecast::parse(&input).unwrap();
    assert_eq!(filter.root().len(), 32);
    assert!(filter.root().conjunctions().iter().all(|c| c.len() == 5));
}

#[test]
fn custom_behavior_rejects() {
    #[derive(Debug)]
    struct Lowercase;

    impl rulecast::LiteralBehavior for Lowercase {
        fn validate(&self, literal: &Literal) -> Result<(), LiteralError> {
            rulecast::validate_default(literal)?;
            match literal.value() {
                rulecast::Value::Str(s) if s.chars().any(|c| c.is_ascii_uppercase()) => {
                    Err(LiteralError::Custom(format!("'{s}' must be lowercase")))
                }
                _ => Ok(()),
            }
        }
    }

    let options = ParseOptions::new().literal_behavior("device", Lowercase);
    let compiler = FilterCompiler::default();
    assert!(compiler.parse_with("device == 'tv'", &options).is_ok());

    let err = compiler.parse_with("device == 'TV'", &options).unwrap_err();
    assert_eq!(err.kind(), ParseErrorKind::Validation);
    assert_eq!(err.message(), "'TV' must be lowercase");

    assert!(compiler.parse("device == 'TV'").is_ok());
}

#[test]
fn custom_behavior_renders() {
    #[derive(Debug)]
    struct Upper;

    impl rulecast::LiteralBehavior for Upper {
        fn lvalue(&self, literal: &Literal, renderer: &rulecast::Renderer<'_>) -> String {
            renderer.resolve_field(literal.field()).to_uppercase()
        }

        fn rvalue(
            &self,
            literal: &Literal,
            renderer: &rulecast::Renderer<'_>,
        ) -> rulecast::Notation {
            match renderer.default_value(literal) {
                rulecast::Notation::Atom(s) => rulecast::Notation::Atom(s.to_uppercase()),
                other => other,
            }
        }
    }

    let options = ParseOptions::new().literal_behavior("http.method", Upper);
    let filter = FilterCompiler::default()
        .parse_with("http.method == 'get' and device == 'tv'", &options)
        .unwrap();
    assert_eq!(
        filter.to_notation().to_string(),
        r#"["AND",["REQUEST_METHOD","==","GET"],["device","==","tv"]]"#
    );
}

#[test]
fn invalid_schema_rejected() {
    assert!(Schema::from_json(r#"{ "fields": { "x": { "family": "colour" } } }"#).is_err());
    assert!(Schema::from_json(r#"{ "unknown": {} }"#).is_err());
    assert!(Schema::from_json(
        r#"{ "fields": { "x": { "family": "string", "values": { "true": "y", "false": "n" } } } }"#
    )
    .is_err());
}

#[test]
fn schema_json_round_trip() {
    let schema = Schema::default()
        .field("user.age", FieldSpec::new(FieldFamily::Numeric).target("age"));
    let json = schema.to_json().unwrap();
    assert_eq!(Schema::from_json(&json).unwrap(), schema);
}
