use log::debug;
use winnow::ascii::digit1;
use winnow::combinator::{alt, delimited, not, opt, preceded, separated, terminated};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};

use crate::types::{DslOp, Field, Schema, Value};

use super::error::ParseError;
use super::token::{Spanned, Token};

// -- Whitespace -------------------------------------------------------------

fn is_space(c: char) -> bool {
    c.is_ascii_whitespace()
}

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., is_space).void().parse_next(input)
}

fn list_sep(input: &mut &str) -> ModalResult<()> {
    (ws, ',', ws).void().parse_next(input)
}

// -- Operators and grouping -------------------------------------------------

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `in`, `has` or `contains` as a whole word.
fn negatable(input: &mut &str) -> ModalResult<DslOp> {
    terminated(
        alt((
            "in".value(DslOp::In),
            "has".value(DslOp::Has),
            "contains".value(DslOp::Contains),
        )),
        not(one_of(is_word_char)),
    )
    .parse_next(input)
}

fn negated(op: DslOp) -> Token {
    Token::Op(op.negated().unwrap_or(op))
}

fn symbol(input: &mut &str) -> ModalResult<Token> {
    alt((
        "==".value(Token::Op(DslOp::Eq)),
        "!=".value(Token::Op(DslOp::Neq)),
        ">=".value(Token::Op(DslOp::Gte)),
        "<=".value(Token::Op(DslOp::Lte)),
        preceded('!', negatable).map(negated),
        preceded(("not", take_while(1.., is_space)), negatable).map(negated),
        '('.value(Token::LParen),
        ')'.value(Token::RParen),
    ))
    .parse_next(input)
}

// -- Values -----------------------------------------------------------------

fn quoted<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    delimited('\'', take_till(1.., |c: char| c == '\'' || c == '\n'), '\'').parse_next(input)
}

fn digits<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    digit1.parse_next(input)
}

/// At most 11 digits, kept as written.
fn number(input: &mut &str) -> ModalResult<String> {
    digits
        .verify(|d: &str| d.len() <= 11)
        .map(str::to_owned)
        .parse_next(input)
}

/// Dotted quad. Octet ranges are checked when the literal is built.
fn ip_addr<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (digits, '.', digits, '.', digits, '.', digits)
        .take()
        .parse_next(input)
}

fn ip_or_cidr<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (ip_addr, opt(('/', digits))).take().parse_next(input)
}

fn ip_list(input: &mut &str) -> ModalResult<Vec<String>> {
    delimited(
        ('[', ws),
        separated(1.., ip_or_cidr.map(str::to_owned), list_sep),
        (ws, ']'),
    )
    .parse_next(input)
}

fn num_list(input: &mut &str) -> ModalResult<Vec<String>> {
    delimited(('[', ws), separated(1.., number, list_sep), (ws, ']')).parse_next(input)
}

fn str_list(input: &mut &str) -> ModalResult<Vec<String>> {
    delimited(
        ('[', ws),
        separated(1.., quoted.map(|s: &str| s.trim().to_owned()), list_sep),
        (ws, ']'),
    )
    .parse_next(input)
}

/// IP forms are tried before numbers and numeric lists so that a dotted
/// quad is never split into numbers.
fn value(input: &mut &str) -> ModalResult<Value> {
    alt((
        quoted.map(|s: &str| Value::Str(s.to_owned())),
        ip_list.map(Value::IpList),
        num_list.map(Value::NumList),
        str_list.map(Value::StrList),
        ip_addr.map(|s: &str| Value::Ip(s.to_owned())),
        number.map(Value::Num),
    ))
    .parse_next(input)
}

// -- Words ------------------------------------------------------------------

/// Connectives, bare operators and boolean values as whole words. Tried
/// before field names so a keyword is never read as a keyed container.
fn keyword(input: &mut &str) -> ModalResult<Token> {
    terminated(
        alt((
            alt(("and", "AND")).value(Token::And),
            alt(("or", "OR")).value(Token::Or),
            "in".value(Token::Op(DslOp::In)),
            "has".value(Token::Op(DslOp::Has)),
            "contains".value(Token::Op(DslOp::Contains)),
            "true".value(Token::Value(Value::Bool(true))),
            "false".value(Token::Value(Value::Bool(false))),
        )),
        not(one_of(|c: char| is_word_char(c) || c == '.')),
    )
    .parse_next(input)
}

fn word<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| is_word_char(c) || c == '.'),
    )
        .take()
        .parse_next(input)
}

/// `['custom-key']` directly after a container name.
fn bracket_key<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    delimited(
        "['",
        take_while(1.., |c: char| is_word_char(c) || c == '-'),
        "']",
    )
    .parse_next(input)
}

enum Lexeme<'i> {
    Token(Token),
    Word(&'i str, Option<&'i str>),
}

fn lexeme<'i>(input: &mut &'i str) -> ModalResult<Lexeme<'i>> {
    alt((
        symbol.map(Lexeme::Token),
        value.map(|v| Lexeme::Token(Token::Value(v))),
        keyword.map(Lexeme::Token),
        (word, opt(bracket_key)).map(|(w, k)| Lexeme::Word(w, k)),
    ))
    .parse_next(input)
}

/// Schema field for a word, keyed or plain. `None` for unknown words.
fn classify(word: &str, key: Option<&str>, schema: &Schema) -> Option<Token> {
    let field = match key {
        Some(key) => Field::keyed(word, key, schema.keyed_container(word)?.family),
        None => Field::new(word, schema.lookup(word)?.family),
    };
    Some(Token::Ident(field))
}

// -- Top-level lexer --------------------------------------------------------

/// Split `source` into tokens, recognizing fields through `schema`.
///
/// # Errors
///
/// Returns a lexical [`ParseError`] at the first position no token matches,
/// including words that are neither keywords nor schema fields.
pub fn tokenize(source: &str, schema: &Schema) -> Result<Vec<Spanned>, ParseError> {
    let mut input = source;
    let mut tokens = Vec::new();

    loop {
        input = input.trim_start_matches(is_space);
        if input.is_empty() {
            break;
        }
        let offset = source.len() - input.len();

        let token = match lexeme.parse_next(&mut input) {
            Ok(Lexeme::Token(token)) => token,
            Ok(Lexeme::Word(word, key)) => classify(word, key, schema).ok_or_else(|| {
                let name = match key {
                    Some(key) => format!("{word}['{key}']"),
                    None => word.to_owned(),
                };
                ParseError::lexical(offset, format!("unknown field '{name}'"))
            })?,
            Err(_) => {
                let found = source
                    .get(offset..)
                    .and_then(|rest| rest.chars().next())
                    .unwrap_or_default();
                return Err(ParseError::lexical(
                    offset,
                    format!("unexpected character {found:?}"),
                ));
            }
        };
        tokens.push(Spanned { token, offset });
    }

    debug!("lexed {} tokens", tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ParseErrorKind;
    use crate::types::FieldFamily;

    fn lex(input: &str) -> Vec<Token> {
        tokenize(input, &Schema::default())
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    fn lex_err(input: &str) -> ParseError {
        tokenize(input, &Schema::default()).unwrap_err()
    }

    #[test]
    fn simple_literal() {
        assert_eq!(
            lex("http.method == 'GET'"),
            [
                Token::Ident(Field::new("http.method", FieldFamily::String)),
                Token::Op(DslOp::Eq),
                Token::Value(Value::Str("GET".into())),
            ]
        );
    }

    #[test]
    fn offsets_point_at_token_starts() {
        let tokens = tokenize("  ip.addr  == 1.2.3.4", &Schema::default()).unwrap();
        let offsets: Vec<usize> = tokens.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, [2, 11, 14]);
    }

    #[test]
    fn ip_before_number() {
        assert_eq!(lex("127.0.0.1"), [Token::Value(Value::Ip("127.0.0.1".into()))]);
        assert_eq!(lex("1234"), [Token::Value(Value::Num("1234".into()))]);
    }

    #[test]
    fn ip_list_before_number_list() {
        assert_eq!(
            lex("[ 192.168.1.1/28 ,  127.0.0.1 ]"),
            [Token::Value(Value::IpList(vec![
                "192.168.1.1/28".into(),
                "127.0.0.1".into()
            ]))]
        );
        assert_eq!(
            lex("[  1234 , 345 ]"),
            [Token::Value(Value::NumList(vec!["1234".into(), "345".into()]))]
        );
    }

    #[test]
    fn string_list_items_trimmed() {
        assert_eq!(
            lex("[ 'curl', ' firefox '  ,'chrome'  ]"),
            [Token::Value(Value::StrList(vec![
                "curl".into(),
                "firefox".into(),
                "chrome".into()
            ]))]
        );
    }

    #[test]
    fn string_keeps_inner_spaces() {
        assert_eq!(
            lex("'curl/8.1-beta test'"),
            [Token::Value(Value::Str("curl/8.1-beta test".into()))]
        );
    }

    #[test]
    fn worded_and_symbolic_negation_agree() {
        for (worded, symbolic, op) in [
            ("not in", "!in", DslOp::NotIn),
            ("not has", "!has", DslOp::NotHas),
            ("not contains", "!contains", DslOp::NotContains),
        ] {
            assert_eq!(lex(worded), [Token::Op(op)]);
            assert_eq!(lex(symbolic), [Token::Op(op)]);
        }
    }

    #[test]
    fn keywords_both_cases() {
        assert_eq!(lex("and AND or OR"), [Token::And, Token::And, Token::Or, Token::Or]);
    }

    #[test]
    fn list_operator_directly_before_bracket() {
        assert_eq!(
            lex("http.method in['a']"),
            [
                Token::Ident(Field::new("http.method", FieldFamily::String)),
                Token::Op(DslOp::In),
                Token::Value(Value::StrList(vec!["a".into()])),
            ]
        );
        assert_eq!(
            lex("ip.geoip.asn in[1,2]"),
            [
                Token::Ident(Field::new("ip.geoip.asn", FieldFamily::Numeric)),
                Token::Op(DslOp::In),
                Token::Value(Value::NumList(vec!["1".into(), "2".into()])),
            ]
        );
        assert_eq!(
            lex("!in['a']"),
            [
                Token::Op(DslOp::NotIn),
                Token::Value(Value::StrList(vec!["a".into()])),
            ]
        );
    }

    #[test]
    fn keyword_prefix_stays_a_field() {
        let schema = Schema::empty()
            .field("inbound", crate::FieldSpec::new(FieldFamily::Boolean))
            .field("true.zone", crate::FieldSpec::new(FieldFamily::String));
        let tokens: Vec<Token> = tokenize("inbound true.zone", &schema)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect();
        assert_eq!(
            tokens,
            [
                Token::Ident(Field::new("inbound", FieldFamily::Boolean)),
                Token::Ident(Field::new("true.zone", FieldFamily::String)),
            ]
        );
    }

    #[test]
    fn keyed_field() {
        assert_eq!(
            lex("http.headers['content-type']"),
            [Token::Ident(Field::keyed(
                "http.headers",
                "content-type",
                FieldFamily::String
            ))]
        );
    }

    #[test]
    fn list_container_and_longer_field_are_distinct() {
        assert_eq!(
            lex("http.headers http.headers.user_agent"),
            [
                Token::Ident(Field::new("http.headers", FieldFamily::List)),
                Token::Ident(Field::new("http.headers.user_agent", FieldFamily::String)),
            ]
        );
    }

    #[test]
    fn booleans_and_parens() {
        assert_eq!(
            lex("(true)false"),
            [
                Token::LParen,
                Token::Value(Value::Bool(true)),
                Token::RParen,
                Token::Value(Value::Bool(false)),
            ]
        );
    }

    #[test]
    fn unknown_field_is_lexical() {
        let err = lex_err("user.name == 'x'");
        assert_eq!(err.kind(), ParseErrorKind::Lexical);
        assert_eq!(err.offset(), Some(0));
        assert!(err.message().contains("user.name"));
    }

    #[test]
    fn unknown_keyed_container() {
        let err = lex_err("ip.addr['x'] == 'y'");
        assert_eq!(err.kind(), ParseErrorKind::Lexical);
        assert!(err.message().contains("ip.addr['x']"));
    }

    #[test]
    fn unrecognized_character() {
        let err = lex_err("http.method == $");
        assert_eq!(err.kind(), ParseErrorKind::Lexical);
        assert_eq!(err.offset(), Some(15));
    }

    #[test]
    fn number_too_long() {
        assert_eq!(
            lex("12345678901"),
            [Token::Value(Value::Num("12345678901".into()))]
        );
        assert_eq!(lex_err("123456789012").kind(), ParseErrorKind::Lexical);
    }

    #[test]
    fn empty_list_and_unterminated_string_fail() {
        assert_eq!(lex_err("[]").kind(), ParseErrorKind::Lexical);
        assert_eq!(lex_err("'open").kind(), ParseErrorKind::Lexical);
    }

    #[test]
    fn negation_needs_whole_word() {
        assert_eq!(lex_err("!inside").kind(), ParseErrorKind::Lexical);
    }

    #[test]
    fn custom_schema_fields() {
        let schema = Schema::empty().field("user.age", crate::FieldSpec::new(FieldFamily::Numeric));
        let tokens = tokenize("user.age >= 18", &schema).unwrap();
        assert_eq!(
            tokens[0].token,
            Token::Ident(Field::new("user.age", FieldFamily::Numeric))
        );
        assert!(tokenize("http.method == 'GET'", &schema).is_err());
    }
}
