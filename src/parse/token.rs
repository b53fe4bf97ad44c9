use std::fmt;

use crate::types::{DslOp, Field, Value};

/// A classified lexeme.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A field known to the schema, typed by its family.
    Ident(Field),
    Value(Value),
    Op(DslOp),
    And,
    Or,
    LParen,
    RParen,
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(field) => write!(f, "field '{field}'"),
            Token::Value(value) => write!(f, "value {value}"),
            Token::Op(op) => write!(f, "'{op}'"),
            Token::And => write!(f, "'and'"),
            Token::Or => write!(f, "'or'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
        }
    }
}
