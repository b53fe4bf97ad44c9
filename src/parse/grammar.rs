use std::cell::{Cell, RefCell};

use log::warn;
use winnow::combinator::{alt, cut_err, delimited, eof, repeat};
use winnow::error::{
    ContextError, ErrMode, FromExternalError, ModalResult, StrContext, StrContextValue,
};
use winnow::prelude::*;
use winnow::stream::Stateful;
use winnow::token::any;

use crate::types::{Disjunction, DslOp, Expr, Field, FieldFamily, Literal, ParseOptions, Value};

use super::error::ParseError;
use super::token::{Spanned, Token};
use super::Parsed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoolOp {
    And,
    Or,
}

// -- Reducer ----------------------------------------------------------------

/// Parse-local value stack and DNF flag. Every parse builds its own.
#[derive(Debug)]
struct Reducer<'o> {
    stack: RefCell<Vec<Expr>>,
    original_was_dnf: Cell<bool>,
    options: &'o ParseOptions,
}

impl<'o> Reducer<'o> {
    fn new(options: &'o ParseOptions) -> Self {
        Self {
            stack: RefCell::new(Vec::new()),
            original_was_dnf: Cell::new(true),
            options,
        }
    }

    fn push(&self, field: Field, op: DslOp, value: Value, offset: usize) -> Result<(), ParseError> {
        let value = match (field.family(), value) {
            (FieldFamily::Boolean, Value::Str(s)) if s == "on" || s == "off" => {
                warn!("deprecated boolean '{s}' for '{field}', use {}", s == "on");
                Value::Bool(s == "on")
            }
            (_, value) => value,
        };
        let literal = match self.options.behavior_for(field.name()) {
            Some(behavior) => Literal::with_behavior(field, op, value, behavior),
            None => Literal::new(field, op, value),
        }
        .map_err(|e| ParseError::validation(offset, e))?;
        self.stack.borrow_mut().push(Expr::Literal(literal));
        Ok(())
    }

    fn commit(&self, op: BoolOp, offset: usize) -> Result<(), ParseError> {
        let mut stack = self.stack.borrow_mut();
        let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
            return Err(ParseError::grammar(Some(offset), "missing operand"));
        };
        let combined = match op {
            BoolOp::Or => left + right,
            BoolOp::And => {
                if left.is_disjunction() != right.is_disjunction() {
                    self.original_was_dnf.set(false);
                }
                left * right
            }
        };
        stack.push(combined);
        Ok(())
    }

    fn finish(self) -> Result<Parsed, ParseError> {
        let mut stack = self.stack.into_inner();
        let root = match (stack.pop(), stack.is_empty()) {
            (Some(expr), true) => expr.into_disjunction(),
            (None, _) => Disjunction::default(),
            (Some(_), false) => {
                return Err(ParseError::grammar(None, "unreduced operands left over"))
            }
        };
        Ok(Parsed {
            root,
            original_was_dnf: self.original_was_dnf.get(),
        })
    }
}

// -- Grammar ----------------------------------------------------------------
//
// OR below AND, both left-associative, parentheses pass their value
// through. Each parser reduces into the reducer carried as stream state.

type Tokens<'t, 'r> = Stateful<&'t [Spanned], &'r Reducer<'r>>;

fn expected(what: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(what))
}

/// Lift a reducer or check failure into a cut so it is reported as is.
fn cut_on<T>(input: &Tokens<'_, '_>, result: Result<T, ParseError>) -> ModalResult<T> {
    result.map_err(|e| ErrMode::Cut(ContextError::from_external_error(input, e)))
}

fn punct(input: &mut Tokens<'_, '_>, kind: &Token) -> ModalResult<usize> {
    any.verify_map(|s: Spanned| (s.token == *kind).then_some(s.offset))
        .parse_next(input)
}

fn or_kw(input: &mut Tokens<'_, '_>) -> ModalResult<usize> {
    punct(input, &Token::Or)
}

fn and_kw(input: &mut Tokens<'_, '_>) -> ModalResult<usize> {
    punct(input, &Token::And)
}

fn open(input: &mut Tokens<'_, '_>) -> ModalResult<usize> {
    punct(input, &Token::LParen)
}

fn close(input: &mut Tokens<'_, '_>) -> ModalResult<usize> {
    punct(input, &Token::RParen)
}

fn expression(input: &mut Tokens<'_, '_>) -> ModalResult<()> {
    conjunction(input)?;
    repeat(0.., or_tail).parse_next(input)
}

fn or_tail(input: &mut Tokens<'_, '_>) -> ModalResult<()> {
    let offset = or_kw(input)?;
    cut_err(conjunction).parse_next(input)?;
    let reducer = input.state;
    cut_on(input, reducer.commit(BoolOp::Or, offset))
}

fn conjunction(input: &mut Tokens<'_, '_>) -> ModalResult<()> {
    primary(input)?;
    repeat(0.., and_tail).parse_next(input)
}

fn and_tail(input: &mut Tokens<'_, '_>) -> ModalResult<()> {
    let offset = and_kw(input)?;
    cut_err(primary).parse_next(input)?;
    let reducer = input.state;
    cut_on(input, reducer.commit(BoolOp::And, offset))
}

fn primary(input: &mut Tokens<'_, '_>) -> ModalResult<()> {
    alt((group, literal))
        .context(expected("a field or '('"))
        .parse_next(input)
}

fn group(input: &mut Tokens<'_, '_>) -> ModalResult<()> {
    delimited(
        open,
        cut_err(expression),
        cut_err(close.context(expected("')'"))),
    )
    .parse_next(input)
}

fn field(input: &mut Tokens<'_, '_>) -> ModalResult<(Field, usize)> {
    any.verify_map(|s: Spanned| match s.token {
        Token::Ident(field) => Some((field, s.offset)),
        _ => None,
    })
    .parse_next(input)
}

fn operator(input: &mut Tokens<'_, '_>) -> ModalResult<DslOp> {
    any.verify_map(|s: Spanned| match s.token {
        Token::Op(op) => Some(op),
        _ => None,
    })
    .context(expected("an operator"))
    .parse_next(input)
}

fn value(input: &mut Tokens<'_, '_>) -> ModalResult<(Value, usize)> {
    any.verify_map(|s: Spanned| match s.token {
        Token::Value(value) => Some((value, s.offset)),
        _ => None,
    })
    .context(expected("a value"))
    .parse_next(input)
}

/// `field op value`. Once the field matches, the rest is committed.
fn literal(input: &mut Tokens<'_, '_>) -> ModalResult<()> {
    let (field, offset) = field(input)?;
    let op = cut_err(operator).parse_next(input)?;

    let family = field.family();
    if !family.supports(op) {
        let err = ParseError::grammar(
            Some(offset),
            format!("'{op}' cannot be used with {family} field '{field}'"),
        );
        return cut_on(input, Err(err));
    }

    let (value, value_offset) = cut_err(value).parse_next(input)?;
    let deprecated_bool =
        family == FieldFamily::Boolean && op == DslOp::Eq && matches!(value, Value::Str(_));
    if !deprecated_bool && !family.accepts(op, value.kind()) {
        let expected = family
            .expected_kind(op)
            .map_or_else(|| "a value".to_owned(), |k| format!("a {k}"));
        let err = ParseError::grammar(
            Some(value_offset),
            format!("'{field} {op}' expects {expected}, got {value}"),
        );
        return cut_on(input, Err(err));
    }

    let reducer = input.state;
    cut_on(input, reducer.push(field, op, value, offset))
}

/// Turn a winnow failure into a [`ParseError`]. `at` is the token the
/// parser stopped on, `None` past the last one.
fn grammar_error(err: ErrMode<ContextError>, at: Option<&Spanned>, end: usize) -> ParseError {
    let Ok(err) = err.into_inner() else {
        return ParseError::grammar(Some(end), "incomplete input");
    };
    if let Some(cause) = err.cause().and_then(|c| c.downcast_ref::<ParseError>()) {
        return cause.clone();
    }
    let (offset, found) = match at {
        Some(s) => (s.offset, s.token.to_string()),
        None => (end, "end of input".to_owned()),
    };
    let what = err.context().find_map(|c| match c {
        StrContext::Expected(StrContextValue::Description(what)) => Some(*what),
        _ => None,
    });
    match what {
        Some(what) => ParseError::grammar(Some(offset), format!("expected {what}, found {found}")),
        None => ParseError::grammar(Some(offset), format!("unexpected {found}")),
    }
}

/// Reduce a token stream to a DNF tree. `end` is the source length, used as
/// the offset of errors at end of input.
pub(crate) fn reduce(
    tokens: &[Spanned],
    end: usize,
    options: &ParseOptions,
) -> Result<Parsed, ParseError> {
    let reducer = Reducer::new(options);
    if !tokens.is_empty() {
        let mut input = Tokens {
            input: tokens,
            state: &reducer,
        };
        if let Err(err) = (expression, eof).void().parse_next(&mut input) {
            let at = tokens.get(tokens.len() - input.input.len());
            return Err(grammar_error(err, at, end));
        }
    }
    reducer.finish()
}
