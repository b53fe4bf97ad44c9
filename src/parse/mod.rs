//! Filter text → DNF tree.
//!
//! [`tokenize`] splits the text using the schema's field table; the
//! grammar then reduces the tokens bottom-up through the boolean algebra.

mod error;
mod grammar;
mod lexer;
mod token;

use log::debug;

pub use error::{ParseError, ParseErrorKind};
pub use lexer::tokenize;
pub use token::{Spanned, Token};

use crate::types::{Disjunction, ParseOptions, Schema};

#[derive(Debug)]
pub(crate) struct Parsed {
    pub(crate) root: Disjunction,
    pub(crate) original_was_dnf: bool,
}

/// Parse `input` into DNF. Blank input yields an empty disjunction.
/// Nesting depth is bounded only by the stack.
///
/// # Errors
///
/// Returns [`ParseError`] on the first lexical, grammar or validation
/// failure. No partial result is produced.
pub(crate) fn parse(
    input: &str,
    schema: &Schema,
    options: &ParseOptions,
) -> Result<Parsed, ParseError> {
    if input.trim().is_empty() {
        return Ok(Parsed {
            root: Disjunction::default(),
            original_was_dnf: true,
        });
    }
    let tokens = tokenize(input, schema)?;
    let parsed = grammar::reduce(&tokens, input.len(), options)?;
    debug!(
        "parsed {} tokens into {} conjunctions (dnf: {})",
        tokens.len(),
        parsed.root.len(),
        parsed.original_was_dnf
    );
    Ok(parsed)
}
