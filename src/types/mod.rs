mod behavior;
mod error;
mod expr;
mod field;
mod filter;
mod notation;
mod operator;
mod schema;
mod value;

pub use behavior::{validate_default, DefaultBehavior, LiteralBehavior};
pub use error::LiteralError;
pub use expr::{Conjunction, Disjunction, Expr, Literal};
pub use field::{Field, FieldFamily, FieldKey};
pub use filter::{FieldMap, Filter, FilterCompiler, ParseOptions};
pub use notation::Notation;
pub use operator::{DslOp, OperatorTable};
pub use schema::{BoolTargets, FieldSpec, KeyedSpec, Schema};
pub use value::{Value, ValueKind};

pub(crate) use behavior::default_behavior;
