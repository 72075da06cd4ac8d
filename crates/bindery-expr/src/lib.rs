#![forbid(unsafe_code)]

//! Declarative attribute expressions for Bindery.
//!
//! Attribute values such as `user.name`, `age>=18`, or `role=admin` are
//! parsed into an [`Expression`] and evaluated eagerly against any
//! [`PathLookup`](bindery_core::PathLookup) state. The grammar is small:
//! one path or literal, one comparison, or one assignment.
//!
//! ```
//! use bindery_core::Value;
//! use bindery_expr::{Expression, parse};
//!
//! let state = Value::object([("age", 20)]);
//! let expr = parse("age >= 18", &state);
//! assert_eq!(expr.value(), Some(Value::Bool(true)));
//! ```

pub mod compare;
pub mod error;
pub mod expression;
pub mod parser;
pub mod template;
pub mod token;

pub use compare::CompareOp;
pub use error::ParseError;
pub use expression::{Expression, ExpressionKind};
pub use parser::{ExpressionEngine, parse, try_parse};
pub use token::{Operator, Token, tokenize};
