//! Coercion of incoming values against the type already stored at a leaf.
//!
//! Values coming from the document are mostly text. Before a write lands in
//! the state tree it is cast to the type of the value it replaces:
//!
//! | Current leaf | Incoming value becomes |
//! |--------------|------------------------|
//! | number | [`parse_float`] of its text form |
//! | string | its text form |
//! | boolean | its truthiness |
//! | `null` / `undefined` | a literal-coerced string, or the value unchanged |
//! | array / object | the value unchanged if composite, else [`TypeMismatch`](StateError::TypeMismatch) |

use crate::error::StateError;
use crate::value::{Value, parse_float};

/// Cast `raw` to the type of `current`. `path` is only used for errors.
pub fn cast(raw: Value, current: &Value, path: &str) -> Result<Value, StateError> {
    match current {
        Value::Undefined | Value::Null => Ok(match raw {
            Value::String(text) => Value::from_literal(&text),
            other => other,
        }),
        Value::Number(_) => Ok(Value::Number(match raw {
            Value::Number(n) => n,
            Value::String(text) => parse_float(&text),
            other => parse_float(&other.to_display_string()),
        })),
        Value::String(_) => Ok(match raw {
            Value::String(text) => Value::String(text),
            other => Value::String(other.to_display_string()),
        }),
        Value::Bool(_) => Ok(Value::Bool(raw.truthy())),
        Value::Array(_) | Value::Object(_) if raw.is_composite() => Ok(raw),
        Value::Array(_) | Value::Object(_) => Err(StateError::TypeMismatch {
            path: path.to_string(),
            expected: current.type_name(),
            found: raw.type_name(),
        }),
    }
}
