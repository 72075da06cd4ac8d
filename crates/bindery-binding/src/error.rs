//! Binding failures.

use std::fmt;

use bindery_core::StateError;
use bindery_dom::{ElementId, SelectorError};
use bindery_expr::{ExpressionKind, ParseError};

/// Errors raised while building a session or moving a value between an
/// element and the state tree.
///
/// Inside apply passes and event handling these never propagate: they are
/// logged, collected into the [`ApplyReport`](crate::ApplyReport), and the
/// pass moves on to the next element.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingError {
    /// The attribute parsed, but to the wrong kind of expression for its role.
    MalformedBindingAttribute {
        attribute: String,
        raw: String,
        expected: ExpressionKind,
        found: ExpressionKind,
    },
    /// No converter, checkbox state, or form value to read from the element.
    NoExtractableValue { element: ElementId },
    /// No converter, checkbox state, form value, or text content to write to.
    NoWritableTarget { element: ElementId },
    /// The attribute value did not parse.
    UnparseableExpression {
        attribute: String,
        raw: String,
        error: ParseError,
    },
    /// A loop source resolved to something other than an array.
    NotIterable { path: String, found: &'static str },
    /// The scope selector matched nothing.
    ScopeNotFound { selector: String },
    InvalidSelector(SelectorError),
    /// Writing into the state tree failed.
    State(StateError),
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedBindingAttribute {
                attribute,
                raw,
                expected,
                found,
            } => write!(
                f,
                "expected {expected} in {attribute}, got {found} from {raw:?}"
            ),
            Self::NoExtractableValue { element } => {
                write!(f, "no value to read from element {element}")
            }
            Self::NoWritableTarget { element } => {
                write!(f, "don't know how to write a value to element {element}")
            }
            Self::UnparseableExpression {
                attribute,
                raw,
                error,
            } => write!(f, "could not parse {attribute}={raw:?}: {error}"),
            Self::NotIterable { path, found } => {
                write!(f, "can't iterate over {path}: found {found}")
            }
            Self::ScopeNotFound { selector } => {
                write!(f, "scope selector {selector:?} matched no element")
            }
            Self::InvalidSelector(e) => write!(f, "invalid selector: {e}"),
            Self::State(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BindingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSelector(e) => Some(e),
            Self::State(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StateError> for BindingError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}

impl From<SelectorError> for BindingError {
    fn from(e: SelectorError) -> Self {
        Self::InvalidSelector(e)
    }
}
