//! Parsed attribute expressions.

use std::fmt;

use bindery_core::Value;

use crate::compare::CompareOp;
use crate::error::ParseError;

/// Discriminant of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    Path,
    Literal,
    Comparison,
    Assignment,
    Unparseable,
}

impl fmt::Display for ExpressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Path => "path",
            Self::Literal => "literal",
            Self::Comparison => "comparison",
            Self::Assignment => "assignment",
            Self::Unparseable => "unparseable",
        })
    }
}

/// An attribute value parsed and evaluated against state.
///
/// Values are captured at parse time. Re-parse whenever state may have
/// changed; an `Expression` never observes later writes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// An existing location in state and its current value.
    Path { path: String, value: Value },
    /// A literal token coerced to a value.
    Literal { value: Value },
    /// A single comparison of two operands.
    Comparison {
        op: CompareOp,
        left: Box<Expression>,
        right: Box<Expression>,
        result: bool,
    },
    /// `assignee=assigned`. The assignee is raw text, never evaluated.
    Assignment {
        assignee: String,
        assigned: Box<Expression>,
    },
    /// Parsing failed.
    Unparseable { raw: String, error: ParseError },
}

impl Expression {
    #[must_use]
    pub fn kind(&self) -> ExpressionKind {
        match self {
            Self::Path { .. } => ExpressionKind::Path,
            Self::Literal { .. } => ExpressionKind::Literal,
            Self::Comparison { .. } => ExpressionKind::Comparison,
            Self::Assignment { .. } => ExpressionKind::Assignment,
            Self::Unparseable { .. } => ExpressionKind::Unparseable,
        }
    }

    #[must_use]
    pub fn is_parseable(&self) -> bool {
        !matches!(self, Self::Unparseable { .. })
    }

    /// The evaluated value. Assignments carry their assigned side's value;
    /// unparseable expressions carry none.
    #[must_use]
    pub fn value(&self) -> Option<Value> {
        match self {
            Self::Path { value, .. } | Self::Literal { value } => Some(value.clone()),
            Self::Comparison { result, .. } => Some(Value::Bool(*result)),
            Self::Assignment { assigned, .. } => assigned.value(),
            Self::Unparseable { .. } => None,
        }
    }

    /// The path of a `Path` expression.
    #[must_use]
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Self::Path { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Every state path this expression read from.
    #[must_use]
    pub fn referenced_paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Path { path, .. } => out.push(path),
            Self::Comparison { left, right, .. } => {
                left.collect_paths(out);
                right.collect_paths(out);
            }
            Self::Assignment { assigned, .. } => assigned.collect_paths(out),
            Self::Literal { .. } | Self::Unparseable { .. } => {}
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path { path, .. } => f.write_str(path),
            Self::Literal { value } => write!(f, "{value}"),
            Self::Comparison {
                op, left, right, ..
            } => write!(f, "{left}{op}{right}"),
            Self::Assignment { assignee, assigned } => write!(f, "{assignee}={assigned}"),
            Self::Unparseable { raw, .. } => f.write_str(raw),
        }
    }
}
