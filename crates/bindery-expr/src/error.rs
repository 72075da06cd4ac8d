//! Grammar failures.

/// Why an attribute value did not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The attribute value was empty or whitespace.
    Empty,
    /// An assignment has nothing on its right side.
    EmptyOperand,
    /// More than one comparison operator.
    ChainedComparison,
    /// An assignment whose right side is itself an assignment.
    NestedAssignment,
    /// The left side of `=` is not a single operand.
    MissingAssignee,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty expression"),
            Self::EmptyOperand => write!(f, "assignment is missing a value"),
            Self::ChainedComparison => write!(f, "only a single comparison is supported"),
            Self::NestedAssignment => write!(f, "assignments cannot be chained"),
            Self::MissingAssignee => write!(f, "assignment needs a single assignee"),
        }
    }
}

impl std::error::Error for ParseError {}
