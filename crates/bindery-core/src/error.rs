//! Errors raised while addressing or writing the state tree.

/// Errors from path resolution and value coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The path string is not a dotted chain of identifiers and indices.
    InvalidPath(String),
    /// The path is well formed but a segment does not exist.
    UnknownPath { path: String, segment: String },
    /// The stored value has no defined cast to the current leaf's type.
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl StateError {
    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidPath(path)
            | Self::UnknownPath { path, .. }
            | Self::TypeMismatch { path, .. } => path,
        }
    }
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath(path) => write!(f, "invalid path: '{path}'"),
            Self::UnknownPath { path, segment } => {
                write!(f, "state has no property '{segment}' for path '{path}'")
            }
            Self::TypeMismatch {
                path,
                expected,
                found,
            } => write!(f, "can't cast {found} to {expected} at '{path}'"),
        }
    }
}

impl std::error::Error for StateError {}
