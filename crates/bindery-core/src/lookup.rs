//! Read-only access to a state tree by path string.

use crate::error::StateError;
use crate::path::{Path, resolve};
use crate::value::Value;

/// Anything that can answer path queries.
///
/// The expression engine reads state exclusively through this trait, so it
/// works the same against a plain [`Value`] and an observable state handle.
pub trait PathLookup {
    /// Current value at `path`.
    fn retrieve(&self, path: &str) -> Result<Value, StateError>;

    /// Whether `path` is well formed and resolves. Never fails.
    fn path_exists(&self, path: &str) -> bool {
        self.retrieve(path).is_ok()
    }
}

impl PathLookup for Value {
    fn retrieve(&self, path: &str) -> Result<Value, StateError> {
        let path = Path::parse(path)?;
        resolve(self, &path).map(|value| value.into_owned())
    }

    fn path_exists(&self, path: &str) -> bool {
        Path::parse(path).is_ok_and(|path| resolve(self, &path).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_lookup() {
        let state = Value::object([("a", Value::object([("b", 1)]))]);
        assert_eq!(state.retrieve("a.b"), Ok(Value::from(1)));
        assert!(state.path_exists("a.b"));
        assert!(!state.path_exists("a.c"));
        assert!(!state.path_exists("a..b"));
        assert!(matches!(
            state.retrieve("a..b"),
            Err(StateError::InvalidPath(_))
        ));
    }
}
