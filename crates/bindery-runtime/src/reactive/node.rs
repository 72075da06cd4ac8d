#![forbid(unsafe_code)]

//! Wrapper handles for composite positions in the state tree.
//!
//! A [`Node`] is created lazily when code descends into an object or array
//! through [`Node::child`] or [`ObservableState::node`]. It carries the
//! segment list of its own position, so every write through it is reported
//! with a fully qualified path.
//!
//! Nodes address positions, not data. After an array element is removed,
//! a node created for index `2` addresses whatever now sits at index `2`.
//!
//! # Aliasing
//!
//! Values never share storage between tree positions. Inserting a node's
//! content elsewhere goes through `Value::from(&node)`, which takes a deep
//! copy; later writes to either position are observed independently.

use std::borrow::Cow;

use bindery_core::path::{Segment, child, join};
use bindery_core::{StateError, Value};

use super::observable::{Change, ObservableState};

/// Observable handle for one object or array in the tree.
#[derive(Clone)]
pub struct Node {
    state: ObservableState,
    segments: Vec<Segment>,
}

impl Node {
    pub(crate) fn new(state: ObservableState, segments: Vec<Segment>) -> Self {
        Self { state, segments }
    }

    /// Dotted path of this node; empty for the root.
    #[must_use]
    pub fn path(&self) -> String {
        join(&self.segments)
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The state this node belongs to.
    #[must_use]
    pub fn state(&self) -> &ObservableState {
        &self.state
    }

    fn child_path(&self, key: &Segment) -> String {
        if self.segments.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path())
        }
    }

    /// Run `f` on the value at this position, under the state borrow.
    /// `None` when the position no longer exists.
    fn with_own<R>(&self, f: impl FnOnce(&Value) -> R) -> Option<R> {
        let root = self.state.borrow();
        let mut current = &*root;
        for segment in &self.segments {
            current = match child(current, segment)? {
                Cow::Borrowed(value) => value,
                Cow::Owned(_) => return None,
            };
        }
        Some(f(current))
    }

    /// Read the value stored under `key`.
    ///
    /// Returns `None` when the key is missing or this position no longer
    /// holds a composite.
    #[must_use]
    pub fn get(&self, key: impl Into<Segment>) -> Option<Value> {
        let key = key.into();
        self.with_own(|own| child(own, &key).map(Cow::into_owned)).flatten()
    }

    /// Descend into the composite stored under `key`.
    #[must_use]
    pub fn child(&self, key: impl Into<Segment>) -> Option<Node> {
        let key = key.into();
        let value = self.get(key.clone())?;
        if !value.is_composite() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.push(key);
        Some(Node::new(self.state.clone(), segments))
    }

    /// Write `value` under `key`.
    ///
    /// Objects accept new keys. Arrays accept existing indices and the index
    /// one past the end (an append). Equal writes are suppressed; returns
    /// whether the tree changed.
    pub fn set(&self, key: impl Into<Segment>, value: impl Into<Value>) -> Result<bool, StateError> {
        let key = key.into();
        let value = value.into();
        let path = self.child_path(&key);
        self.state.mutate(&self.segments, |container| {
            let slot = match (container, &key) {
                (Value::Object(map), _) => {
                    let name = key.as_key().into_owned();
                    // Writing `undefined` to a missing key changes nothing.
                    if map.get(&name).unwrap_or(&Value::Undefined) == &value {
                        return Ok((false, None));
                    }
                    map.entry(name).or_default()
                }
                (Value::Array(items), Segment::Index(i)) if *i < items.len() => &mut items[*i],
                (Value::Array(items), Segment::Index(i)) if *i == items.len() => {
                    if value == Value::Undefined {
                        return Ok((false, None));
                    }
                    items.push(Value::Undefined);
                    &mut items[*i]
                }
                _ => {
                    return Err(StateError::UnknownPath {
                        path: path.clone(),
                        segment: key.to_string(),
                    });
                }
            };
            if *slot == value {
                return Ok((false, None));
            }
            let old = std::mem::replace(slot, value.clone());
            Ok((
                true,
                Some(Change {
                    path: path.clone(),
                    old,
                    new: value,
                }),
            ))
        })
    }

    /// Append to an array node. Reports the new index path.
    pub fn push(&self, value: impl Into<Value>) -> Result<usize, StateError> {
        let value = value.into();
        let prefix = self.path();
        self.state.mutate(&self.segments, |container| {
            let found = container.type_name();
            let Value::Array(items) = container else {
                return Err(not_an_array(&prefix, found));
            };
            let index = items.len();
            items.push(value.clone());
            let path = if prefix.is_empty() {
                index.to_string()
            } else {
                format!("{prefix}.{index}")
            };
            Ok((
                index,
                Some(Change {
                    path,
                    old: Value::Undefined,
                    new: value,
                }),
            ))
        })
    }

    /// Remove the last element of an array node.
    pub fn pop(&self) -> Result<Option<Value>, StateError> {
        let path = self.path();
        self.state.mutate(&self.segments, |container| {
            let found = container.type_name();
            let Value::Array(items) = container else {
                return Err(not_an_array(&path, found));
            };
            let old = Value::Array(items.clone());
            let popped = items.pop();
            let change = popped.as_ref().map(|_| Change {
                path: path.clone(),
                old,
                new: Value::Array(items.clone()),
            });
            Ok((popped, change))
        })
    }

    /// Remove `key` from an object, or the element at an index from an array.
    ///
    /// Object removals report the key path with a new value of `undefined`;
    /// array removals shift later elements and report the array path.
    pub fn remove(&self, key: impl Into<Segment>) -> Result<Option<Value>, StateError> {
        let key = key.into();
        let own = self.path();
        let key_path = self.child_path(&key);
        self.state.mutate(&self.segments, |container| match (container, &key) {
            (Value::Object(map), _) => {
                let removed = map.remove(key.as_key().as_ref());
                let change = removed.as_ref().map(|old| Change {
                    path: key_path.clone(),
                    old: old.clone(),
                    new: Value::Undefined,
                });
                Ok((removed, change))
            }
            (Value::Array(items), Segment::Index(i)) if *i < items.len() => {
                let old = Value::Array(items.clone());
                let removed = items.remove(*i);
                let change = Change {
                    path: own.clone(),
                    old,
                    new: Value::Array(items.clone()),
                };
                Ok((Some(removed), Some(change)))
            }
            (Value::Array(_), _) => Ok((None, None)),
            (other, _) => Err(not_an_array(&own, other.type_name())),
        })
    }

    /// Number of elements (arrays) or keys (objects).
    #[must_use]
    pub fn len(&self) -> usize {
        self.with_own(|own| match own {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => 0,
        })
        .unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of an object node, or indices of an array node as strings.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.with_own(|own| match own {
            Value::Array(items) => (0..items.len()).map(|i| i.to_string()).collect(),
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        })
        .unwrap_or_default()
    }

    /// Deep copy of this node's current content.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        self.with_own(Value::clone).unwrap_or_default()
    }
}

fn not_an_array(path: &str, found: &'static str) -> StateError {
    StateError::TypeMismatch {
        path: path.to_string(),
        expected: "array",
        found,
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        node.snapshot()
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node").field("path", &self.path()).finish()
    }
}
