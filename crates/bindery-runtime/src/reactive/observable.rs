#![forbid(unsafe_code)]

//! Shared observable handle over a state tree.
//!
//! # Usage
//!
//! ```
//! use bindery_core::{PathLookup, Value};
//! use bindery_runtime::ObservableState;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let state = ObservableState::new(Value::object([("name", "Alice")]));
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let log = Rc::clone(&seen);
//! let _sub = state.subscribe(move |change| log.borrow_mut().push(change.path.clone()));
//!
//! state.store("name", Value::from("Bob")).unwrap();
//! assert_eq!(state.retrieve("name").unwrap(), Value::from("Bob"));
//! assert_eq!(*seen.borrow(), vec!["name".to_string()]);
//! ```

use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};

use bindery_core::path::{Path, Segment, child_mut, join, resolve, resolve_parent_mut};
use bindery_core::{PathLookup, StateError, Value, cast};

use super::node::Node;

/// One change notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// Fully qualified dotted path of the mutated property.
    pub path: String,
    /// Value before the write (`Undefined` for newly added keys).
    pub old: Value,
    /// Value after the write (`Undefined` for removed keys).
    pub new: Value,
}

type Listener = dyn Fn(&Change);

struct Inner {
    root: RefCell<Value>,
    listeners: RefCell<Vec<Weak<Listener>>>,
    version: Cell<u64>,
}

/// Observable wrapper around a state tree.
///
/// Cloning is cheap and yields another handle to the same tree.
#[derive(Clone)]
pub struct ObservableState {
    inner: Rc<Inner>,
}

impl ObservableState {
    /// Wrap `root`. The raw value is moved in; all further access goes
    /// through handles.
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self {
            inner: Rc::new(Inner {
                root: RefCell::new(root),
                listeners: RefCell::new(Vec::new()),
                version: Cell::new(0),
            }),
        }
    }

    /// Node for the tree root.
    #[must_use]
    pub fn root(&self) -> Node {
        Node::new(self.clone(), Vec::new())
    }

    /// Node for the composite value at `path`.
    pub fn node(&self, path: &str) -> Result<Node, StateError> {
        let parsed = Path::parse(path)?;
        let value = self.retrieve(path)?;
        if value.is_composite() {
            Ok(Node::new(self.clone(), parsed.segments().to_vec()))
        } else {
            Err(StateError::TypeMismatch {
                path: path.to_string(),
                expected: "object",
                found: value.type_name(),
            })
        }
    }

    /// Register a change listener.
    ///
    /// The listener stays attached while the returned guard is alive.
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn subscribe(&self, listener: impl Fn(&Change) + 'static) -> Subscription {
        let callback: Rc<Listener> = Rc::new(listener);
        self.inner
            .listeners
            .borrow_mut()
            .push(Rc::downgrade(&callback));
        Subscription {
            _callback: callback,
        }
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Mutation counter; bumps once per effective write.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Coerce `raw` to the type of the current leaf and write it.
    ///
    /// Returns whether the tree changed. Fails without side effects when
    /// the path is malformed, missing, or the cast is undefined.
    pub fn store(&self, path: &str, raw: Value) -> Result<bool, StateError> {
        let parsed = Path::parse(path)?;
        let coerced = {
            let root = self.inner.root.borrow();
            let current = resolve(&root, &parsed)?;
            cast(raw, &current, path)?
        };
        self.write(&parsed, coerced)
    }

    /// Write `value` at an existing `path` without coercion.
    pub fn set_path(&self, path: &str, value: impl Into<Value>) -> Result<bool, StateError> {
        let parsed = Path::parse(path)?;
        self.write(&parsed, value.into())
    }

    /// Deep copy of the whole tree.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        self.inner.root.borrow().clone()
    }

    /// Borrow the tree for a read-only computation.
    pub fn with<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.inner.root.borrow())
    }

    pub(crate) fn borrow(&self) -> Ref<'_, Value> {
        self.inner.root.borrow()
    }

    fn write(&self, path: &Path, value: Value) -> Result<bool, StateError> {
        let old = {
            let mut root = self.inner.root.borrow_mut();
            let (parent, leaf) = resolve_parent_mut(&mut root, path)?;
            let Some(slot) = child_mut(parent, leaf) else {
                return Err(StateError::UnknownPath {
                    path: path.to_string(),
                    segment: leaf.to_string(),
                });
            };
            if *slot == value {
                return Ok(false);
            }
            std::mem::replace(slot, value.clone())
        };
        self.commit(Change {
            path: path.to_string(),
            old,
            new: value,
        });
        Ok(true)
    }

    /// Run `f` against the composite at `segments`, then publish the change
    /// it reports. The borrow is released before listeners run.
    pub(crate) fn mutate<R>(
        &self,
        segments: &[Segment],
        f: impl FnOnce(&mut Value) -> Result<(R, Option<Change>), StateError>,
    ) -> Result<R, StateError> {
        let (result, change) = {
            let mut root = self.inner.root.borrow_mut();
            let mut current: &mut Value = &mut root;
            for segment in segments {
                current = child_mut(current, segment).ok_or_else(|| StateError::UnknownPath {
                    path: join(segments),
                    segment: segment.to_string(),
                })?;
            }
            if !current.is_composite() {
                return Err(StateError::TypeMismatch {
                    path: join(segments),
                    expected: "object",
                    found: current.type_name(),
                });
            }
            f(current)?
        };
        if let Some(change) = change {
            self.commit(change);
        }
        Ok(result)
    }

    fn commit(&self, change: Change) {
        self.inner.version.set(self.inner.version.get() + 1);
        self.notify(&change);
    }

    fn notify(&self, change: &Change) {
        let live: Vec<Rc<Listener>> = {
            let mut listeners = self.inner.listeners.borrow_mut();
            listeners.retain(|w| w.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(
            path = %change.path,
            listeners = live.len(),
            "state change"
        );
        for listener in live {
            listener(change);
        }
    }
}

impl From<Value> for ObservableState {
    fn from(root: Value) -> Self {
        Self::new(root)
    }
}

impl PathLookup for ObservableState {
    fn retrieve(&self, path: &str) -> Result<Value, StateError> {
        let parsed = Path::parse(path)?;
        let root = self.inner.root.borrow();
        resolve(&root, &parsed).map(|value| value.into_owned())
    }

    fn path_exists(&self, path: &str) -> bool {
        let Ok(parsed) = Path::parse(path) else {
            return false;
        };
        resolve(&self.inner.root.borrow(), &parsed).is_ok()
    }
}

impl std::fmt::Debug for ObservableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableState")
            .field("version", &self.version())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// RAII guard for a state listener.
#[must_use = "dropping the subscription detaches the listener"]
pub struct Subscription {
    _callback: Rc<Listener>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn recorder(state: &ObservableState) -> (Subscription, Rc<RefCell<Vec<Change>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let sub = state.subscribe(move |change| sink.borrow_mut().push(change.clone()));
        (sub, log)
    }

    fn sample() -> ObservableState {
        ObservableState::new(Value::object([
            (
                "user",
                Value::object([
                    ("name", Value::from("Alice")),
                    ("age", Value::from(20)),
                    ("admin", Value::Bool(false)),
                    ("nickname", Value::Null),
                ]),
            ),
            ("items", Value::array([1, 2])),
        ]))
    }

    #[test]
    fn store_coerces_and_notifies_once() {
        let state = sample();
        let (_sub, log) = recorder(&state);

        assert_eq!(state.store("user.age", Value::from("21")), Ok(true));
        assert_eq!(state.retrieve("user.age"), Ok(Value::Number(21.0)));
        assert_eq!(
            *log.borrow(),
            vec![Change {
                path: "user.age".into(),
                old: Value::from(20),
                new: Value::from(21),
            }]
        );
        assert_eq!(state.version(), 1);
    }

    #[test]
    fn equal_write_is_suppressed() {
        let state = sample();
        let (_sub, log) = recorder(&state);

        assert_eq!(state.store("user.name", Value::from("Alice")), Ok(false));
        assert_eq!(state.store("user.age", Value::from("20")), Ok(false));
        assert!(log.borrow().is_empty());
        assert_eq!(state.version(), 0);
    }

    #[test]
    fn failed_store_has_no_effect() {
        let state = sample();
        let (_sub, log) = recorder(&state);
        let before = state.snapshot();

        assert!(matches!(
            state.store("user..name", Value::from("x")),
            Err(StateError::InvalidPath(_))
        ));
        assert!(matches!(
            state.store("user.email", Value::from("x")),
            Err(StateError::UnknownPath { .. })
        ));
        assert!(matches!(
            state.store("items", Value::from("x")),
            Err(StateError::TypeMismatch { .. })
        ));
        for index in ["items.00", "items.99999999999999999999999"] {
            assert!(matches!(
                state.store(index, Value::from(1)),
                Err(StateError::UnknownPath { .. })
            ));
        }
        assert_eq!(state.snapshot(), before);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn null_leaf_infers_type() {
        let state = sample();
        state.store("user.nickname", Value::from("true")).unwrap();
        assert_eq!(state.retrieve("user.nickname"), Ok(Value::Bool(true)));
    }

    #[test]
    fn path_exists_never_fails() {
        let state = sample();
        assert!(state.path_exists("user.name"));
        assert!(state.path_exists("items.1"));
        assert!(state.path_exists("items.length"));
        assert!(!state.path_exists("items.length.x"));
        assert!(!state.path_exists("items.2"));
        assert!(!state.path_exists(""));
        assert!(!state.path_exists("1x"));
    }

    #[test]
    fn dropped_subscription_stops_notifications() {
        let state = sample();
        let (sub, log) = recorder(&state);
        state.set_path("user.name", "Bob").unwrap();
        drop(sub);
        state.set_path("user.name", "Carol").unwrap();
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(state.listener_count(), 0);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let state = sample();
        let order = Rc::new(RefCell::new(Vec::new()));
        let a = Rc::clone(&order);
        let _s1 = state.subscribe(move |_| a.borrow_mut().push(1));
        let b = Rc::clone(&order);
        let _s2 = state.subscribe(move |_| b.borrow_mut().push(2));
        state.set_path("user.age", 30).unwrap();
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn listener_may_write_reentrantly() {
        let state = sample();
        let handle = state.clone();
        let _sub = state.subscribe(move |change| {
            if change.path == "user.name" {
                handle.set_path("user.admin", true).unwrap();
            }
        });
        let (_rec, log) = recorder(&state);

        state.set_path("user.name", "Root").unwrap();
        assert_eq!(state.retrieve("user.admin"), Ok(Value::Bool(true)));
        let paths: Vec<_> = log.borrow().iter().map(|c| c.path.clone()).collect();
        // The nested write is delivered before the outer one reaches later listeners.
        assert_eq!(paths, vec!["user.admin", "user.name"]);
    }

    #[test]
    fn node_requires_composite() {
        let state = sample();
        assert!(state.node("user").is_ok());
        assert!(matches!(
            state.node("user.name"),
            Err(StateError::TypeMismatch { .. })
        ));
    }
}
