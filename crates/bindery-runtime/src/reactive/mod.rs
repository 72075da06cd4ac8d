#![forbid(unsafe_code)]

//! Observable state tree.
//!
//! - [`ObservableState`]: shared handle over a [`Value`](bindery_core::Value)
//!   tree. Path-addressed reads and writes, coercing `store`, and change
//!   subscription.
//! - [`Node`]: wrapper handle for one composite position in the tree. Reads
//!   and writes through a node are observable exactly like path writes.
//! - [`Subscription`]: RAII guard that detaches its listener on drop.
//! - [`Change`]: one notification, `(path, old, new)`.
//!
//! # Architecture
//!
//! `ObservableState` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. A `Node` is a lightweight `(state, segments)` pair built lazily
//! on descent; it owns its path, not the data, so it always addresses the
//! position it was created for. Listeners are stored as `Weak` function
//! pointers and cleaned up lazily during notification.
//!
//! # Invariants
//!
//! 1. The version increments exactly once per mutation that changes a value.
//! 2. Listeners are notified synchronously, in registration order, once per
//!    effective mutation.
//! 3. Writing a value structurally equal to the current one is a no-op (no
//!    version bump, no notification).
//! 4. No internal borrow is held while listeners run, so a listener may read
//!    or write the state re-entrantly.
//! 5. A failed write leaves the tree untouched and notifies nobody.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Malformed path | Syntax error | `StateError::InvalidPath` |
//! | Missing segment | Path not in tree | `StateError::UnknownPath` |
//! | Bad cast | Scalar into composite leaf | `StateError::TypeMismatch` |
//! | Listener re-entrancy loop | Mutually re-triggering listeners | Not detected; callers must avoid it |

pub mod node;
pub mod observable;

pub use node::Node;
pub use observable::{Change, ObservableState, Subscription};
