#![forbid(unsafe_code)]

//! The document surface Bindery drives.
//!
//! The binding engine never renders anything itself. It talks to a host
//! document through the [`Document`] trait: query elements inside a scope,
//! read and write attributes, toggle classes, move values in and out of
//! form controls, and stamp out detached [`Fragment`] templates. Delegated
//! event handling goes through an explicit [`EventRegistry`] instead of
//! document-global listeners.
//!
//! [`MemoryDocument`] is a complete headless implementation, used by tests
//! and by hosts that render elsewhere.

pub mod document;
pub mod events;
pub mod fragment;
pub mod memory;
pub mod selector;

pub use document::{Document, ElementId, SharedDocument};
pub use events::{DomEvent, EventKind, EventRegistry, ListenerId};
pub use fragment::{Fragment, FragmentNode};
pub use memory::MemoryDocument;
pub use selector::{Selector, SelectorError};
