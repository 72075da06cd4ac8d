#![forbid(unsafe_code)]

//! Two-way binding sessions for Bindery.
//!
//! A session connects an [`ObservableState`](bindery_runtime::ObservableState)
//! to the elements of one scope in a [`Document`](bindery_dom::Document).
//! Elements opt in through declarative attributes:
//!
//! | Attribute | Direction | Expression |
//! |-----------|-----------|------------|
//! | `data-bind` | both | path |
//! | `data-read` | state to element | path, literal, or comparison |
//! | `data-write` | element to state | path |
//! | `data-click` | element to state, on click | assignment |
//! | `data-active-if` | state to class | path or comparison |
//! | `data-loop` | state to children | `var=arrayPath` |
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use bindery_binding::BindingController;
//! use bindery_core::Value;
//! use bindery_dom::{Document, EventRegistry, FragmentNode, MemoryDocument};
//!
//! let mut doc = MemoryDocument::new();
//! let root = doc.root();
//! let app = doc.append(root, FragmentNode::new("div").attr("id", "app"));
//! let label = doc.append(app, FragmentNode::new("span").attr("data-read", "user.name"));
//! let doc = Rc::new(RefCell::new(doc));
//!
//! let state = Value::object([("user", Value::object([("name", "Ada")]))]);
//! let controller = BindingController::builder("#app", state)
//!     .build(doc.clone(), &EventRegistry::new())
//!     .unwrap();
//! assert_eq!(doc.borrow().text(label), "Ada");
//!
//! controller.state().set_path("user.name", "Grace").unwrap();
//! assert_eq!(doc.borrow().text(label), "Grace");
//! ```

pub mod controller;
pub mod convert;
pub mod error;
mod list;
pub mod options;
pub mod report;
mod session;

pub use controller::{BindingBuilder, BindingController};
pub use convert::{Converter, FromDom, ToDom};
pub use error::BindingError;
pub use options::{AttributeNames, BindingOptions, ConfigError, LoopIndexing};
pub use report::ApplyReport;
pub use session::Phase;
