#![forbid(unsafe_code)]

//! Bindery public facade.
//!
//! Declarative two-way data binding between an observable state tree and a
//! document. Each component lives in its own crate and is re-exported here:
//!
//! | Module | Crate | Contents |
//! |--------|-------|----------|
//! | [`model`] | `bindery-core` | `Value`, paths, coercion |
//! | [`runtime`] | `bindery-runtime` | `ObservableState`, `Node`, change notification |
//! | [`expr`] | `bindery-expr` | attribute expressions |
//! | [`dom`] | `bindery-dom` | `Document`, selectors, events, `MemoryDocument` |
//! | [`binding`] | `bindery-binding` | `BindingController` and options |
//!
//! Most applications only need the [`prelude`].
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use bindery::prelude::*;
//!
//! let mut doc = MemoryDocument::new();
//! let root = doc.root();
//! let app = doc.append(root, FragmentNode::new("form").attr("id", "signup"));
//! let age = doc.append(app, FragmentNode::new("input").attr("data-bind", "age"));
//! let badge = doc.append(app, FragmentNode::new("b").attr("data-active-if", "age>=18"));
//! let doc = Rc::new(RefCell::new(doc));
//! let registry = EventRegistry::new();
//!
//! let controller = BindingController::builder("#signup", Value::object([("age", 16)]))
//!     .build(doc.clone(), &registry)
//!     .unwrap();
//! assert!(!doc.borrow().has_class(badge, "active"));
//!
//! doc.borrow_mut().set_value(age, "21");
//! registry.dispatch(&*doc, &DomEvent::new(EventKind::Change, age));
//! assert_eq!(controller.state().retrieve("age").unwrap(), Value::from(21));
//! assert!(doc.borrow().has_class(badge, "active"));
//! ```

pub use bindery_binding as binding;
pub use bindery_core as model;
pub use bindery_dom as dom;
pub use bindery_expr as expr;
pub use bindery_runtime as runtime;

pub use bindery_binding::{BindingController, BindingError, BindingOptions};
pub use bindery_core::{StateError, Value};
pub use bindery_runtime::ObservableState;

/// Everything needed to bind a document.
pub mod prelude {
    pub use bindery_binding::{
        ApplyReport, AttributeNames, BindingController, BindingError, BindingOptions, Converter,
        LoopIndexing, Phase,
    };
    pub use bindery_core::{PathLookup, StateError, Value};
    pub use bindery_dom::{
        Document, DomEvent, ElementId, EventKind, EventRegistry, FragmentNode, MemoryDocument,
        Selector, SharedDocument,
    };
    pub use bindery_expr::{Expression, ExpressionKind};
    pub use bindery_runtime::{Change, Node, ObservableState, Subscription};
}
