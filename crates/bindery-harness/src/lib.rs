#![forbid(unsafe_code)]

//! Test harness and reference fixtures for Bindery.
//!
//! [`Fixture`] wires a [`MemoryDocument`], an [`EventRegistry`] and a
//! [`BindingController`] together, and simulates the host events a browser
//! would deliver: typing, committing, toggling and clicking. Helpers panic
//! with a readable message instead of returning errors, since they only run
//! inside tests.
//!
//! [`strategies`] holds the `proptest` strategies shared by the property
//! tests.
//!
//! ```
//! use bindery_core::Value;
//! use bindery_dom::FragmentNode;
//! use bindery_harness::Fixture;
//!
//! let fx = Fixture::builder()
//!     .state(Value::object([("name", "Alice")]))
//!     .node(FragmentNode::new("input").attr("data-bind", "name"))
//!     .build();
//! let input = fx.find("[data-bind]");
//! fx.change(input, "Bob");
//! assert_eq!(fx.get("name"), Value::from("Bob"));
//! ```

pub mod strategies;

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use bindery_binding::{BindingController, BindingOptions, Converter};
use bindery_core::{PathLookup, Value};
use bindery_dom::{
    Document, DomEvent, ElementId, EventKind, EventRegistry, FragmentNode, MemoryDocument, Selector,
};
use bindery_runtime::ObservableState;

/// Id of the scope element every fixture creates.
pub const SCOPE_ID: &str = "app";

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`Fixture`].
#[derive(Default)]
#[must_use]
pub struct FixtureBuilder {
    state: Option<ObservableState>,
    nodes: Vec<FragmentNode>,
    outside: Vec<FragmentNode>,
    options: BindingOptions,
    converters: Vec<Converter>,
}

impl FixtureBuilder {
    /// Initial state tree.
    pub fn state(mut self, state: Value) -> Self {
        self.state = Some(ObservableState::new(state));
        self
    }

    /// Bind an existing observable instead of wrapping a fresh tree.
    pub fn observable(mut self, state: ObservableState) -> Self {
        self.state = Some(state);
        self
    }

    /// Initial state tree, as JSON text.
    pub fn json(self, text: &str) -> Self {
        let json: serde_json::Value = serde_json::from_str(text)
            .unwrap_or_else(|e| panic!("fixture state is not valid JSON: {e}\n{text}"));
        self.state(Value::from(json))
    }

    /// Append a node inside the scope element.
    pub fn node(mut self, node: FragmentNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Append a node to the document body, outside the scope element.
    pub fn outside(mut self, node: FragmentNode) -> Self {
        self.outside.push(node);
        self
    }

    pub fn options(mut self, options: BindingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn converter(mut self, converter: Converter) -> Self {
        self.converters.push(converter);
        self
    }

    /// Build the document and start the binding session.
    ///
    /// # Panics
    ///
    /// When the session fails to build.
    pub fn build(self) -> Fixture {
        let mut doc = MemoryDocument::new();
        let body = doc.root();
        let scope = doc.append(body, FragmentNode::new("div").attr("id", SCOPE_ID));
        for node in self.nodes {
            doc.append(scope, node);
        }
        for node in self.outside {
            doc.append(body, node);
        }
        let doc = Rc::new(RefCell::new(doc));
        let registry = EventRegistry::new();

        let state = self
            .state
            .unwrap_or_else(|| ObservableState::new(Value::object(Vec::<(String, Value)>::new())));
        let mut builder = BindingController::builder(format!("#{SCOPE_ID}"), state)
            .options(self.options);
        for converter in self.converters {
            builder = builder.converter(converter);
        }
        let controller = builder
            .build(doc.clone(), &registry)
            .unwrap_or_else(|e| panic!("fixture session failed to build: {e}"));
        tracing::debug!(scope = %scope, "fixture ready");

        Fixture {
            doc,
            registry,
            controller,
            scope,
        }
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// A bound document plus helpers to drive and inspect it.
pub struct Fixture {
    pub doc: Rc<RefCell<MemoryDocument>>,
    pub registry: EventRegistry,
    pub controller: BindingController,
    pub scope: ElementId,
}

impl Fixture {
    pub fn builder() -> FixtureBuilder {
        FixtureBuilder::default()
    }

    #[must_use]
    pub fn state(&self) -> ObservableState {
        self.controller.state()
    }

    /// Value at `path`.
    ///
    /// # Panics
    ///
    /// When `path` does not resolve.
    #[must_use]
    pub fn get(&self, path: &str) -> Value {
        self.state()
            .retrieve(path)
            .unwrap_or_else(|e| panic!("state lookup failed: {e}"))
    }

    /// Write through the observable, as application code would.
    ///
    /// # Panics
    ///
    /// When the write fails.
    pub fn set(&self, path: &str, value: impl Into<Value>) {
        self.state()
            .set_path(path, value)
            .unwrap_or_else(|e| panic!("state write failed: {e}"));
    }

    // -- queries --------------------------------------------------------------

    /// Every element below the scope matching `selector`, in document
    /// order. The scope element itself is never returned.
    #[must_use]
    pub fn find_all(&self, selector: &str) -> Vec<ElementId> {
        let selector =
            Selector::parse(selector).unwrap_or_else(|e| panic!("bad selector {selector:?}: {e}"));
        let mut found = self.doc.borrow().query_all(self.scope, &selector);
        found.retain(|&el| el != self.scope);
        found
    }

    /// The first element in the scope matching `selector`.
    ///
    /// # Panics
    ///
    /// When nothing matches.
    #[must_use]
    pub fn find(&self, selector: &str) -> ElementId {
        self.find_all(selector)
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("no element matches {selector:?}\n{}", self.markup()))
    }

    /// The first body element outside the scope matching `selector`.
    #[must_use]
    pub fn find_outside(&self, selector: &str) -> ElementId {
        let parsed =
            Selector::parse(selector).unwrap_or_else(|e| panic!("bad selector {selector:?}: {e}"));
        let doc = self.doc.borrow();
        doc.query_all(doc.root(), &parsed)
            .into_iter()
            .find(|&el| !doc.contains(self.scope, el))
            .unwrap_or_else(|| panic!("no element outside the scope matches {selector:?}"))
    }

    #[must_use]
    pub fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.doc.borrow().children(el)
    }

    #[must_use]
    pub fn text(&self, el: ElementId) -> String {
        self.doc.borrow().text(el)
    }

    #[must_use]
    pub fn value(&self, el: ElementId) -> Option<String> {
        self.doc.borrow().value(el)
    }

    #[must_use]
    pub fn checked(&self, el: ElementId) -> bool {
        self.doc.borrow().checked(el)
    }

    #[must_use]
    pub fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.doc.borrow().attribute(el, name)
    }

    #[must_use]
    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.doc.borrow().has_class(el, class)
    }

    /// Markup of the scope element.
    #[must_use]
    pub fn markup(&self) -> String {
        self.doc.borrow().to_markup(self.scope)
    }

    /// Fingerprint of everything visible in the scope: markup plus the form
    /// value and checked state of every element.
    #[must_use]
    pub fn digest(&self) -> String {
        let doc = self.doc.borrow();
        let mut text = doc.to_markup(self.scope);
        for el in doc.descendants(self.scope) {
            let _ = write!(text, "\n{el}:{:?}:{}", doc.value(el), doc.checked(el));
        }
        blake3::hash(text.as_bytes()).to_hex().to_string()
    }

    // -- host events ----------------------------------------------------------

    /// Deliver an event. Returns it so callers can inspect its flags.
    pub fn dispatch(&self, kind: EventKind, target: ElementId) -> DomEvent {
        let event = DomEvent::new(kind, target);
        self.registry.dispatch(&*self.doc, &event);
        event
    }

    /// Type `text` into `el` and deliver an `input` event.
    pub fn input(&self, el: ElementId, text: &str) -> DomEvent {
        self.doc.borrow_mut().set_value(el, text);
        self.dispatch(EventKind::Input, el)
    }

    /// Replace the value of `el` with `text` and deliver a `change` event.
    pub fn change(&self, el: ElementId, text: &str) -> DomEvent {
        self.doc.borrow_mut().set_value(el, text);
        self.dispatch(EventKind::Change, el)
    }

    /// Flip a checkbox and deliver a `change` event.
    pub fn toggle(&self, el: ElementId) -> DomEvent {
        {
            let mut doc = self.doc.borrow_mut();
            let checked = doc.checked(el);
            doc.set_checked(el, !checked);
        }
        self.dispatch(EventKind::Change, el)
    }

    pub fn click(&self, el: ElementId) -> DomEvent {
        self.dispatch(EventKind::Click, el)
    }
}

impl std::fmt::Debug for Fixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fixture")
            .field("scope", &self.scope)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}
