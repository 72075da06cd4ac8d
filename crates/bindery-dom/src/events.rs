#![forbid(unsafe_code)]

//! Delegated event registry.
//!
//! Instead of one listener per element, a binding session registers one
//! handler per event category for its scope, together with a selector. On
//! dispatch the registry finds, for each registration, the closest element
//! between the event target and the scope root that matches the selector,
//! and hands that element to the handler. Elements added or removed later
//! need no (un)registration.
//!
//! # Invariants
//!
//! 1. Handlers run in registration order.
//! 2. No registry or document borrow is held while a handler runs, so
//!    handlers may mutate the document, register listeners, or dispatch
//!    further events.
//! 3. A handler that calls [`DomEvent::stop_propagation`] ends the dispatch;
//!    later registrations are not consulted.
//! 4. Registrations added during a dispatch do not see that dispatch.
//!
//! # Failure Modes
//!
//! - Targets outside every registered scope: dispatch invokes nothing and
//!   returns `0`.
//! - `unlisten` with an unknown id returns `false`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::document::{Document, ElementId};
use crate::selector::Selector;

/// Event categories the binding engine listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Value changed on every keystroke.
    Input,
    /// Value committed (blur, enter, checkbox toggle).
    Change,
    Click,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Change => "change",
            Self::Click => "click",
        })
    }
}

/// An event travelling through the registry.
#[derive(Debug)]
pub struct DomEvent {
    kind: EventKind,
    target: ElementId,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl DomEvent {
    #[must_use]
    pub fn new(kind: EventKind, target: ElementId) -> Self {
        Self {
            kind,
            target,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The element the event originated from.
    #[must_use]
    pub fn target(&self) -> ElementId {
        self.target
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// Handle for removing a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler = Rc<dyn Fn(&DomEvent, ElementId)>;

struct Registration {
    id: ListenerId,
    kind: EventKind,
    scope: ElementId,
    selector: Selector,
    handler: Handler,
}

#[derive(Default)]
struct Inner {
    registrations: RefCell<Vec<Registration>>,
    next_id: Cell<u64>,
}

/// Ordered `(kind, scope) -> [(selector, handler)]` registry.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct EventRegistry {
    inner: Rc<Inner>,
}

impl EventRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind` whose target lies within
    /// `scope` and has an ancestor-or-self matching `selector`.
    pub fn listen(
        &self,
        kind: EventKind,
        scope: ElementId,
        selector: Selector,
        handler: impl Fn(&DomEvent, ElementId) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.registrations.borrow_mut().push(Registration {
            id,
            kind,
            scope,
            selector,
            handler: Rc::new(handler),
        });
        id
    }

    /// Remove a registration. Returns whether it existed.
    pub fn unlisten(&self, id: ListenerId) -> bool {
        let mut registrations = self.inner.registrations.borrow_mut();
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        registrations.len() != before
    }

    /// Registrations for `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner
            .registrations
            .borrow()
            .iter()
            .filter(|r| r.kind == kind)
            .count()
    }

    /// Deliver `event`. Returns the number of handlers invoked.
    pub fn dispatch<D: Document + ?Sized>(&self, document: &RefCell<D>, event: &DomEvent) -> usize {
        let candidates: Vec<(ElementId, Selector, Handler)> = self
            .inner
            .registrations
            .borrow()
            .iter()
            .filter(|r| r.kind == event.kind())
            .map(|r| (r.scope, r.selector.clone(), Rc::clone(&r.handler)))
            .collect();

        let mut invoked = 0;
        for (scope, selector, handler) in candidates {
            let matched = document
                .borrow()
                .closest(event.target(), &selector, scope);
            let Some(element) = matched else { continue };
            #[cfg(feature = "tracing")]
            tracing::trace!(
                kind = %event.kind(),
                target = %event.target(),
                element = %element,
                selector = %selector,
                "dispatching event"
            );
            handler(event, element);
            invoked += 1;
            if event.propagation_stopped() {
                break;
            }
        }
        invoked
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("registrations", &self.inner.registrations.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::FragmentNode;
    use crate::memory::MemoryDocument;
    use pretty_assertions::assert_eq;

    struct Fixture {
        doc: Rc<RefCell<MemoryDocument>>,
        scope: ElementId,
        button_label: ElementId,
        outside: ElementId,
    }

    fn fixture() -> Fixture {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let scope = doc.append(
            root,
            FragmentNode::new("div").attr("id", "app").child(
                FragmentNode::new("button")
                    .attr("data-click", "role=admin")
                    .child(FragmentNode::new("span").text("Admin")),
            ),
        );
        let outside = doc.append(root, FragmentNode::new("button").attr("data-click", "x=1"));
        let button = doc.children(scope)[0];
        let button_label = doc.children(button)[0];
        Fixture {
            doc: Rc::new(RefCell::new(doc)),
            scope,
            button_label,
            outside,
        }
    }

    fn recorder() -> (Rc<RefCell<Vec<ElementId>>>, impl Fn(&DomEvent, ElementId) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |_: &DomEvent, el: ElementId| sink.borrow_mut().push(el))
    }

    #[test]
    fn delegates_to_closest_match() {
        let fx = fixture();
        let registry = EventRegistry::new();
        let (log, handler) = recorder();
        registry.listen(
            EventKind::Click,
            fx.scope,
            Selector::has_attribute("data-click"),
            handler,
        );

        let event = DomEvent::new(EventKind::Click, fx.button_label);
        assert_eq!(registry.dispatch(&fx.doc, &event), 1);
        let button = fx.doc.borrow().parent(fx.button_label).unwrap();
        assert_eq!(*log.borrow(), vec![button]);
    }

    #[test]
    fn ignores_targets_outside_scope_and_other_kinds() {
        let fx = fixture();
        let registry = EventRegistry::new();
        let (log, handler) = recorder();
        registry.listen(
            EventKind::Click,
            fx.scope,
            Selector::has_attribute("data-click"),
            handler,
        );
        assert_eq!(
            registry.dispatch(&fx.doc, &DomEvent::new(EventKind::Click, fx.outside)),
            0
        );
        assert_eq!(
            registry.dispatch(&fx.doc, &DomEvent::new(EventKind::Change, fx.button_label)),
            0
        );
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn stop_propagation_ends_dispatch() {
        let fx = fixture();
        let registry = EventRegistry::new();
        let (log, handler) = recorder();
        registry.listen(EventKind::Click, fx.scope, Selector::parse("button").unwrap(), |e, _| {
            e.prevent_default();
            e.stop_propagation();
        });
        registry.listen(EventKind::Click, fx.scope, Selector::parse("button").unwrap(), handler);

        let event = DomEvent::new(EventKind::Click, fx.button_label);
        assert_eq!(registry.dispatch(&fx.doc, &event), 1);
        assert!(event.default_prevented());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn handlers_may_mutate_document_and_registry() {
        let fx = fixture();
        let registry = EventRegistry::new();
        let doc = Rc::clone(&fx.doc);
        let inner = registry.clone();
        let scope = fx.scope;
        registry.listen(EventKind::Click, fx.scope, Selector::parse("button").unwrap(), move |_, el| {
            doc.borrow_mut().set_attribute(el, "data-clicked", "yes");
            inner.listen(EventKind::Click, scope, Selector::parse("span").unwrap(), |_, _| {});
        });

        let event = DomEvent::new(EventKind::Click, fx.button_label);
        assert_eq!(registry.dispatch(&fx.doc, &event), 1);
        assert_eq!(registry.listener_count(EventKind::Click), 2);
        let button = fx.doc.borrow().parent(fx.button_label).unwrap();
        assert_eq!(
            fx.doc.borrow().attribute(button, "data-clicked").as_deref(),
            Some("yes")
        );
    }

    #[test]
    fn unlisten_removes_registration() {
        let fx = fixture();
        let registry = EventRegistry::new();
        let id = registry.listen(EventKind::Input, fx.scope, Selector::parse("*").unwrap(), |_, _| {});
        assert!(registry.unlisten(id));
        assert!(!registry.unlisten(id));
        assert_eq!(registry.listener_count(EventKind::Input), 0);
    }

    #[test]
    fn dispatch_through_shared_trait_object() {
        let fx = fixture();
        let shared: crate::SharedDocument = fx.doc.clone();
        let registry = EventRegistry::new();
        let (log, handler) = recorder();
        registry.listen(EventKind::Click, fx.scope, Selector::parse("span").unwrap(), handler);
        registry.dispatch(&*shared, &DomEvent::new(EventKind::Click, fx.button_label));
        assert_eq!(*log.borrow(), vec![fx.button_label]);
    }
}
