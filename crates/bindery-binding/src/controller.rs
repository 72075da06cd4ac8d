#![forbid(unsafe_code)]

//! Binding sessions.
//!
//! A [`BindingController`] ties one [`ObservableState`] to one scope element
//! of a document:
//!
//! ```text
//!   state change ──▶ apply(Some(path)) ──▶ loops, reads, binds, classes
//!        ▲
//!        │ store
//!   commit / click ◀── EventRegistry (input|change, click)
//! ```
//!
//! # Lifecycle
//!
//! `build()` resolves the scope, subscribes to state changes, installs the
//! delegated event handlers, runs one full apply pass, and moves the session
//! from [`Phase::Constructed`] to [`Phase::Listening`].
//!
//! The event registry keeps the session alive: dropping the controller does
//! not stop binding while the registry still holds the handlers. Call
//! [`BindingController::detach`] to remove them.
//!
//! # Failure Modes
//!
//! | Failure | When | Behavior |
//! |---------|------|----------|
//! | `InvalidSelector` | `build()` | no session is created |
//! | `ScopeNotFound` | `build()` | no session is created |
//! | any per-element error | apply, commit, click | logged, collected, pass continues |

use std::fmt;
use std::rc::{Rc, Weak};

use bindery_dom::{
    Document, DomEvent, ElementId, EventKind, EventRegistry, ListenerId, Selector, SharedDocument,
};
use bindery_runtime::{Change, ObservableState};

use crate::convert::{Converter, Converters};
use crate::error::BindingError;
use crate::options::BindingOptions;
use crate::report::ApplyReport;
use crate::session::{Phase, Session};

/// Builder for [`BindingController`].
#[must_use]
pub struct BindingBuilder {
    scope: String,
    state: ObservableState,
    options: BindingOptions,
    converters: Converters,
}

impl BindingBuilder {
    pub fn options(mut self, options: BindingOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a converter. Converters are tried in registration order.
    pub fn converter(mut self, converter: Converter) -> Self {
        self.converters.push(converter);
        self
    }

    /// Resolve the scope in `document`, install handlers on `registry`, and
    /// run the initial full apply pass.
    pub fn build(
        self,
        document: SharedDocument,
        registry: &EventRegistry,
    ) -> Result<BindingController, BindingError> {
        let selector = Selector::parse(&self.scope)?;
        let scope = {
            let doc = document.borrow();
            doc.query(doc.root(), &selector)
        }
        .ok_or_else(|| BindingError::ScopeNotFound {
            selector: self.scope.clone(),
        })?;

        let state = self.state;
        let session = Rc::new_cyclic(|weak: &Weak<Session>| {
            let weak = weak.clone();
            let subscription = state.subscribe(move |change: &Change| {
                // Runs in every phase: converter writes made during the
                // initial pass queue behind it.
                if let Some(session) = weak.upgrade() {
                    session.apply(Some(&change.path));
                }
            });
            Session::new(
                state.clone(),
                document,
                scope,
                self.options,
                self.converters,
                subscription,
            )
        });

        let names = &session.options.attributes;
        let commit_kind = if session.options.immediate {
            EventKind::Input
        } else {
            EventKind::Change
        };
        let handler = Rc::clone(&session);
        let commit = registry.listen(
            commit_kind,
            scope,
            Selector::any_attribute(&[names.bind.as_str(), names.write.as_str()]),
            move |event: &DomEvent, el: ElementId| {
                // Failures are logged by the session.
                let _ = handler.commit(el);
                handler.settle(event);
            },
        );
        let handler = Rc::clone(&session);
        let click = registry.listen(
            EventKind::Click,
            scope,
            Selector::has_attribute(&names.click),
            move |event: &DomEvent, el: ElementId| {
                let _ = handler.click(el);
                handler.settle(event);
            },
        );

        let report = session.apply(None);
        session.phase.set(Phase::Listening);
        tracing::debug!(
            scope = %scope,
            selector = %self.scope,
            commit_on = %commit_kind,
            errors = report.errors.len(),
            "binding session listening"
        );

        Ok(BindingController {
            session,
            registry: registry.clone(),
            listeners: [commit, click],
        })
    }
}

impl fmt::Debug for BindingBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingBuilder")
            .field("scope", &self.scope)
            .field("options", &self.options)
            .field("converters", &self.converters)
            .finish_non_exhaustive()
    }
}

impl Session {
    fn settle(&self, event: &DomEvent) {
        if self.options.stop_events {
            event.prevent_default();
            event.stop_propagation();
        }
    }
}

/// A live binding between a state tree and one scope element.
pub struct BindingController {
    session: Rc<Session>,
    registry: EventRegistry,
    listeners: [ListenerId; 2],
}

impl BindingController {
    /// Start building a session bound to the first element matching `scope`.
    pub fn builder(scope: impl Into<String>, state: impl Into<ObservableState>) -> BindingBuilder {
        BindingBuilder {
            scope: scope.into(),
            state: state.into(),
            options: BindingOptions::default(),
            converters: Converters::default(),
        }
    }

    /// Another handle to the bound state.
    #[must_use]
    pub fn state(&self) -> ObservableState {
        self.session.state.clone()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.session.phase.get()
    }

    /// The resolved scope element.
    #[must_use]
    pub fn scope(&self) -> ElementId {
        self.session.scope
    }

    #[must_use]
    pub fn options(&self) -> &BindingOptions {
        &self.session.options
    }

    #[must_use]
    pub fn document(&self) -> SharedDocument {
        Rc::clone(&self.session.document)
    }

    /// Run an apply pass. `None` applies every element in scope;
    /// `Some(path)` only those whose attribute refers to `path`.
    pub fn apply(&self, changed: Option<&str>) -> ApplyReport {
        self.session.apply(changed)
    }

    /// Report of the most recent apply pass, however it was triggered.
    #[must_use]
    pub fn last_report(&self) -> ApplyReport {
        self.session.last_report()
    }

    /// Write the value of the bound element at or above `el` into state,
    /// as a `change` (or `input`) event would.
    pub fn commit(&self, el: ElementId) -> Result<(), BindingError> {
        self.session.commit(el)
    }

    /// Run the click assignment of the element at or above `el`.
    pub fn click(&self, el: ElementId) -> Result<(), BindingError> {
        self.session.click(el)
    }

    /// Number of loop elements with a captured template.
    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.session.loops.borrow().len()
    }

    /// Remove the event handlers and release the session.
    ///
    /// State changes made afterwards are no longer applied.
    pub fn detach(self) {
        for id in self.listeners {
            self.registry.unlisten(id);
        }
        tracing::debug!(scope = %self.session.scope, "binding session detached");
    }
}

impl fmt::Debug for BindingController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingController")
            .field("session", &self.session)
            .field("listeners", &self.listeners)
            .finish()
    }
}
