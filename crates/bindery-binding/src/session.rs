#![forbid(unsafe_code)]

//! The shared state of one binding session and its apply passes.
//!
//! # Borrow discipline
//!
//! An apply pass holds the document mutably for its whole duration. A
//! converter may still store into state while the pass runs; the resulting
//! notification is queued and drained as further scoped passes once the
//! document is released, in the same call stack. Event handling reads the
//! document, releases it, and only then stores into state; the resulting
//! notification starts a fresh apply pass.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use ahash::{AHashMap, AHashSet};
use bindery_core::Value;
use bindery_dom::{Document, ElementId, Selector, SharedDocument};
use bindery_expr::template::references;
use bindery_expr::{Expression, ExpressionKind, parse};
use bindery_runtime::{ObservableState, Subscription};

use crate::convert::Converters;
use crate::error::BindingError;
use crate::list::LoopState;
use crate::options::BindingOptions;
use crate::report::ApplyReport;

/// Lifecycle of a session. `Constructed -> Listening` is the only
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Built, listeners not yet installed or first pass not yet run.
    Constructed,
    /// Listeners installed and the initial full pass completed.
    Listening,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Constructed => "constructed",
            Self::Listening => "listening",
        })
    }
}

pub(crate) struct Session {
    pub(crate) state: ObservableState,
    pub(crate) document: SharedDocument,
    pub(crate) scope: ElementId,
    pub(crate) options: BindingOptions,
    pub(crate) converters: Converters,
    pub(crate) loops: RefCell<AHashMap<ElementId, LoopState>>,
    pub(crate) phase: Cell<Phase>,
    last_report: RefCell<ApplyReport>,
    applying: Cell<bool>,
    /// Changes that arrived while a pass was running. `None` is a full pass.
    pending: RefCell<VecDeque<Option<String>>>,
    _subscription: Subscription,
}

#[derive(Clone, Copy)]
enum ValueRole {
    Read,
    Bind,
}

/// Log a per-element failure and add it to the report.
pub(crate) fn record(
    report: &mut ApplyReport,
    element: ElementId,
    attribute: &str,
    raw: &str,
    error: BindingError,
) {
    tracing::warn!(element = %element, attribute, raw, error = %error, "binding failed");
    report.errors.push((element, error));
}

/// Whether an element takes part in a pass scoped to `changed`.
pub(crate) fn is_relevant(
    raw: &str,
    changed: Option<&str>,
    element: ElementId,
    fresh: &AHashSet<ElementId>,
) -> bool {
    changed.is_none_or(|path| fresh.contains(&element) || references(raw, path))
}

pub(crate) fn unparseable(attribute: &str, raw: &str, expr: &Expression) -> Option<BindingError> {
    match expr {
        Expression::Unparseable { error, .. } => Some(BindingError::UnparseableExpression {
            attribute: attribute.to_string(),
            raw: raw.to_string(),
            error: *error,
        }),
        _ => None,
    }
}

pub(crate) fn malformed(
    attribute: &str,
    raw: &str,
    expected: ExpressionKind,
    found: &Expression,
) -> BindingError {
    unparseable(attribute, raw, found).unwrap_or_else(|| BindingError::MalformedBindingAttribute {
        attribute: attribute.to_string(),
        raw: raw.to_string(),
        expected,
        found: found.kind(),
    })
}

/// Text written into form values and text content. Nullish values clear.
fn display_text(value: &Value) -> String {
    if value.is_nullish() {
        String::new()
    } else {
        value.to_display_string()
    }
}

impl Session {
    pub(crate) fn new(
        state: ObservableState,
        document: SharedDocument,
        scope: ElementId,
        options: BindingOptions,
        converters: Converters,
        subscription: Subscription,
    ) -> Self {
        Self {
            state,
            document,
            scope,
            options,
            converters,
            loops: RefCell::new(AHashMap::new()),
            phase: Cell::new(Phase::Constructed),
            last_report: RefCell::new(ApplyReport::default()),
            applying: Cell::new(false),
            pending: RefCell::new(VecDeque::new()),
            _subscription: subscription,
        }
    }

    pub(crate) fn last_report(&self) -> ApplyReport {
        self.last_report.borrow().clone()
    }

    // -----------------------------------------------------------------------
    // State -> document
    // -----------------------------------------------------------------------

    /// Run one apply pass, optionally scoped to `changed`, then every pass
    /// queued by state writes made while it ran.
    ///
    /// Called while a pass is already running, the request is queued and an
    /// empty report is returned.
    pub(crate) fn apply(&self, changed: Option<&str>) -> ApplyReport {
        if self.applying.get() {
            tracing::debug!(
                changed = changed.unwrap_or("*"),
                "state changed during apply pass; queued"
            );
            self.pending.borrow_mut().push_back(changed.map(str::to_string));
            return ApplyReport::default();
        }
        self.applying.set(true);
        let report = self.apply_pass(changed);
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(next) = next else { break };
            self.apply_pass(next.as_deref());
        }
        self.applying.set(false);
        report
    }

    fn apply_pass(&self, changed: Option<&str>) -> ApplyReport {
        let span = tracing::debug_span!(
            "apply",
            scope = %self.scope,
            changed = changed.unwrap_or("*"),
        );
        let _entered = span.enter();
        let mut report = ApplyReport::default();
        let Ok(mut guard) = self.document.try_borrow_mut() else {
            tracing::warn!(
                changed = changed.unwrap_or("*"),
                "document is borrowed outside the session; apply pass skipped"
            );
            return report;
        };
        let doc: &mut dyn Document = &mut *guard;

        // Loops first, so materialized instances take part in the same pass.
        let fresh = self.reconcile_loops(doc, changed, &mut report);
        self.apply_values(doc, ValueRole::Read, changed, &fresh, &mut report);
        self.apply_values(doc, ValueRole::Bind, changed, &fresh, &mut report);
        self.apply_classes(doc, changed, &fresh, &mut report);
        drop(guard);

        tracing::debug!(
            loops = report.loops,
            reads = report.reads,
            binds = report.binds,
            classes = report.classes,
            skipped = report.skipped,
            errors = report.errors.len(),
            "apply pass complete"
        );
        *self.last_report.borrow_mut() = report.clone();
        report
    }

    fn apply_values(
        &self,
        doc: &mut dyn Document,
        role: ValueRole,
        changed: Option<&str>,
        fresh: &AHashSet<ElementId>,
        report: &mut ApplyReport,
    ) {
        let names = &self.options.attributes;
        let attribute = match role {
            ValueRole::Read => names.read.as_str(),
            ValueRole::Bind => names.bind.as_str(),
        };
        for el in doc.query_all(self.scope, &Selector::has_attribute(attribute)) {
            let Some(raw) = doc.attribute(el, attribute) else {
                continue;
            };
            if !is_relevant(&raw, changed, el, fresh) {
                report.skipped += 1;
                continue;
            }
            match role {
                ValueRole::Read => report.reads += 1,
                ValueRole::Bind => report.binds += 1,
            }
            let expr = parse(&raw, &self.state);
            let result = match unparseable(attribute, &raw, &expr) {
                Some(error) => Err(error),
                None => self.write_element(doc, el, changed, &expr.value().unwrap_or_default()),
            };
            if let Err(error) = result {
                record(report, el, attribute, &raw, error);
            }
        }
    }

    fn apply_classes(
        &self,
        doc: &mut dyn Document,
        changed: Option<&str>,
        fresh: &AHashSet<ElementId>,
        report: &mut ApplyReport,
    ) {
        let attribute = self.options.attributes.active_if.as_str();
        for el in doc.query_all(self.scope, &Selector::has_attribute(attribute)) {
            let Some(raw) = doc.attribute(el, attribute) else {
                continue;
            };
            if !is_relevant(&raw, changed, el, fresh) {
                report.skipped += 1;
                continue;
            }
            report.classes += 1;
            let expr = parse(&raw, &self.state);
            if let Some(error) = unparseable(attribute, &raw, &expr) {
                record(report, el, attribute, &raw, error);
                continue;
            }
            let on = expr.value().is_some_and(|v| v.truthy());
            doc.toggle_class(el, &self.options.toggle_class, on);
        }
    }

    fn write_element(
        &self,
        doc: &mut dyn Document,
        el: ElementId,
        changed: Option<&str>,
        value: &Value,
    ) -> Result<(), BindingError> {
        if self.converters.inject(changed, value, doc, el) {
            return Ok(());
        }
        if doc.is_checkbox(el) {
            doc.set_checked(el, value.truthy());
            return Ok(());
        }
        let text = display_text(value);
        if doc.set_value(el, &text) || doc.set_text(el, &text) {
            Ok(())
        } else {
            Err(BindingError::NoWritableTarget { element: el })
        }
    }

    // -----------------------------------------------------------------------
    // Document -> state
    // -----------------------------------------------------------------------

    /// Write the value of the bound element at or above `el` into state.
    pub(crate) fn commit(&self, el: ElementId) -> Result<(), BindingError> {
        let names = &self.options.attributes;
        let roles = [names.bind.as_str(), names.write.as_str()];
        let (target, raws) = {
            let doc = self.document.borrow();
            let Some(target) = doc.closest(el, &Selector::any_attribute(&roles), self.scope) else {
                return Ok(());
            };
            (target, roles.map(|attribute| doc.attribute(target, attribute)))
        };

        let mut outcome = Ok(());
        for (attribute, raw) in roles.into_iter().zip(raws) {
            let Some(raw) = raw else { continue };
            if let Err(error) = self.write_back(target, attribute, &raw) {
                tracing::warn!(
                    element = %target,
                    attribute,
                    raw = %raw,
                    error = %error,
                    "could not write element value to state"
                );
                if outcome.is_ok() {
                    outcome = Err(error);
                }
            }
        }
        outcome
    }

    fn write_back(&self, el: ElementId, attribute: &str, raw: &str) -> Result<(), BindingError> {
        let expr = parse(raw, &self.state);
        let Expression::Path { path, .. } = &expr else {
            return Err(malformed(attribute, raw, ExpressionKind::Path, &expr));
        };
        let value = {
            let doc = self.document.borrow();
            self.extract(&*doc, path, el)?
        };
        self.state.store(path, value)?;
        Ok(())
    }

    fn extract(&self, doc: &dyn Document, path: &str, el: ElementId) -> Result<Value, BindingError> {
        if let Some(value) = self.converters.extract(path, doc, el) {
            return Ok(value);
        }
        if doc.is_checkbox(el) {
            return Ok(Value::Bool(doc.checked(el)));
        }
        doc.value(el)
            .map(Value::String)
            .ok_or(BindingError::NoExtractableValue { element: el })
    }

    /// Run the click assignment of the element at or above `el`.
    pub(crate) fn click(&self, el: ElementId) -> Result<(), BindingError> {
        let attribute = self.options.attributes.click.as_str();
        let found = {
            let doc = self.document.borrow();
            doc.closest(el, &Selector::has_attribute(attribute), self.scope)
                .and_then(|target| doc.attribute(target, attribute).map(|raw| (target, raw)))
        };
        let Some((target, raw)) = found else {
            return Ok(());
        };
        let result = self.assign(attribute, &raw);
        if let Err(error) = &result {
            tracing::warn!(
                element = %target,
                attribute,
                raw = %raw,
                error = %error,
                "click assignment failed"
            );
        }
        result
    }

    fn assign(&self, attribute: &str, raw: &str) -> Result<(), BindingError> {
        match parse(raw, &self.state) {
            Expression::Assignment { assignee, assigned } => {
                self.state
                    .store(&assignee, assigned.value().unwrap_or_default())?;
                Ok(())
            }
            other => Err(malformed(attribute, raw, ExpressionKind::Assignment, &other)),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("scope", &self.scope)
            .field("phase", &self.phase.get())
            .field("loops", &self.loops.borrow().len())
            .field("converters", &self.converters)
            .finish_non_exhaustive()
    }
}
