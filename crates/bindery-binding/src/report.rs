//! Apply pass outcomes.

use bindery_dom::ElementId;

use crate::error::BindingError;

/// What one apply pass touched.
///
/// Counters count elements that were evaluated, whether or not the document
/// actually changed. Elements filtered out by a scoped pass count as
/// `skipped`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Loop elements reconciled.
    pub loops: usize,
    /// `read` elements written.
    pub reads: usize,
    /// `bind` elements written.
    pub binds: usize,
    /// `active_if` elements toggled.
    pub classes: usize,
    /// Elements not relevant to the changed path.
    pub skipped: usize,
    /// Per-element failures, in the order they happened.
    pub errors: Vec<(ElementId, BindingError)>,
}

impl ApplyReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Elements evaluated, excluding skipped ones.
    #[must_use]
    pub fn touched(&self) -> usize {
        self.loops + self.reads + self.binds + self.classes
    }
}
