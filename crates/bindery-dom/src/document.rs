#![forbid(unsafe_code)]

//! The [`Document`] capability trait.
//!
//! The binding engine needs a narrow slice of what a browser document offers.
//! Implementors supply the primitives; tree queries, selector matching, and
//! class list handling are provided on top of them.
//!
//! # Invariants
//!
//! 1. [`Document::descendants`] and [`Document::query_all`] yield elements in
//!    document order (pre-order, children left to right).
//! 2. Query scopes are ancestor-or-self: the scope element itself is a
//!    candidate for its own queries.
//! 3. Element ids stay valid for the lifetime of the document. A detached
//!    element keeps its id and answers queries as a root of its own tree.
//!
//! # Failure Modes
//!
//! - Ids from another document are not detected; the result is unspecified
//!   but never a panic in [`MemoryDocument`](crate::MemoryDocument).
//! - `set_value` and `set_text` report `false` for elements that have no
//!   such property instead of failing.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::fragment::Fragment;
use crate::selector::Selector;

/// Handle to one element of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    /// Get the raw id value.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A document shared between a binding session and its event handlers.
pub type SharedDocument = Rc<RefCell<dyn Document>>;

/// Host document operations used by the binding engine.
pub trait Document {
    // -- tree ---------------------------------------------------------------

    /// The document's top element.
    fn root(&self) -> ElementId;

    /// Parent of `el`, or `None` for the root and detached elements.
    fn parent(&self, el: ElementId) -> Option<ElementId>;

    /// Children of `el` in order.
    fn children(&self, el: ElementId) -> Vec<ElementId>;

    /// Lowercase tag name.
    fn tag_name(&self, el: ElementId) -> &str;

    // -- attributes -----------------------------------------------------------

    fn attribute(&self, el: ElementId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str);

    // -- form state -----------------------------------------------------------

    /// Current `checked` state. Meaningful for checkboxes only.
    fn checked(&self, el: ElementId) -> bool;

    fn set_checked(&mut self, el: ElementId, checked: bool);

    /// Current form value, or `None` when the element has no value property.
    fn value(&self, el: ElementId) -> Option<String>;

    /// Write the form value. Returns `false` when the element has no value
    /// property.
    fn set_value(&mut self, el: ElementId, value: &str) -> bool;

    // -- content --------------------------------------------------------------

    /// Concatenated text of `el` and its descendants.
    fn text(&self, el: ElementId) -> String;

    /// Replace the content of `el` with text. Returns `false` for elements
    /// that cannot hold content.
    fn set_text(&mut self, el: ElementId, text: &str) -> bool;

    /// Detached copy of the children of `el`, as markup.
    fn capture(&self, el: ElementId) -> Fragment;

    /// Instantiate `fragment` as the last children of `parent`. Returns the
    /// new top-level elements.
    fn append_fragment(&mut self, parent: ElementId, fragment: &Fragment) -> Vec<ElementId>;

    /// Detach every child of `el` from index `keep` on.
    fn truncate_children(&mut self, el: ElementId, keep: usize);

    // -- provided -------------------------------------------------------------

    fn child_count(&self, el: ElementId) -> usize {
        self.children(el).len()
    }

    /// All descendants of `el`, excluding `el`, in document order.
    fn descendants(&self, el: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(el).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Whether `el` is `ancestor` or lies below it.
    fn contains(&self, ancestor: ElementId, el: ElementId) -> bool {
        let mut current = Some(el);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    fn matches(&self, el: ElementId, selector: &Selector) -> bool {
        selector.matches(self, el)
    }

    /// Elements matching `selector` within `scope`, including `scope` itself.
    fn query_all(&self, scope: ElementId, selector: &Selector) -> Vec<ElementId> {
        std::iter::once(scope)
            .chain(self.descendants(scope))
            .filter(|&el| selector.matches(self, el))
            .collect()
    }

    /// First element matching `selector` within `scope`.
    fn query(&self, scope: ElementId, selector: &Selector) -> Option<ElementId> {
        self.query_all(scope, selector).into_iter().next()
    }

    /// Nearest ancestor-or-self of `el` matching `selector`, stopping at
    /// `scope`. `None` when `el` is outside `scope`.
    fn closest(&self, el: ElementId, selector: &Selector, scope: ElementId) -> Option<ElementId> {
        if !self.contains(scope, el) {
            return None;
        }
        let mut current = Some(el);
        while let Some(node) = current {
            if selector.matches(self, node) {
                return Some(node);
            }
            if node == scope {
                break;
            }
            current = self.parent(node);
        }
        None
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.attribute(el, "class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }

    /// Add `class` when `on`, remove it otherwise. Returns whether the class
    /// list changed.
    fn toggle_class(&mut self, el: ElementId, class: &str, on: bool) -> bool {
        if self.has_class(el, class) == on {
            return false;
        }
        let list = self.attribute(el, "class").unwrap_or_default();
        let mut classes: Vec<&str> = list
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect();
        if on {
            classes.push(class);
        }
        let joined = classes.join(" ");
        self.set_attribute(el, "class", &joined);
        true
    }

    /// `<input type="checkbox">`.
    fn is_checkbox(&self, el: ElementId) -> bool {
        self.tag_name(el) == "input"
            && self
                .attribute(el, "type")
                .is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
    }
}
