//! Per-selector value conversion.
//!
//! A [`Converter`] overrides how values move between the state tree and
//! elements matching its selector. Converters are tried in registration
//! order; the first whose selector matches and that has a function for the
//! direction at hand wins. Elements with no matching converter fall back to
//! checkbox state, then the form value, then (when writing) text content.

use std::fmt;

use bindery_core::Value;
use bindery_dom::{Document, ElementId, Selector, SelectorError};

/// Reads a state value from an element. Receives the target state path.
pub type FromDom = Box<dyn Fn(&str, &dyn Document, ElementId) -> Value>;

/// Writes a state value into an element. Receives the changed path of the
/// apply pass, or `None` for a full pass.
pub type ToDom = Box<dyn Fn(Option<&str>, &Value, &mut dyn Document, ElementId)>;

/// Custom conversion for elements matching a selector.
pub struct Converter {
    selector: Selector,
    from_dom: Option<FromDom>,
    to_dom: Option<ToDom>,
}

impl Converter {
    /// A converter with no functions yet.
    pub fn new(selector: &str) -> Result<Self, SelectorError> {
        Ok(Self::for_selector(Selector::parse(selector)?))
    }

    #[must_use]
    pub fn for_selector(selector: Selector) -> Self {
        Self {
            selector,
            from_dom: None,
            to_dom: None,
        }
    }

    /// Set the element-to-state function.
    #[must_use]
    pub fn from_dom(
        mut self,
        f: impl Fn(&str, &dyn Document, ElementId) -> Value + 'static,
    ) -> Self {
        self.from_dom = Some(Box::new(f));
        self
    }

    /// Set the state-to-element function.
    #[must_use]
    pub fn to_dom(
        mut self,
        f: impl Fn(Option<&str>, &Value, &mut dyn Document, ElementId) + 'static,
    ) -> Self {
        self.to_dom = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("selector", &self.selector.as_str())
            .field("from_dom", &self.from_dom.is_some())
            .field("to_dom", &self.to_dom.is_some())
            .finish()
    }
}

/// Ordered converter list.
#[derive(Debug, Default)]
pub(crate) struct Converters(Vec<Converter>);

impl Converters {
    pub(crate) fn push(&mut self, converter: Converter) {
        self.0.push(converter);
    }

    /// Value read through the first matching `from_dom`, if any.
    pub(crate) fn extract(&self, path: &str, doc: &dyn Document, el: ElementId) -> Option<Value> {
        self.0
            .iter()
            .find_map(|c| c.from_dom.as_ref().filter(|_| c.selector.matches(doc, el)))
            .map(|f| f(path, doc, el))
    }

    /// Write through the first matching `to_dom`. Returns whether one ran.
    pub(crate) fn inject(
        &self,
        changed: Option<&str>,
        value: &Value,
        doc: &mut dyn Document,
        el: ElementId,
    ) -> bool {
        let found = self
            .0
            .iter()
            .find_map(|c| c.to_dom.as_ref().filter(|_| c.selector.matches(&*doc, el)));
        match found {
            Some(f) => {
                f(changed, value, doc, el);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_dom::{FragmentNode, MemoryDocument};

    fn doc() -> (MemoryDocument, ElementId, ElementId) {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let date = doc.append(
            root,
            FragmentNode::new("input").attr("type", "date").attr("value", "2024-05-01"),
        );
        let text = doc.append(root, FragmentNode::new("input").attr("value", "x"));
        (doc, date, text)
    }

    #[test]
    fn first_matching_direction_wins() {
        let (mut doc, date, text) = doc();
        let mut converters = Converters::default();
        converters.push(Converter::new("input[type=date]").unwrap().to_dom(
            |_, value, doc, el| {
                doc.set_value(el, &format!("date:{value}"));
            },
        ));
        converters.push(
            Converter::new("input")
                .unwrap()
                .from_dom(|path, doc, el| Value::from(format!("{path}={}", doc.value(el).unwrap_or_default())))
                .to_dom(|_, _, doc, el| {
                    doc.set_value(el, "generic");
                }),
        );

        // The date converter has no from_dom, so the generic one reads.
        assert_eq!(
            converters.extract("when", &doc, date),
            Some(Value::from("when=2024-05-01"))
        );
        assert!(converters.inject(None, &Value::from("2024-06-01"), &mut doc, date));
        assert_eq!(doc.value(date).as_deref(), Some("date:2024-06-01"));
        assert!(converters.inject(None, &Value::Null, &mut doc, text));
        assert_eq!(doc.value(text).as_deref(), Some("generic"));
    }

    #[test]
    fn no_match_is_none() {
        let (mut doc, _, text) = doc();
        let mut converters = Converters::default();
        converters.push(Converter::new("select").unwrap().from_dom(|_, _, _| Value::Null));
        assert_eq!(converters.extract("x", &doc, text), None);
        assert!(!converters.inject(None, &Value::Null, &mut doc, text));
    }
}
