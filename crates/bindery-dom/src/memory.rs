#![forbid(unsafe_code)]

//! Arena-backed headless document.
//!
//! Elements live in a flat arena and are never freed; detaching an element
//! only unlinks it from its parent. Form state is modelled the way a browser
//! keeps it: the `value` and `checked` properties start from the markup
//! attributes and then live separately from them.
//!
//! | Tag | `value` property | `set_text` |
//! |-----|------------------|------------|
//! | `input`, `select`, `option`, `button` | yes, from the `value` attribute | no for `input`, yes otherwise |
//! | `textarea` | yes, from the text content | yes |
//! | void elements (`img`, `br`, `hr`, `meta`, `link`) | no | no |
//! | anything else | no | yes |

use std::fmt;

use crate::document::{Document, ElementId};
use crate::fragment::{Fragment, FragmentNode};

const VALUE_TAGS: &[&str] = &["input", "textarea", "select", "option", "button"];
const VOID_TAGS: &[&str] = &["input", "img", "br", "hr", "meta", "link"];

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
    value: Option<String>,
    checked: bool,
}

/// In-memory [`Document`].
#[derive(Clone)]
pub struct MemoryDocument {
    elements: Vec<Element>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// An empty document with a `body` root.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            elements: Vec::new(),
        };
        doc.alloc(&FragmentNode::new("body"), None);
        doc
    }

    /// Build `node` and append it under `parent`, returning its id.
    pub fn append(&mut self, parent: ElementId, node: FragmentNode) -> ElementId {
        self.attach(parent, &node)
    }

    fn attach(&mut self, parent: ElementId, node: &FragmentNode) -> ElementId {
        let id = self.alloc(node, Some(parent));
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Markup of `el` and its subtree. Form properties are not included.
    #[must_use]
    pub fn to_markup(&self, el: ElementId) -> String {
        self.snapshot(el).to_string()
    }

    /// Number of elements ever created, attached or not.
    #[must_use]
    pub fn arena_len(&self) -> usize {
        self.elements.len()
    }

    fn alloc(&mut self, node: &FragmentNode, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        let value = VALUE_TAGS.contains(&node.tag.as_str()).then(|| {
            if node.tag == "textarea" {
                node.text.clone()
            } else {
                node.attribute("value").unwrap_or_default().to_string()
            }
        });
        self.elements.push(Element {
            tag: node.tag.clone(),
            attributes: node.attributes.clone(),
            text: node.text.clone(),
            children: Vec::with_capacity(node.children.len()),
            parent,
            value,
            checked: node.attribute("checked").is_some(),
        });
        for child in &node.children {
            let child_id = self.alloc(child, Some(id));
            self.elements[id.0 as usize].children.push(child_id);
        }
        id
    }

    fn get(&self, el: ElementId) -> Option<&Element> {
        self.elements.get(el.0 as usize)
    }

    fn get_mut(&mut self, el: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(el.0 as usize)
    }

    fn snapshot(&self, el: ElementId) -> FragmentNode {
        let Some(element) = self.get(el) else {
            return FragmentNode::default();
        };
        FragmentNode {
            tag: element.tag.clone(),
            attributes: element.attributes.clone(),
            text: element.text.clone(),
            children: element.children.iter().map(|&c| self.snapshot(c)).collect(),
        }
    }

    fn detach_children(&mut self, el: ElementId, keep: usize) {
        let removed = match self.get_mut(el) {
            Some(element) if element.children.len() > keep => element.children.split_off(keep),
            _ => return,
        };
        for child in removed {
            if let Some(c) = self.get_mut(child) {
                c.parent = None;
            }
        }
    }
}

impl Document for MemoryDocument {
    fn root(&self) -> ElementId {
        ElementId(0)
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.get(el)?.parent
    }

    fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.get(el).map(|e| e.children.clone()).unwrap_or_default()
    }

    fn tag_name(&self, el: ElementId) -> &str {
        self.get(el).map_or("", |e| e.tag.as_str())
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.get(el)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        let Some(element) = self.get_mut(el) else {
            return;
        };
        match element.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => element
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    fn checked(&self, el: ElementId) -> bool {
        self.get(el).is_some_and(|e| e.checked)
    }

    fn set_checked(&mut self, el: ElementId, checked: bool) {
        if let Some(element) = self.get_mut(el) {
            element.checked = checked;
        }
    }

    fn value(&self, el: ElementId) -> Option<String> {
        self.get(el)?.value.clone()
    }

    fn set_value(&mut self, el: ElementId, value: &str) -> bool {
        match self.get_mut(el) {
            Some(Element {
                value: Some(slot), ..
            }) => {
                *slot = value.to_string();
                true
            }
            _ => false,
        }
    }

    fn text(&self, el: ElementId) -> String {
        let Some(element) = self.get(el) else {
            return String::new();
        };
        let mut out = element.text.clone();
        for &child in &element.children {
            out.push_str(&self.text(child));
        }
        out
    }

    fn set_text(&mut self, el: ElementId, text: &str) -> bool {
        if VOID_TAGS.contains(&self.tag_name(el)) || self.get(el).is_none() {
            return false;
        }
        self.detach_children(el, 0);
        if let Some(element) = self.get_mut(el) {
            element.text = text.to_string();
            if element.tag == "textarea" {
                element.value = Some(text.to_string());
            }
        }
        true
    }

    fn capture(&self, el: ElementId) -> Fragment {
        self.children(el).into_iter().map(|c| self.snapshot(c)).collect()
    }

    fn append_fragment(&mut self, parent: ElementId, fragment: &Fragment) -> Vec<ElementId> {
        fragment
            .nodes()
            .iter()
            .map(|node| self.attach(parent, node))
            .collect()
    }

    fn truncate_children(&mut self, el: ElementId, keep: usize) {
        self.detach_children(el, keep);
    }
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("arena_len", &self.elements.len())
            .field("markup", &self.snapshot(self.root()).to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;
    use pretty_assertions::assert_eq;

    fn form() -> (MemoryDocument, ElementId) {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let form = doc.append(
            root,
            FragmentNode::new("form")
                .attr("id", "app")
                .child(FragmentNode::new("input").attr("name", "a").attr("value", "x"))
                .child(
                    FragmentNode::new("label")
                        .text("Agree ")
                        .child(
                            FragmentNode::new("input")
                                .attr("type", "checkbox")
                                .attr("checked", ""),
                        ),
                )
                .child(FragmentNode::new("textarea").text("notes")),
        );
        (doc, form)
    }

    #[test]
    fn query_order_and_scope() {
        let (doc, form) = form();
        let inputs = doc.query_all(form, &Selector::parse("input").unwrap());
        assert_eq!(inputs.len(), 2);
        assert!(inputs[0] < inputs[1]);
        let own = doc.query_all(form, &Selector::parse("#app").unwrap());
        assert_eq!(own, vec![form]);
        let textarea = doc
            .query(doc.root(), &Selector::parse("textarea").unwrap())
            .unwrap();
        assert_eq!(doc.value(textarea).as_deref(), Some("notes"));
    }

    #[test]
    fn form_properties_start_from_markup() {
        let (mut doc, form) = form();
        let text = doc.query(form, &Selector::parse("[name=a]").unwrap()).unwrap();
        let checkbox = doc
            .query(form, &Selector::parse("input[type=checkbox]").unwrap())
            .unwrap();
        assert_eq!(doc.value(text).as_deref(), Some("x"));
        assert!(doc.is_checkbox(checkbox));
        assert!(!doc.is_checkbox(text));
        assert!(doc.checked(checkbox));

        assert!(doc.set_value(text, "y"));
        assert_eq!(doc.value(text).as_deref(), Some("y"));
        assert_eq!(doc.attribute(text, "value").as_deref(), Some("x"));
        assert!(!doc.set_value(form, "nope"));
        assert_eq!(doc.value(form), None);
    }

    #[test]
    fn set_text_replaces_children() {
        let (mut doc, form) = form();
        let label = doc.query(form, &Selector::parse("label").unwrap()).unwrap();
        assert_eq!(doc.text(label), "Agree ");
        assert!(doc.set_text(label, "Done"));
        assert_eq!(doc.child_count(label), 0);
        assert_eq!(doc.text(label), "Done");
        let input = doc.query(form, &Selector::parse("input").unwrap()).unwrap();
        assert!(!doc.set_text(input, "x"));
    }

    #[test]
    fn capture_append_truncate() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let list = doc.append(
            root,
            FragmentNode::new("ul").child(FragmentNode::new("li").attr("data-read", "item")),
        );
        let template = doc.capture(list);
        assert_eq!(template.len(), 1);

        doc.truncate_children(list, 0);
        assert_eq!(doc.child_count(list), 0);
        let first = doc.append_fragment(list, &template);
        doc.append_fragment(list, &template);
        assert_eq!(doc.child_count(list), 2);

        doc.truncate_children(list, 1);
        assert_eq!(doc.children(list), first);
        assert_eq!(doc.to_markup(list), "<ul><li data-read=\"item\"></li></ul>");
    }

    #[test]
    fn detached_elements_leave_scope() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let list = doc.append(root, FragmentNode::new("ul").child(FragmentNode::new("li")));
        let li = doc.children(list)[0];
        assert!(doc.contains(root, li));
        doc.truncate_children(list, 0);
        assert!(!doc.contains(root, li));
        assert_eq!(doc.parent(li), None);
    }

    #[test]
    fn class_toggling() {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let p = doc.append(root, FragmentNode::new("p").attr("class", "note"));
        assert!(doc.toggle_class(p, "active", true));
        assert!(!doc.toggle_class(p, "active", true));
        assert_eq!(doc.attribute(p, "class").as_deref(), Some("note active"));
        assert!(doc.toggle_class(p, "active", false));
        assert_eq!(doc.attribute(p, "class").as_deref(), Some("note"));
    }
}
