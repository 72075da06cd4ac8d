//! Detached element trees.
//!
//! A [`Fragment`] is markup that is not part of any document: the captured
//! children of a loop element, or a tree built in code and appended to a
//! [`MemoryDocument`](crate::MemoryDocument).

use std::fmt;

/// One element of a detached tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentNode {
    pub tag: String,
    /// Attributes in source order. Names are unique.
    pub attributes: Vec<(String, String)>,
    /// Text content placed before the children.
    pub text: String,
    pub children: Vec<FragmentNode>,
}

impl FragmentNode {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Set an attribute, replacing an existing one of the same name.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn child(mut self, child: FragmentNode) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn map_attributes(&mut self, f: &mut impl FnMut(&str, &str) -> Option<String>) {
        for (name, value) in &mut self.attributes {
            if let Some(replacement) = f(name.as_str(), value.as_str()) {
                *value = replacement;
            }
        }
        for child in &mut self.children {
            child.map_attributes(f);
        }
    }
}

impl fmt::Display for FragmentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attributes {
            write!(f, " {name}=\"{}\"", value.replace('"', "&quot;"))?;
        }
        write!(f, ">{}", self.text)?;
        for child in &self.children {
            write!(f, "{child}")?;
        }
        write!(f, "</{}>", self.tag)
    }
}

/// An ordered list of detached top-level elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    nodes: Vec<FragmentNode>,
}

impl Fragment {
    #[must_use]
    pub fn new(nodes: Vec<FragmentNode>) -> Self {
        Self { nodes }
    }

    #[must_use]
    pub fn nodes(&self) -> &[FragmentNode] {
        &self.nodes
    }

    /// Number of top-level elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Copy of this fragment with attribute values rewritten.
    ///
    /// `f` receives every attribute `(name, value)` at any depth and returns
    /// a replacement value, or `None` to keep the original.
    #[must_use]
    pub fn map_attributes(&self, mut f: impl FnMut(&str, &str) -> Option<String>) -> Fragment {
        let mut copy = self.clone();
        for node in &mut copy.nodes {
            node.map_attributes(&mut f);
        }
        copy
    }
}

impl From<FragmentNode> for Fragment {
    fn from(node: FragmentNode) -> Self {
        Self { nodes: vec![node] }
    }
}

impl FromIterator<FragmentNode> for Fragment {
    fn from_iter<I: IntoIterator<Item = FragmentNode>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_replaces_duplicate_attributes() {
        let node = FragmentNode::new("LI").attr("data-read", "a").attr("data-read", "b");
        assert_eq!(node.tag, "li");
        assert_eq!(node.attributes, vec![("data-read".to_string(), "b".to_string())]);
    }

    #[test]
    fn map_attributes_reaches_every_depth() {
        let fragment: Fragment = [
            FragmentNode::new("li")
                .attr("data-read", "item.name")
                .attr("title", "item")
                .child(FragmentNode::new("span").attr("data-read", "item.id")),
            FragmentNode::new("hr"),
        ]
        .into_iter()
        .collect();

        let mapped = fragment.map_attributes(|name, value| {
            (name == "data-read").then(|| value.replace("item", "0"))
        });

        assert_eq!(
            mapped.to_string(),
            "<li data-read=\"0.name\" title=\"item\"><span data-read=\"0.id\"></span></li><hr></hr>"
        );
        assert_eq!(fragment.nodes()[0].attribute("data-read"), Some("item.name"));
    }
}
