#![forbid(unsafe_code)]

//! A small CSS selector subset.
//!
//! Supported: type selectors (`input`, `*`), `#id`, `.class`, `[attr]`,
//! `[attr=value]` with optional single or double quotes, compound
//! combinations of those (`input[type=checkbox].big`), and comma separated
//! lists. Combinators (descendant, child, sibling) and pseudo-classes are
//! not supported and fail to parse.
//!
//! # Failure Modes
//!
//! | Input | Error |
//! |-------|-------|
//! | `""`, `"a,,b"` | [`SelectorError::Empty`] |
//! | `"div p"`, `"a:hover"` | [`SelectorError::Unexpected`] |
//! | `"[type"` | [`SelectorError::Unterminated`] |
//! | `"#"`, `"[=x]"` | [`SelectorError::MissingName`] |

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::document::{Document, ElementId};

/// Why a selector did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector, or one entry of a list, is empty.
    Empty,
    /// A character that cannot start or continue a compound selector.
    Unexpected { ch: char, offset: usize },
    /// An attribute selector or quoted value was not closed.
    Unterminated { offset: usize },
    /// `#`, `.`, or `[` not followed by a name.
    MissingName { offset: usize },
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty selector"),
            Self::Unexpected { ch, offset } => {
                write!(f, "unexpected {ch:?} at offset {offset} in selector")
            }
            Self::Unterminated { offset } => {
                write!(f, "unterminated attribute selector at offset {offset}")
            }
            Self::MissingName { offset } => write!(f, "missing name at offset {offset}"),
        }
    }
}

impl std::error::Error for SelectorError {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeTest {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: SmallVec<[String; 2]>,
    attributes: SmallVec<[AttributeTest; 2]>,
}

impl Compound {
    fn matches<D: Document + ?Sized>(&self, doc: &D, el: ElementId) -> bool {
        if let Some(tag) = &self.tag
            && !doc.tag_name(el).eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && doc.attribute(el, "id").as_deref() != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|class| doc.has_class(el, class)) {
            return false;
        }
        self.attributes.iter().all(|test| match (&test.value, doc.attribute(el, &test.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => *expected == actual,
        })
    }
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Compound>,
}

impl Selector {
    /// Parse a comma separated selector list.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();
        let mut offset = 0;
        for part in source.split(',') {
            let lead = part.len() - part.trim_start().len();
            alternatives.push(parse_compound(part.trim(), offset + lead)?);
            offset += part.len() + 1;
        }
        Ok(Self {
            source: source.trim().to_string(),
            alternatives,
        })
    }

    /// A selector matching any element carrying `name`.
    ///
    /// Attribute names are not validated here; a name that contains selector
    /// syntax simply never matches.
    #[must_use]
    pub fn has_attribute(name: &str) -> Self {
        Self::any_attribute(&[name])
    }

    /// A selector matching elements carrying at least one of `names`.
    #[must_use]
    pub fn any_attribute(names: &[&str]) -> Self {
        let alternatives = names
            .iter()
            .map(|name| Compound {
                attributes: smallvec::smallvec![AttributeTest {
                    name: (*name).to_string(),
                    value: None,
                }],
                ..Compound::default()
            })
            .collect();
        let source = names
            .iter()
            .map(|name| format!("[{name}]"))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            source,
            alternatives,
        }
    }

    /// The text this selector was built from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `el` matches any entry of the list.
    #[must_use]
    pub fn matches<D: Document + ?Sized>(&self, doc: &D, el: ElementId) -> bool {
        self.alternatives.iter().any(|c| c.matches(doc, el))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// The longest name at the start of `rest`.
fn take_name(rest: &str) -> &str {
    let end = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
    &rest[..end]
}

fn parse_compound(text: &str, base: usize) -> Result<Compound, SelectorError> {
    if text.is_empty() {
        return Err(SelectorError::Empty);
    }
    let mut compound = Compound::default();
    let mut pos = 0;
    if text.starts_with('*') {
        pos = 1;
    } else {
        let tag = take_name(text);
        if !tag.is_empty() {
            compound.tag = Some(tag.to_ascii_lowercase());
            pos = tag.len();
        }
    }
    while pos < text.len() {
        let rest = &text[pos..];
        let Some(c) = rest.chars().next() else { break };
        match c {
            '#' | '.' => {
                let name = take_name(&rest[1..]);
                if name.is_empty() {
                    return Err(SelectorError::MissingName { offset: base + pos });
                }
                if c == '#' {
                    compound.id = Some(name.to_string());
                } else {
                    compound.classes.push(name.to_string());
                }
                pos += 1 + name.len();
            }
            '[' => {
                let (test, used) = parse_attribute(&rest[1..], base + pos)?;
                compound.attributes.push(test);
                pos += 1 + used;
            }
            other => {
                return Err(SelectorError::Unexpected {
                    ch: other,
                    offset: base + pos,
                });
            }
        }
    }
    Ok(compound)
}

/// Parse the inside of `[...]`; `body` starts right after `[`. Returns the
/// test and the bytes consumed including the closing `]`.
fn parse_attribute(body: &str, offset: usize) -> Result<(AttributeTest, usize), SelectorError> {
    let unterminated = SelectorError::Unterminated { offset };
    let lead = body.len() - body.trim_start().len();
    let name = take_name(&body[lead..]);
    if name.is_empty() {
        return Err(SelectorError::MissingName { offset });
    }
    let mut pos = lead + name.len();
    pos += body[pos..].len() - body[pos..].trim_start().len();
    let value = match body[pos..].chars().next() {
        Some(']') => None,
        Some('=') => {
            pos += 1;
            pos += body[pos..].len() - body[pos..].trim_start().len();
            let rest = &body[pos..];
            match rest.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let close = rest[1..].find(quote).ok_or(unterminated.clone())?;
                    pos += close + 2;
                    Some(rest[1..=close].to_string())
                }
                Some(_) => {
                    let end = rest.find(']').ok_or(unterminated.clone())?;
                    pos += end;
                    Some(rest[..end].trim_end().to_string())
                }
                None => return Err(unterminated),
            }
        }
        Some(other) => {
            return Err(SelectorError::Unexpected {
                ch: other,
                offset: offset + 1 + pos,
            });
        }
        None => return Err(unterminated),
    };
    pos += body[pos..].len() - body[pos..].trim_start().len();
    if !body[pos..].starts_with(']') {
        return Err(unterminated);
    }
    Ok((
        AttributeTest {
            name: name.to_string(),
            value,
        },
        pos + 1,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::FragmentNode;
    use crate::memory::MemoryDocument;
    use pretty_assertions::assert_eq;

    fn doc() -> (MemoryDocument, ElementId, ElementId) {
        let mut doc = MemoryDocument::new();
        let root = doc.root();
        let ids = doc.append(
            root,
            FragmentNode::new("input")
                .attr("id", "agree")
                .attr("type", "checkbox")
                .attr("class", "big toggle")
                .attr("data-bind", "agreed"),
        );
        let p = doc.append(root, FragmentNode::new("p").attr("data-read", "name"));
        (doc, ids, p)
    }

    #[test]
    fn compound_matching() {
        let (doc, input, p) = doc();
        let sel = Selector::parse("input[type=checkbox].big").unwrap();
        assert!(sel.matches(&doc, input));
        assert!(!sel.matches(&doc, p));
        assert!(Selector::parse("#agree").unwrap().matches(&doc, input));
        assert!(Selector::parse("*").unwrap().matches(&doc, p));
        assert!(Selector::parse("INPUT").unwrap().matches(&doc, input));
        assert!(!Selector::parse(".small").unwrap().matches(&doc, input));
    }

    #[test]
    fn quoted_and_bare_values() {
        let (doc, input, _) = doc();
        for source in [
            "[type=checkbox]",
            "[type=\"checkbox\"]",
            "[type='checkbox']",
            "[ type = checkbox ]",
        ] {
            assert!(
                Selector::parse(source).unwrap().matches(&doc, input),
                "{source}"
            );
        }
        assert!(!Selector::parse("[type=text]").unwrap().matches(&doc, input));
    }

    #[test]
    fn lists_match_any() {
        let (doc, input, p) = doc();
        let sel = Selector::parse("[data-bind], [data-read]").unwrap();
        assert!(sel.matches(&doc, input));
        assert!(sel.matches(&doc, p));
        let built = Selector::any_attribute(&["data-bind", "data-read"]);
        assert_eq!(built.as_str(), "[data-bind], [data-read]");
        assert!(built.matches(&doc, p));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Selector::parse(""), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("a,,b"), Err(SelectorError::Empty));
        assert_eq!(
            Selector::parse("div p"),
            Err(SelectorError::Unexpected { ch: ' ', offset: 3 })
        );
        assert_eq!(
            Selector::parse("a:hover"),
            Err(SelectorError::Unexpected { ch: ':', offset: 1 })
        );
        assert_eq!(
            Selector::parse("[type"),
            Err(SelectorError::Unterminated { offset: 0 })
        );
        assert_eq!(
            Selector::parse("[type=\"x]"),
            Err(SelectorError::Unterminated { offset: 0 })
        );
        assert_eq!(
            Selector::parse("#"),
            Err(SelectorError::MissingName { offset: 0 })
        );
        assert_eq!(
            Selector::parse("p, .x, ."),
            Err(SelectorError::MissingName { offset: 7 })
        );
    }
}
