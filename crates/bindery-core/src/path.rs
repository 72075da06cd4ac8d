#![forbid(unsafe_code)]

//! Dotted path addressing into a state tree.
//!
//! A path is one or more segments separated by `.`. Each segment is either
//! an identifier (`[A-Za-z_][A-Za-z_0-9]*`) or a non-negative array index
//! (`[0-9]+`). There are no wildcards or ranges.
//!
//! # Resolution rules
//!
//! - An identifier segment looks up an object key.
//! - An index segment looks up an array element, or the object key spelled
//!   by its canonical decimal form. Digit runs that are not canonical
//!   indices (`00`, or too large for `usize`) are keys: they never address
//!   an array element.
//! - `length` is readable on arrays and yields the element count. It is
//!   never writable through [`resolve_parent_mut`].
//! - Descending into a scalar, a missing key, or an out-of-range index is an
//!   [`UnknownPath`](StateError::UnknownPath) error naming the first missing
//!   segment.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::StateError;
use crate::value::Value;

/// The pseudo-property exposing an array's element count.
pub const LENGTH: &str = "length";

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// An identifier, or a digit run that is not a canonical index.
    Key(String),
    Index(usize),
}

impl Segment {
    fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let first = chars.next()?;
        if first.is_ascii_digit() {
            if !text.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            // `00` and indices past `usize` are well formed but only ever
            // name an object key spelled that way.
            let canonical = first != '0' || text.len() == 1;
            return Some(match text.parse() {
                Ok(index) if canonical => Self::Index(index),
                _ => Self::Key(text.to_string()),
            });
        }
        let valid = (first.is_ascii_alphabetic() || first == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        valid.then(|| Self::Key(text.to_string()))
    }

    /// The key under which this segment is found in an object.
    #[must_use]
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Self::Key(key) => Cow::Borrowed(key),
            Self::Index(index) => Cow::Owned(index.to_string()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::parse(key).unwrap_or_else(|| Self::Key(key.to_string()))
    }
}

/// A validated, non-empty path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Parse and validate a dotted path string.
    pub fn parse(raw: &str) -> Result<Self, StateError> {
        if raw.is_empty() {
            return Err(StateError::InvalidPath(raw.to_string()));
        }
        raw.split('.')
            .map(Segment::parse)
            .collect::<Option<Vec<_>>>()
            .map(|segments| Self { segments })
            .ok_or_else(|| StateError::InvalidPath(raw.to_string()))
    }

    /// Build a path from segments; `None` when empty.
    #[must_use]
    pub fn from_segments(segments: Vec<Segment>) -> Option<Self> {
        (!segments.is_empty()).then_some(Self { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parent segments and the leaf segment.
    #[must_use]
    pub fn split_last(&self) -> (&[Segment], &Segment) {
        match self.segments.split_last() {
            Some((leaf, parents)) => (parents, leaf),
            None => unreachable!("paths are never empty"),
        }
    }

    /// Whether `prefix` is this path or one of its ancestors.
    #[must_use]
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.segments))
    }
}

impl FromStr for Path {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Whether `raw` is syntactically a path.
#[must_use]
pub fn is_valid_path(raw: &str) -> bool {
    Path::parse(raw).is_ok()
}

/// Render segments as a dotted string (empty for the root).
#[must_use]
pub fn join(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&segment.as_key());
    }
    out
}

/// Read one child of a container.
#[must_use]
pub fn child<'a>(container: &'a Value, segment: &Segment) -> Option<Cow<'a, Value>> {
    match (container, segment) {
        (Value::Object(map), _) => map.get(segment.as_key().as_ref()).map(Cow::Borrowed),
        (Value::Array(items), Segment::Index(i)) => items.get(*i).map(Cow::Borrowed),
        (Value::Array(items), Segment::Key(key)) if key == LENGTH => {
            Some(Cow::Owned(Value::from(items.len())))
        }
        _ => None,
    }
}

/// Mutable access to one child of a container. `length` is not addressable.
pub fn child_mut<'a>(container: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match (container, segment) {
        (Value::Object(map), _) => map.get_mut(segment.as_key().as_ref()),
        (Value::Array(items), Segment::Index(i)) => items.get_mut(*i),
        _ => None,
    }
}

fn unknown(path: &Path, segment: &Segment) -> StateError {
    StateError::UnknownPath {
        path: path.to_string(),
        segment: segment.to_string(),
    }
}

/// Resolve `path` against `root`.
pub fn resolve<'a>(root: &'a Value, path: &Path) -> Result<Cow<'a, Value>, StateError> {
    let mut current = Cow::Borrowed(root);
    for segment in path.segments() {
        let next = match current {
            Cow::Borrowed(value) => child(value, segment),
            // Only `length` yields an owned value, and numbers have no children.
            Cow::Owned(_) => None,
        };
        current = next.ok_or_else(|| unknown(path, segment))?;
    }
    Ok(current)
}

/// Resolve the container holding the leaf of `path`, plus the leaf segment.
///
/// Every segment, the leaf included, must already exist.
pub fn resolve_parent_mut<'a, 'p>(
    root: &'a mut Value,
    path: &'p Path,
) -> Result<(&'a mut Value, &'p Segment), StateError> {
    let (parents, leaf) = path.split_last();
    let mut current = root;
    for segment in parents {
        current = child_mut(current, segment).ok_or_else(|| unknown(path, segment))?;
    }
    let writable = match (&*current, leaf) {
        (Value::Object(map), _) => map.contains_key(leaf.as_key().as_ref()),
        (Value::Array(items), Segment::Index(i)) => *i < items.len(),
        _ => false,
    };
    if !writable {
        return Err(unknown(path, leaf));
    }
    Ok((current, leaf))
}
