//! Property path types.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::parser::PropPathParser;
use crate::util::{parse_db, to_abstract, to_db, to_ui};
use crate::ParseError;

/// One step of a [`PropPath`].
///
/// A step is either a named field (map key) or an array index, never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Map key: `.name` or `['name']` in UI form.
    Name(String),
    /// Array position: `[3]` in UI form.
    Index(usize),
}

impl PathSegment {
    /// The key of a named segment, `None` for an index.
    pub fn name(&self) -> Option<&str> {
        match self {
            PathSegment::Name(name) => Some(name.as_str()),
            PathSegment::Index(_) => None,
        }
    }

    /// The position of an index segment, `None` for a name.
    pub fn index(&self) -> Option<usize> {
        match self {
            PathSegment::Name(_) => None,
            PathSegment::Index(idx) => Some(*idx),
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, PathSegment::Index(_))
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Name(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        PathSegment::Name(name)
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// An address of a nested location inside an attribute tree.
///
/// Segments are ordered outermost first. Every "mutator" returns a new path;
/// a `PropPath` is never changed after it has been built.
///
/// # Example
///
/// ```
/// use xregistry_prop_path::{PathSegment, PropPath};
///
/// let path = PropPath::new().with_prop("arr").with_index(1).with_prop("x.y");
/// assert_eq!(path.ui(), "arr[1]['x.y']");
/// assert_eq!(path.db(), "arr,#1,x.y,");
/// assert_eq!(path.bottom(), "x.y");
/// assert_eq!(path.get(1), Some(&PathSegment::Index(1)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PropPath {
    segments: Vec<PathSegment>,
}

impl PropPath {
    /// The empty path. It addresses the whole tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if a named segment is empty. No encoding can represent an
    /// empty name, so building one is a caller bug; parse untrusted input
    /// with [`PropPath::from_ui`] instead.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        assert!(
            segments
                .iter()
                .all(|s| s.name().map_or(true, |n| !n.is_empty())),
            "named segments must not be empty"
        );
        Self { segments }
    }

    /// Builds a path where every string is a named segment, e.g. the
    /// components of a request URL.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_segments(
            names
                .into_iter()
                .map(|n| PathSegment::Name(n.into()))
                .collect(),
        )
    }

    /// Parses the UI form, see [`PropPathParser`].
    pub fn from_ui(s: &str) -> Result<Self, ParseError> {
        PropPathParser::parse(s)
    }

    /// Parses the DB form, see [`parse_db`].
    pub fn from_db(s: &str) -> Self {
        parse_db(s)
    }

    pub fn ui(&self) -> String {
        to_ui(self)
    }

    pub fn db(&self) -> String {
        to_db(self)
    }

    pub fn abstract_key(&self) -> String {
        to_abstract(self)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathSegment> {
        self.segments.iter()
    }

    pub fn get(&self, i: usize) -> Option<&PathSegment> {
        self.segments.get(i)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True if any segment is an array index.
    pub fn is_indexed(&self) -> bool {
        self.segments.iter().any(PathSegment::is_index)
    }

    /// Name of the first segment. Empty if the path is empty or starts with
    /// an index.
    pub fn top(&self) -> &str {
        self.segments
            .first()
            .and_then(PathSegment::name)
            .unwrap_or("")
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Name of the last segment.
    ///
    /// Returns an empty string when the last segment is an index rather than
    /// failing. Callers rely on this, so it stays.
    pub fn bottom(&self) -> &str {
        self.segments
            .last()
            .and_then(PathSegment::name)
            .unwrap_or("")
    }

    /// A path holding only the first segment (empty if `self` is empty).
    pub fn first(&self) -> PropPath {
        Self {
            segments: self.segments.iter().take(1).cloned().collect(),
        }
    }

    /// Everything after the first segment, or `None` when there is nothing
    /// left after it.
    pub fn rest(&self) -> Option<PropPath> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[1..].to_vec(),
        })
    }

    /// Appends a named segment.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty, see [`PropPath::from_segments`].
    pub fn with_prop(&self, name: impl Into<String>) -> PropPath {
        let name = name.into();
        assert!(!name.is_empty(), "named segments must not be empty");
        self.with_segment(PathSegment::Name(name))
    }

    pub fn with_index(&self, idx: usize) -> PropPath {
        self.with_segment(PathSegment::Index(idx))
    }

    fn with_segment(&self, segment: PathSegment) -> PropPath {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    /// Concatenates `other` after `self`.
    pub fn append(&self, other: &PropPath) -> PropPath {
        let mut segments = Vec::with_capacity(self.segments.len() + other.segments.len());
        segments.extend_from_slice(&self.segments);
        segments.extend_from_slice(&other.segments);
        Self { segments }
    }

    pub fn drop_last(&self) -> PropPath {
        let end = self.segments.len().saturating_sub(1);
        Self {
            segments: self.segments[..end].to_vec(),
        }
    }

    /// True if the first `prefix.len()` segments of `self` equal `prefix`.
    pub fn has_prefix(&self, prefix: &PropPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl<'a> IntoIterator for &'a PropPath {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl fmt::Display for PropPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_ui(self))
    }
}

impl FromStr for PropPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropPathParser::parse(s)
    }
}

impl Serialize for PropPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_ui(self))
    }
}

struct PropPathVisitor;

impl Visitor<'_> for PropPathVisitor {
    type Value = PropPath;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a property path such as `a.b[2]['x.y']`")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<PropPath, E> {
        PropPathParser::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for PropPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(PropPathVisitor)
    }
}
