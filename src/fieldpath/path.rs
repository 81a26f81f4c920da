//! Path segment and field path types.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Segment represents one key of an ownership tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Struct or map field name (`f:` keys).
    Field(String),
    /// Associative list element selector (`k:` keys), kept as the raw
    /// JSON object literal.
    SetKey(String),
    /// Set-of-scalars element (`v:` keys), kept as the raw JSON literal.
    Value(String),
    /// Positional list index (`i:` keys).
    Index(i32),
    /// The `.` marker: the enclosing node as a whole.
    SelfMarker,
}

impl Segment {
    /// Creates a new field segment.
    pub fn field(name: impl Into<String>) -> Self {
        Segment::Field(name.into())
    }

    /// Creates a new set-element selector segment from its object literal.
    pub fn set_key(selector: impl Into<String>) -> Self {
        Segment::SetKey(selector.into())
    }
}

/// Renders the segment the way it appears inside a [`FieldPath`].
///
/// Selectors are wrapped in brackets so they stay a single segment even
/// though the literal may contain separators.
impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, "{}", name),
            Segment::SetKey(selector) => write!(f, "[{}]", selector),
            Segment::Value(v) => write!(f, "v:{}", v),
            Segment::Index(i) => write!(f, "i:{}", i),
            Segment::SelfMarker => write!(f, "."),
        }
    }
}

/// One rendered segment of a path string: a bracket-wrapped selector, which
/// may itself contain slashes, or the text up to the next slash.
static RENDERED_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\[\{.*?\}\]|[^/]*)").expect("rendered segment pattern is valid"));

/// FieldPath is a flattened, slash-delimited path to one owned leaf,
/// e.g. `/metadata/annotations/app`.
///
/// The path keeps the typed segments it was built from next to its
/// rendering. Equality, ordering and hashing only look at the rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath {
    rendered: String,
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Creates the empty root path.
    pub fn root() -> Self {
        FieldPath::default()
    }

    /// Returns true if this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Creates a new path with the given segment appended.
    pub fn with(&self, segment: &Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.clone());
        FieldPath {
            rendered: format!("{}/{}", self.rendered, segment),
            segments,
        }
    }

    /// Returns the segments of this path, outermost first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the rendered path.
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    pub fn into_string(self) -> String {
        self.rendered
    }
}

/// Reads a segment back from its rendering inside a path.
fn parse_rendered_segment(text: &str) -> Segment {
    if text == "." {
        return Segment::SelfMarker;
    }
    if text.len() >= 4 && text.starts_with("[{") && text.ends_with("}]") {
        return Segment::SetKey(text[1..text.len() - 1].to_string());
    }
    if let Some(value) = text.strip_prefix("v:") {
        return Segment::Value(value.to_string());
    }
    if let Some(index) = text.strip_prefix("i:").and_then(|i| i.parse().ok()) {
        return Segment::Index(index);
    }
    Segment::Field(text.to_string())
}

/// Parses a rendered path.
///
/// Rendering is lossy: a field name holding a slash reads back as two
/// fields, and a field shaped like `[{...}]` reads back as a selector.
/// Paths taken from an [`OwnershipTree`](super::OwnershipTree) keep their
/// exact segments.
impl From<String> for FieldPath {
    fn from(rendered: String) -> Self {
        let segments = RENDERED_SEGMENT
            .captures_iter(&rendered)
            .map(|caps| parse_rendered_segment(&caps[1]))
            .collect();
        FieldPath { rendered, segments }
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        FieldPath::from(s.to_string())
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.rendered
    }
}

impl PartialEq for FieldPath {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for FieldPath {}

impl PartialOrd for FieldPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Plain lexicographic ordering of the rendered string.
impl Ord for FieldPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rendered.cmp(&other.rendered)
    }
}

impl Hash for FieldPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered)
    }
}
