//! Conversion of field paths into match patterns.

use crate::error::{Error, Result};
use crate::fieldpath::{extract_paths, FieldPath, OwnershipTree, Segment};
use regex::Regex;
use std::collections::BTreeSet;

/// Matches any single path content, standing in for selectors and for a
/// trailing self marker.
pub const WILDCARD: &str = "*.*";

/// Appends `text` to `pattern` so it matches literally.
///
/// Slashes become `\/`. Dots stay live, the way recorded patterns have
/// always carried them.
fn push_literal(pattern: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '/' => pattern.push_str(r"\/"),
            '\\' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' => {
                pattern.push('\\');
                pattern.push(c);
            }
            _ => pattern.push(c),
        }
    }
}

/// Converts one field path into its match pattern.
///
/// Each segment is introduced by an escaped slash. Selector segments and a
/// trailing self marker become [`WILDCARD`]; everything else is matched
/// literally.
pub fn to_pattern(path: &FieldPath) -> String {
    let segments = path.segments();
    let mut pattern = String::with_capacity(path.as_str().len() + segments.len());
    for (i, segment) in segments.iter().enumerate() {
        pattern.push_str(r"\/");
        match segment {
            Segment::SetKey(_) => pattern.push_str(WILDCARD),
            Segment::SelfMarker if i + 1 == segments.len() => pattern.push_str(WILDCARD),
            Segment::SelfMarker => pattern.push('.'),
            Segment::Field(name) => push_literal(&mut pattern, name),
            Segment::Value(value) => {
                pattern.push_str("v:");
                push_literal(&mut pattern, value);
            }
            Segment::Index(index) => pattern.push_str(&format!("i:{}", index)),
        }
    }
    pattern
}

/// Compiles paths into their deduplicated, sorted match patterns.
pub fn compile_patterns<'a>(paths: impl IntoIterator<Item = &'a FieldPath>) -> Vec<String> {
    paths
        .into_iter()
        .map(to_pattern)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Returns the paths of a tree either literally or as match patterns.
///
/// Literal paths are meant for display; patterns are meant for building an
/// [`OwnedRegion`].
pub fn tree_to_paths(tree: Option<&OwnershipTree>, as_pattern: bool) -> Result<Vec<String>> {
    let paths = extract_paths(tree)?;
    if as_pattern {
        Ok(compile_patterns(&paths))
    } else {
        Ok(paths.into_iter().map(FieldPath::into_string).collect())
    }
}

/// OwnedRegion is the set of paths one write owns, compiled into a single
/// alternation for containment testing.
///
/// The alternation is anchored at the root and must end on a segment
/// boundary, so `/spec/x` covers `/spec/x/y` but not `/spec/xy`.
#[derive(Debug, Clone)]
pub struct OwnedRegion {
    patterns: Vec<String>,
    matcher: Regex,
}

impl OwnedRegion {
    /// Compiles the given patterns into a region.
    ///
    /// Returns [`Error::EmptyTree`] when there is no pattern at all, since an
    /// empty alternation would match every path.
    pub fn compile(patterns: Vec<String>) -> Result<Self> {
        if patterns.is_empty() {
            return Err(Error::EmptyTree);
        }
        let matcher = Regex::new(&format!(r"^(?:{})(?:\/|$)", patterns.join("|")))?;
        Ok(OwnedRegion { patterns, matcher })
    }

    /// Builds the region owned by a tree.
    pub fn from_tree(tree: &OwnershipTree) -> Result<Self> {
        Self::compile(compile_patterns(&tree.paths()))
    }

    /// Returns true if the path falls inside this region.
    pub fn touches(&self, path: &FieldPath) -> bool {
        self.matcher.is_match(path.as_str())
    }

    /// Returns the patterns this region was compiled from.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns the composite alternation.
    pub fn as_str(&self) -> &str {
        self.matcher.as_str()
    }
}
