//! Ownership tree and path extraction.

use super::path::{FieldPath, Segment};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// SegmentMap maps Segments to child trees.
pub type SegmentMap = BTreeMap<Segment, OwnershipTree>;

/// OwnershipTree records exactly which fields one write touched.
///
/// A `Leaf` means the path leading to it is owned; a `Node` means
/// ownership continues deeper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OwnershipTree {
    #[default]
    Leaf,
    Node(SegmentMap),
}

impl OwnershipTree {
    /// Creates a node from `(segment, child)` pairs.
    pub fn node(children: impl IntoIterator<Item = (Segment, OwnershipTree)>) -> Self {
        OwnershipTree::Node(children.into_iter().collect())
    }

    /// Returns true if nothing hangs below this tree.
    pub fn is_leaf(&self) -> bool {
        match self {
            OwnershipTree::Leaf => true,
            OwnershipTree::Node(children) => children.is_empty(),
        }
    }

    /// Returns the children of this tree, if any.
    pub fn children(&self) -> Option<&SegmentMap> {
        match self {
            OwnershipTree::Node(children) if !children.is_empty() => Some(children),
            _ => None,
        }
    }

    /// Returns the distinct paths owned by this tree, sorted.
    ///
    /// The root itself never appears; a tree without children owns no
    /// paths.
    pub fn paths(&self) -> Vec<FieldPath> {
        let mut paths = Vec::new();
        if let Some(children) = self.children() {
            collect_paths(&FieldPath::root(), children, &mut paths);
        }
        paths.sort();
        paths.dedup();
        paths
    }
}

fn collect_paths(prefix: &FieldPath, children: &SegmentMap, paths: &mut Vec<FieldPath>) {
    for (segment, child) in children {
        let path = prefix.with(segment);
        match child.children() {
            Some(grandchildren) => collect_paths(&path, grandchildren, paths),
            None => paths.push(path),
        }
    }
}

/// Extracts the sorted field paths of an optional tree.
///
/// An absent tree is reported as [`Error::EmptyTree`] so callers can tell
/// "no ownership data" apart from "owns nothing".
pub fn extract_paths(tree: Option<&OwnershipTree>) -> Result<Vec<FieldPath>> {
    tree.map(OwnershipTree::paths).ok_or(Error::EmptyTree)
}
