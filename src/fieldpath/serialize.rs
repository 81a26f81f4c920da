//! Wire codec for ownership trees.
//!
//! Trees are JSON objects whose keys carry a two-character kind prefix:
//! - Field: "f:name"
//! - Set key: "k:{json_object}"
//! - Value: "v:json_value"
//! - Index: "i:number"
//!
//! plus the bare "." self marker. Every value is itself such an object,
//! empty for leaves.

use super::path::Segment;
use super::tree::OwnershipTree;
use crate::error::{Error, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::debug;

const SELF_MARKER: &str = ".";

/// Serializes a Segment to its key representation.
pub fn serialize_segment(segment: &Segment) -> String {
    match segment {
        Segment::Field(name) => format!("f:{}", name),
        Segment::SetKey(selector) => format!("k:{}", selector),
        Segment::Value(v) => format!("v:{}", v),
        Segment::Index(i) => format!("i:{}", i),
        Segment::SelfMarker => SELF_MARKER.to_string(),
    }
}

/// Deserializes a Segment from its key representation.
///
/// Returns `Ok(None)` for keys with an unknown kind prefix so newer
/// encodings can be read by dropping what is not understood.
pub fn deserialize_segment(key: &str) -> Result<Option<Segment>> {
    if key == SELF_MARKER {
        return Ok(Some(Segment::SelfMarker));
    }
    if key.len() < 2 || !key.is_char_boundary(2) {
        return Err(Error::decode(format!(
            "key must be at least 2 characters long: {:?}",
            key
        )));
    }

    let (prefix, content) = key.split_at(2);
    match prefix {
        "f:" => Ok(Some(Segment::Field(content.to_string()))),
        "k:" => {
            let selector: serde_json::Value = serde_json::from_str(content)
                .map_err(|e| Error::decode(format!("invalid set key {:?}: {}", content, e)))?;
            if !selector.is_object() {
                return Err(Error::decode(format!(
                    "expected JSON object for set key: {}",
                    content
                )));
            }
            Ok(Some(Segment::SetKey(content.to_string())))
        }
        "v:" => {
            serde_json::from_str::<serde_json::Value>(content)
                .map_err(|e| Error::decode(format!("invalid set value {:?}: {}", content, e)))?;
            Ok(Some(Segment::Value(content.to_string())))
        }
        "i:" => {
            let i = content
                .parse::<i32>()
                .map_err(|e| Error::decode(format!("invalid index {:?}: {}", content, e)))?;
            Ok(Some(Segment::Index(i)))
        }
        _ => {
            debug!(key, "dropping ownership key with unknown prefix");
            Ok(None)
        }
    }
}

impl OwnershipTree {
    /// Decodes a tree from its JSON wire form.
    pub fn from_json(data: &[u8]) -> Result<OwnershipTree> {
        let value: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| Error::decode(format!("JSON parse error: {}", e)))?;
        Self::from_json_value(&value)
    }

    /// Decodes a tree from an already parsed JSON value.
    pub fn from_json_value(value: &serde_json::Value) -> Result<OwnershipTree> {
        match value {
            serde_json::Value::Object(obj) => Self::from_json_object(obj),
            other => Err(Error::decode(format!(
                "expected JSON object, got {}",
                json_kind(other)
            ))),
        }
    }

    fn from_json_object(obj: &serde_json::Map<String, serde_json::Value>) -> Result<OwnershipTree> {
        let mut children = BTreeMap::new();

        for (key, value) in obj {
            let Some(segment) = deserialize_segment(key)? else {
                continue;
            };
            let child = match value {
                serde_json::Value::Object(child_obj) => Self::from_json_object(child_obj)?,
                other => {
                    return Err(Error::decode(format!(
                        "expected object value for key {:?}, got {}",
                        key,
                        json_kind(other)
                    )));
                }
            };
            children.insert(segment, child);
        }

        if children.is_empty() {
            Ok(OwnershipTree::Leaf)
        } else {
            Ok(OwnershipTree::Node(children))
        }
    }

    /// Encodes the tree into its JSON wire form.
    pub fn to_json_value(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        if let OwnershipTree::Node(children) = self {
            for (segment, child) in children {
                obj.insert(serialize_segment(segment), child.to_json_value());
            }
        }
        serde_json::Value::Object(obj)
    }

    /// Encodes the tree into JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.to_json_value())
            .map_err(|e| Error::decode(format!("JSON error: {}", e)))
    }
}

impl Serialize for OwnershipTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OwnershipTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        OwnershipTree::from_json_value(&value).map_err(D::Error::custom)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
