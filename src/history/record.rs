//! Ownership records and their decoding.

use crate::error::{Error, Result};
use crate::fieldpath::OwnershipTree;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Operation is the kind of write that produced a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operation {
    Apply,
    Update,
    Create,
    Other(String),
}

impl Operation {
    /// Returns true for initial authorship.
    pub fn is_create(&self) -> bool {
        matches!(self, Operation::Create)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operation::Apply => "Apply",
            Operation::Update => "Update",
            Operation::Create => "Create",
            Operation::Other(s) => s,
        }
    }
}

impl From<String> for Operation {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Apply" => Operation::Apply,
            "Update" => Operation::Update,
            "Create" => Operation::Create,
            _ => Operation::Other(s),
        }
    }
}

impl From<&str> for Operation {
    fn from(s: &str) -> Self {
        Operation::from(s.to_string())
    }
}

impl From<Operation> for String {
    fn from(op: Operation) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// OwnershipRecord is one historical write to a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipRecord {
    /// Identity of the writing agent.
    #[serde(default)]
    pub manager: String,

    pub operation: Operation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields_type: Option<String>,

    /// The fields this write touched.
    #[serde(default, rename = "fieldsV1", skip_serializing_if = "Option::is_none")]
    pub fields: Option<OwnershipTree>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subresource: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

impl OwnershipRecord {
    /// Creates a record without fields or timestamp.
    pub fn new(manager: impl Into<String>, operation: Operation) -> Self {
        OwnershipRecord {
            manager: manager.into(),
            operation,
            api_version: None,
            fields_type: None,
            fields: None,
            subresource: None,
            time: None,
        }
    }

    /// Sets the ownership tree.
    pub fn with_fields(mut self, fields: OwnershipTree) -> Self {
        self.fields_type = Some("FieldsV1".to_string());
        self.fields = Some(fields);
        self
    }

    /// Sets the timestamp.
    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }
}

/// SkippedTree describes a record whose ownership tree could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTree {
    /// Position of the record in the input list.
    pub index: usize,
    pub manager: String,
    pub message: String,
}

/// DecodedHistory is the result of lenient decoding.
#[derive(Debug, Clone, Default)]
pub struct DecodedHistory {
    pub records: Vec<OwnershipRecord>,
    /// Records kept without their ownership tree.
    pub skipped: Vec<SkippedTree>,
}

/// Decodes a record list, failing on the first undecodable record.
///
/// The document may be JSON or YAML, and either a bare list of records or a
/// resource object carrying them under `metadata.managedFields`.
pub fn decode_records(input: &str) -> Result<Vec<OwnershipRecord>> {
    record_values(input)?
        .into_iter()
        .enumerate()
        .map(|(index, item)| decode_record(index, item))
        .collect()
}

/// Decodes a record list, dropping ownership trees that cannot be decoded
/// instead of failing.
///
/// A record whose tree is malformed is kept with no tree so it takes no
/// part in detection; anything else wrong with a record is still an error.
pub fn decode_records_lenient(input: &str) -> Result<DecodedHistory> {
    let mut decoded = DecodedHistory::default();

    for (index, mut item) in record_values(input)?.into_iter().enumerate() {
        match serde_json::from_value::<OwnershipRecord>(item.clone()) {
            Ok(record) => decoded.records.push(record),
            Err(err) => {
                let Some(fields) = item.as_object_mut().and_then(|obj| obj.remove("fieldsV1"))
                else {
                    return Err(record_error(index, err));
                };
                if fields.is_null() {
                    return Err(record_error(index, err));
                }
                let record = decode_record(index, item)?;
                warn!(
                    index,
                    manager = %record.manager,
                    error = %err,
                    "skipping undecodable ownership tree"
                );
                decoded.skipped.push(SkippedTree {
                    index,
                    manager: record.manager.clone(),
                    message: err.to_string(),
                });
                decoded.records.push(record);
            }
        }
    }

    Ok(decoded)
}

fn decode_record(index: usize, item: serde_json::Value) -> Result<OwnershipRecord> {
    serde_json::from_value(item).map_err(|e| record_error(index, e))
}

fn record_error(index: usize, err: serde_json::Error) -> Error {
    Error::decode(format!("managed fields entry {}: {}", index, err))
}

/// Parses the document and returns the raw record values it carries.
fn record_values(input: &str) -> Result<Vec<serde_json::Value>> {
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let document: serde_json::Value = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(input).map_err(|e| Error::input(format!("invalid JSON: {}", e)))?
    } else {
        serde_yaml::from_str(input).map_err(|e| Error::input(format!("invalid YAML: {}", e)))?
    };

    match document {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Array(items) => Ok(items),
        serde_json::Value::Object(mut obj) => {
            let managed = obj
                .get_mut("metadata")
                .and_then(|metadata| metadata.get_mut("managedFields"))
                .map(serde_json::Value::take);
            match managed {
                None | Some(serde_json::Value::Null) => Ok(Vec::new()),
                Some(serde_json::Value::Array(items)) => Ok(items),
                Some(_) => Err(Error::input("metadata.managedFields must be a list")),
            }
        }
        _ => Err(Error::input(
            "expected a list of managed fields entries or an object with metadata.managedFields",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldpath::FieldPath;
    use pretty_assertions::assert_eq;

    const LIST_YAML: &str = r#"
- apiVersion: apps/v1
  fieldsType: FieldsV1
  fieldsV1:
    f:spec:
      f:replicas: {}
  manager: kubectl-client-side-apply
  operation: Update
  time: "2044-06-17T19:56:27Z"
- manager: kube-controller-manager
  operation: Update
  subresource: status
"#;

    #[test]
    fn test_operation_from_string() {
        assert_eq!(Operation::from("Update"), Operation::Update);
        assert_eq!(Operation::from("Create"), Operation::Create);
        assert_eq!(Operation::from("Apply"), Operation::Apply);
        assert_eq!(Operation::from("Patch"), Operation::Other("Patch".to_string()));
        assert!(Operation::Create.is_create());
        assert!(!Operation::Update.is_create());
    }

    #[test]
    fn test_decode_yaml_list() {
        let records = decode_records(LIST_YAML).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.manager, "kubectl-client-side-apply");
        assert_eq!(first.operation, Operation::Update);
        assert_eq!(first.api_version.as_deref(), Some("apps/v1"));
        assert_eq!(
            first.time.unwrap().to_rfc3339(),
            "2044-06-17T19:56:27+00:00"
        );
        assert_eq!(
            first.fields.as_ref().unwrap().paths(),
            vec![FieldPath::from("/spec/replicas")]
        );

        let second = &records[1];
        assert_eq!(second.subresource.as_deref(), Some("status"));
        assert!(second.fields.is_none());
        assert!(second.time.is_none());
    }

    #[test]
    fn test_decode_json_resource() {
        let input = r#"{
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {
                "name": "web",
                "managedFields": [
                    {"manager": "a", "operation": "Apply", "fieldsV1": {"f:spec": {}}}
                ]
            }
        }"#;
        let records = decode_records(input).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].operation, Operation::Apply);
        assert_eq!(
            records[0].fields.as_ref().unwrap().paths(),
            vec![FieldPath::from("/spec")]
        );
    }

    #[test]
    fn test_decode_resource_without_managed_fields() {
        assert!(decode_records(r#"{"metadata":{"name":"web"}}"#).unwrap().is_empty());
        assert!(decode_records("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_bad_tree() {
        let input = r#"[{"manager":"a","operation":"Update","fieldsV1":{"f:spec":1}}]"#;
        let err = decode_records(input).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(err.to_string().contains("managed fields entry 0"));
    }

    #[test]
    fn test_decode_lenient_keeps_record_without_tree() {
        let input = r#"[
            {"manager":"a","operation":"Update","fieldsV1":{"f:spec":1}},
            {"manager":"b","operation":"Update","fieldsV1":{"f:spec":{}}}
        ]"#;
        let decoded = decode_records_lenient(input).unwrap();
        assert_eq!(decoded.records.len(), 2);
        assert!(decoded.records[0].fields.is_none());
        assert!(decoded.records[1].fields.is_some());
        assert_eq!(decoded.skipped.len(), 1);
        assert_eq!(decoded.skipped[0].index, 0);
        assert_eq!(decoded.skipped[0].manager, "a");
    }

    #[test]
    fn test_decode_lenient_still_rejects_other_errors() {
        let input = r#"[{"manager":"a","time":"not a time"}]"#;
        assert!(decode_records_lenient(input).is_err());
    }

    #[test]
    fn test_decode_rejects_scalars() {
        assert!(matches!(decode_records("42"), Err(Error::Input { .. })));
        assert!(matches!(
            decode_records(r#"{"metadata":{"managedFields":{}}}"#),
            Err(Error::Input { .. })
        ));
    }
}
