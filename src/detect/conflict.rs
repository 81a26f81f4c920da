//! Conflict types for drift detection.

use crate::fieldpath::FieldPath;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Conflict represents one external write landing inside the owned region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// The external manager that touched the field.
    pub manager: String,
    /// The path it touched.
    pub path: FieldPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    /// True if the write happened strictly after the original manager's
    /// latest write.
    pub after_original: bool,
}

impl Conflict {
    /// Creates a new conflict.
    pub fn new(
        manager: impl Into<String>,
        path: FieldPath,
        time: Option<DateTime<Utc>>,
        after_original: bool,
    ) -> Self {
        Conflict {
            manager: manager.into(),
            path,
            time,
            after_original,
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "manager '{}' touched {}", self.manager, self.path)?;
        if let Some(time) = self.time {
            write!(f, " at {}", time.to_rfc3339())?;
        }
        if self.after_original {
            write!(f, " (overwrite)")?;
        }
        Ok(())
    }
}

/// Conflicts is a collection of conflicts, in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conflicts {
    conflicts: Vec<Conflict>,
}

impl Conflicts {
    /// Creates a new empty Conflicts collection.
    pub fn new() -> Self {
        Conflicts {
            conflicts: Vec::new(),
        }
    }

    /// Adds a conflict.
    pub fn add(&mut self, conflict: Conflict) {
        self.conflicts.push(conflict);
    }

    /// Returns true if there are no conflicts.
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Returns the number of conflicts.
    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// Returns an iterator over the conflicts.
    pub fn iter(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter()
    }

    /// Returns the last conflict recorded.
    pub fn last(&self) -> Option<&Conflict> {
        self.conflicts.last()
    }
}

/// Detection is the outcome of one drift check.
///
/// `overwritten` answers whether anyone wrote into the owned region after
/// the original manager's latest write. `other_manager` names the manager
/// that touched the region last in time order, whether or not that touch
/// came after the original write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub overwritten: bool,
    pub other_manager: String,
    pub conflicts: Conflicts,
}

impl Detection {
    /// Records a conflict, updating the summary fields.
    ///
    /// `overwritten` is sticky; `other_manager` always follows the latest
    /// conflict.
    pub fn record(&mut self, conflict: Conflict) {
        if conflict.after_original {
            self.overwritten = true;
        }
        self.other_manager.clone_from(&conflict.manager);
        self.conflicts.add(conflict);
    }

    /// Returns the `(overwritten, other_manager)` summary.
    pub fn summary(&self) -> (bool, &str) {
        (self.overwritten, &self.other_manager)
    }

    pub fn into_summary(self) -> (bool, String) {
        (self.overwritten, self.other_manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_display() {
        let conflict = Conflict::new("manager1", FieldPath::from("/spec/x"), None, true);
        let rendered = format!("{}", conflict);
        assert!(rendered.contains("manager1"));
        assert!(rendered.contains("/spec/x"));
        assert!(rendered.contains("overwrite"));
    }

    #[test]
    fn test_conflicts_collection() {
        let mut conflicts = Conflicts::new();
        assert!(conflicts.is_empty());

        conflicts.add(Conflict::new("m1", FieldPath::from("/a"), None, false));
        assert!(!conflicts.is_empty());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts.last().unwrap().manager, "m1");
    }

    #[test]
    fn test_detection_overwritten_is_sticky() {
        let mut detection = Detection::default();
        detection.record(Conflict::new("b", FieldPath::from("/spec/x"), None, true));
        detection.record(Conflict::new("c", FieldPath::from("/spec/x"), None, false));

        assert_eq!(detection.summary(), (true, "c"));
        assert_eq!(detection.conflicts.len(), 2);
    }
}
