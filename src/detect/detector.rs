//! Detector for fields overwritten by external managers.

use super::{Conflict, Detection};
use crate::error::Error;
use crate::history::{is_tracked, latest_in_order, order_by_time, Operation, Ownership, OwnershipRecord};
use crate::pattern::OwnedRegion;
use tracing::{debug, trace, warn};

/// DetectorBuilder is a builder for creating a Detector.
#[derive(Debug, Clone)]
pub struct DetectorBuilder {
    excluded_operations: Vec<Operation>,
}

impl Default for DetectorBuilder {
    fn default() -> Self {
        DetectorBuilder {
            excluded_operations: vec![Operation::Create],
        }
    }
}

impl DetectorBuilder {
    /// Creates a new DetectorBuilder that excludes creations.
    pub fn new() -> Self {
        DetectorBuilder::default()
    }

    /// Excludes records with the given operation from both scans.
    pub fn exclude_operation(mut self, operation: Operation) -> Self {
        if !self.excluded_operations.contains(&operation) {
            self.excluded_operations.push(operation);
        }
        self
    }

    /// Replaces the excluded operations.
    pub fn excluded_operations(mut self, operations: Vec<Operation>) -> Self {
        self.excluded_operations = operations;
        self
    }

    /// Builds the Detector.
    pub fn build(self) -> Detector {
        Detector {
            excluded_operations: self.excluded_operations,
        }
    }
}

/// Detector finds writes by other managers into the fields an original
/// manager last wrote.
///
/// Detection never fails: missing or unusable ownership data yields an
/// empty [`Detection`].
#[derive(Debug, Clone)]
pub struct Detector {
    excluded_operations: Vec<Operation>,
}

impl Default for Detector {
    fn default() -> Self {
        DetectorBuilder::new().build()
    }
}

impl Detector {
    /// Creates a new DetectorBuilder.
    pub fn builder() -> DetectorBuilder {
        DetectorBuilder::new()
    }

    /// Returns the operations this detector ignores.
    pub fn excluded_operations(&self) -> &[Operation] {
        &self.excluded_operations
    }

    /// Checks `records` for writes by managers other than `original` that
    /// land inside the region `original` owns in its latest write.
    ///
    /// The records are scanned in time order over a local ordering; the
    /// slice itself is never reordered.
    pub fn detect(&self, original: &str, records: &[OwnershipRecord]) -> Detection {
        let mut detection = Detection::default();
        let ordered = order_by_time(records);

        let latest = match latest_in_order(original, &ordered, &self.excluded_operations) {
            Ownership::Managed(latest) => latest,
            Ownership::NotManaged => {
                debug!(manager = original, "manager has no tracked writes");
                return detection;
            }
        };

        let region = match OwnedRegion::from_tree(latest.tree) {
            Ok(region) => region,
            Err(Error::EmptyTree) => {
                debug!(manager = original, "latest write owns no fields");
                return detection;
            }
            Err(err) => {
                warn!(manager = original, error = %err, "cannot build owned region");
                return detection;
            }
        };
        debug!(
            manager = original,
            patterns = region.patterns().len(),
            "scanning history for external writes"
        );

        for record in ordered {
            if record.manager == original || !is_tracked(record, &self.excluded_operations) {
                continue;
            }
            let Some(tree) = record.fields.as_ref() else {
                continue;
            };

            // `None` sorts before any timestamp, so an untimed write is never after.
            let after_original = record.time > latest.time;
            for path in tree.paths() {
                if !region.touches(&path) {
                    continue;
                }
                trace!(manager = %record.manager, %path, after_original, "external write in owned region");
                detection.record(Conflict::new(
                    record.manager.clone(),
                    path,
                    record.time,
                    after_original,
                ));
            }
        }

        detection
    }
}

/// Reports whether `original`'s latest write was overwritten by another
/// manager, and which manager touched its fields last.
///
/// Returns `(false, "")` when `original` has nothing that could be
/// overwritten.
pub fn detect_external_manager(original: &str, records: &[OwnershipRecord]) -> (bool, String) {
    Detector::default().detect(original, records).into_summary()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fieldpath::{OwnershipTree, Segment};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2044, 6, 17, hour, 0, 0).unwrap()
    }

    fn spec(field: &str) -> OwnershipTree {
        OwnershipTree::node([(
            Segment::field("spec"),
            OwnershipTree::node([(Segment::field(field), OwnershipTree::Leaf)]),
        )])
    }

    fn write(manager: &str, operation: Operation, field: &str, hour: u32) -> OwnershipRecord {
        OwnershipRecord::new(manager, operation)
            .with_fields(spec(field))
            .at(at(hour))
    }

    #[test]
    fn test_builder_defaults_exclude_create() {
        let detector = Detector::builder().build();
        assert_eq!(detector.excluded_operations(), &[Operation::Create]);

        let detector = Detector::builder()
            .exclude_operation(Operation::Apply)
            .exclude_operation(Operation::Create)
            .build();
        assert_eq!(
            detector.excluded_operations(),
            &[Operation::Create, Operation::Apply]
        );
    }

    #[test]
    fn test_excluded_operations_are_configurable() {
        let records = vec![
            write("a", Operation::Update, "x", 2),
            write("b", Operation::Create, "x", 3),
        ];

        assert_eq!(Detector::default().detect("a", &records).summary(), (false, ""));

        let detector = Detector::builder().excluded_operations(vec![]).build();
        assert_eq!(detector.detect("a", &records).summary(), (true, "b"));
    }

    #[test]
    fn test_detect_leaves_input_order_alone() {
        let records = vec![
            write("b", Operation::Update, "x", 9),
            write("a", Operation::Update, "x", 1),
        ];
        let before = records.clone();
        let _ = Detector::default().detect("a", &records);
        assert_eq!(records, before);
    }

    #[test]
    fn test_detection_lists_conflicts_in_time_order() {
        let records = vec![
            write("c", Operation::Update, "x", 8),
            write("a", Operation::Update, "x", 5),
            write("b", Operation::Update, "x", 1),
        ];
        let detection = Detector::default().detect("a", &records);
        let managers: Vec<&str> = detection.conflicts.iter().map(|c| c.manager.as_str()).collect();
        assert_eq!(managers, vec!["b", "c"]);
        assert!(!detection.conflicts.iter().next().unwrap().after_original);
        assert!(detection.conflicts.last().unwrap().after_original);
        assert_eq!(detection.summary(), (true, "c"));
    }
}
