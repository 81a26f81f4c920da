//! Time ordering and latest-write selection over ownership history.

use super::record::{Operation, OwnershipRecord};
use crate::fieldpath::OwnershipTree;
use chrono::{DateTime, Utc};

/// LatestWrite is the most recent tracked write of one manager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatestWrite<'a> {
    pub record: &'a OwnershipRecord,
    pub tree: &'a OwnershipTree,
    pub time: Option<DateTime<Utc>>,
}

/// Ownership is the outcome of looking up a manager's latest write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ownership<'a> {
    /// The manager never wrote a tracked field.
    NotManaged,
    Managed(LatestWrite<'a>),
}

impl<'a> Ownership<'a> {
    /// Returns true if the manager has a tracked write.
    pub fn is_managed(&self) -> bool {
        matches!(self, Ownership::Managed(_))
    }

    pub fn latest(&self) -> Option<&LatestWrite<'a>> {
        match self {
            Ownership::Managed(write) => Some(write),
            Ownership::NotManaged => None,
        }
    }
}

/// Returns the records ordered by time, oldest first.
///
/// Records without a timestamp sort before every timestamped record and
/// keep their relative input order. The input slice is left untouched.
pub fn order_by_time(records: &[OwnershipRecord]) -> Vec<&OwnershipRecord> {
    let mut ordered: Vec<&OwnershipRecord> = records.iter().collect();
    // `None < Some(_)` and the sort is stable.
    ordered.sort_by_key(|record| record.time);
    ordered
}

/// Returns true if the record takes part in detection at all.
pub(crate) fn is_tracked(record: &OwnershipRecord, excluded: &[Operation]) -> bool {
    record.fields.is_some() && !excluded.contains(&record.operation)
}

/// Finds the latest tracked write of `manager` among time-ordered records.
///
/// With the records in ascending time order, the last match carries the
/// greatest timestamp, and among equal timestamps the one seen last wins.
pub(crate) fn latest_in_order<'a>(
    manager: &str,
    ordered: &[&'a OwnershipRecord],
    excluded: &[Operation],
) -> Ownership<'a> {
    ordered
        .iter()
        .copied()
        .filter(|record| record.manager == manager && is_tracked(record, excluded))
        .filter_map(|record| {
            record.fields.as_ref().map(|tree| LatestWrite {
                record,
                tree,
                time: record.time,
            })
        })
        .last()
        .map_or(Ownership::NotManaged, Ownership::Managed)
}

/// Finds the latest non-creation write of `manager` that carries an
/// ownership tree.
pub fn latest_owned<'a>(manager: &str, records: &'a [OwnershipRecord]) -> Ownership<'a> {
    latest_in_order(manager, &order_by_time(records), &[Operation::Create])
}
