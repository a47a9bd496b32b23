use std::collections::BTreeMap;

use crate::data::model::{RaceStatus, RaceTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub start_group: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: RaceStatus,
    pub count: usize,
}

/// Registered participants per start group, ascending by group.  Groups
/// outside the usual range are kept as their own category.
pub fn start_group_counts(table: &RaceTable) -> Vec<GroupCount> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for rec in table {
        *counts.entry(rec.start_group).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(start_group, count)| GroupCount { start_group, count })
        .collect()
}

/// Participants per race status.
pub fn status_counts(table: &RaceTable) -> Vec<StatusCount> {
    let mut counts: BTreeMap<&RaceStatus, usize> = BTreeMap::new();
    for rec in table {
        *counts.entry(&rec.race_status).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(status, count)| StatusCount {
            status: status.clone(),
            count,
        })
        .collect()
}
