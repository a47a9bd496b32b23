use std::collections::BTreeMap;

use super::{format_clock, mean};
use crate::data::model::{RaceRecord, RaceTable, TimeColumn};

/// Shown for a group with no recorded times at a checkpoint.
pub const NO_TIME: &str = "-";

#[derive(Debug, Clone, PartialEq)]
pub struct SplitMeanRow {
    pub start_group: i64,
    /// One mean per [`SplitMeanTable::columns`] entry.
    pub means: Vec<Option<f64>>,
}

impl SplitMeanRow {
    /// The means as `HH:MM:SS` strings.
    pub fn clock_strings(&self) -> Vec<String> {
        self.means
            .iter()
            .map(|m| m.map(format_clock).unwrap_or_else(|| NO_TIME.to_string()))
            .collect()
    }
}

/// Mean time at every checkpoint and at the finish, per start group.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitMeanTable {
    pub columns: Vec<TimeColumn>,
    pub rows: Vec<SplitMeanRow>,
}

pub fn split_means(table: &RaceTable) -> SplitMeanTable {
    let columns = TimeColumn::table_columns();
    let mut groups: BTreeMap<i64, Vec<&RaceRecord>> = BTreeMap::new();
    for rec in table {
        groups.entry(rec.start_group).or_default().push(rec);
    }

    let rows = groups
        .into_iter()
        .map(|(start_group, recs)| SplitMeanRow {
            start_group,
            means: columns
                .iter()
                .map(|&col| mean(recs.iter().map(|r| r.value(col))))
                .collect(),
        })
        .collect();

    SplitMeanTable { columns, rows }
}
