use std::collections::{BTreeMap, BTreeSet};

use super::{BinCount, Binning, mean};
use crate::data::model::{RaceTable, TimeColumn};

/// One density band of a ridgeline chart.
#[derive(Debug, Clone, PartialEq)]
pub struct RidgeBand {
    pub start_group: i64,
    /// Mean of the column over the group's present values.
    pub mean: f64,
    /// Bins shared by every band; bins this group never hit count zero.
    pub bins: Vec<BinCount>,
}

impl RidgeBand {
    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ridgeline {
    pub column: TimeColumn,
    /// One band per start group, ascending.
    pub bands: Vec<RidgeBand>,
}

impl Ridgeline {
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.bands.iter().map(RidgeBand::max_count).max().unwrap_or(0)
    }
}

/// Per start group distribution of `column`.
///
/// Records missing the column are dropped first.  All bands share the bins
/// observed in any group; a group lacking one of those bins counts zero
/// there.
pub fn ridgeline(table: &RaceTable, column: TimeColumn, bin_width: f64) -> Ridgeline {
    let binning = Binning::with_step(bin_width);

    let mut values: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for rec in table {
        if let Some(v) = rec.value(column) {
            values.entry(rec.start_group).or_default().push(v);
        }
    }

    let keys: BTreeSet<i64> = values
        .values()
        .flatten()
        .map(|&v| binning.index(v))
        .collect();

    let bands = values
        .into_iter()
        .filter_map(|(start_group, group_values)| {
            let mean = mean(group_values.iter().copied().map(Some))?;
            let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
            for &v in &group_values {
                *counts.entry(binning.index(v)).or_default() += 1;
            }
            let bins = keys
                .iter()
                .map(|&k| binning.bin(k, counts.get(&k).copied().unwrap_or(0)))
                .collect();
            Some(RidgeBand {
                start_group,
                mean,
                bins,
            })
        })
        .collect();

    Ridgeline { column, bands }
}
