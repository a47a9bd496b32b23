use std::collections::BTreeMap;

use super::{BinCount, Binning};
use crate::data::model::{RaceTable, TimeColumn};

/// Finish-time distribution of one start group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupHistogram {
    pub start_group: i64,
    /// Populated bins only, ascending.
    pub bins: Vec<BinCount>,
}

/// Finish-time histograms for every start group, to be overlaid.
pub fn layered_histogram(table: &RaceTable, bin_width: f64) -> Vec<GroupHistogram> {
    let binning = Binning::with_step(bin_width);
    let mut counts: BTreeMap<i64, BTreeMap<i64, usize>> = BTreeMap::new();
    for rec in table {
        if let Some(t) = rec.value(TimeColumn::Finish) {
            *counts
                .entry(rec.start_group)
                .or_default()
                .entry(binning.index(t))
                .or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(start_group, bins)| GroupHistogram {
            start_group,
            bins: bins
                .into_iter()
                .map(|(idx, count)| binning.bin(idx, count))
                .collect(),
        })
        .collect()
}

/// Finish-time histogram of a single start group.
pub fn group_histogram(table: &RaceTable, start_group: i64, binning: Binning) -> Vec<BinCount> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for t in table
        .iter()
        .filter(|rec| rec.start_group == start_group)
        .filter_map(|rec| rec.value(TimeColumn::Finish))
    {
        *counts.entry(binning.index(t)).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(idx, count)| binning.bin(idx, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::testutil::table;

    #[test]
    fn layered_bins_per_group() {
        let t = table(&[
            (1, Some(4.1)),
            (1, Some(4.2)),
            (1, Some(4.9)),
            (2, Some(6.0)),
            (2, None),
        ]);
        let hist = layered_histogram(&t, 0.25);
        assert_eq!(hist.len(), 2);
        assert_eq!(hist[0].start_group, 1);
        assert_eq!(hist[0].bins.len(), 2);
        assert_eq!(hist[0].bins[0].start, 4.0);
        assert_eq!(hist[0].bins[0].count, 2);
        assert_eq!(hist[0].bins[1].start, 4.75);
        assert_eq!(hist[1].bins[0].count, 1);
    }

    #[test]
    fn single_group_uses_anchor() {
        let t = table(&[(3, Some(3.2)), (3, Some(3.4)), (3, Some(4.1)), (4, Some(3.3))]);
        let bins = group_histogram(&t, 3, Binning::new(3.0, 0.5));
        assert_eq!(bins.len(), 2);
        assert_eq!((bins[0].start, bins[0].count), (3.0, 2));
        assert_eq!((bins[1].start, bins[1].count), (4.0, 1));
        assert!(group_histogram(&t, 9, Binning::new(3.0, 0.5)).is_empty());
    }

    #[test]
    fn empty_table_produces_nothing() {
        assert!(layered_histogram(&RaceTable::default(), 0.25).is_empty());
    }
}
