use std::collections::BTreeMap;

use crate::data::model::{RaceTable, TimeColumn};

/// Five-number summary with min–max whiskers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub start_group: i64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Finish-time spread per start group.
pub fn group_box_stats(table: &RaceTable) -> Vec<BoxStats> {
    let mut values: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for rec in table {
        if let Some(t) = rec.value(TimeColumn::Finish) {
            values.entry(rec.start_group).or_default().push(t);
        }
    }
    values
        .into_iter()
        .map(|(start_group, mut v)| {
            v.sort_by(f64::total_cmp);
            BoxStats {
                start_group,
                min: v[0],
                q1: quantile(&v, 0.25),
                median: quantile(&v, 0.5),
                q3: quantile(&v, 0.75),
                max: v[v.len() - 1],
            }
        })
        .collect()
}

/// Linear-interpolated quantile of sorted, non-empty `sorted`.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
