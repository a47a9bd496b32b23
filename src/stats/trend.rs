use std::collections::BTreeMap;

use super::mean;
use crate::data::model::{RaceTable, TimeColumn, YearlyMean, YearlyMeansTable};

/// Mean finish time of one start group over the years.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub start_group: i64,
    /// `(year, mean_time)` ascending by year.
    pub points: Vec<(i32, f64)>,
}

/// Derive the mean-per-year table from race records.  Groups without a
/// single finish time in a year are left out.
pub fn yearly_means(table: &RaceTable) -> YearlyMeansTable {
    let mut times: BTreeMap<(i32, i64), Vec<Option<f64>>> = BTreeMap::new();
    for rec in table {
        times
            .entry((rec.year, rec.start_group))
            .or_default()
            .push(rec.value(TimeColumn::Finish));
    }
    let rows = times
        .into_iter()
        .filter_map(|((year, start_group), values)| {
            Some(YearlyMean {
                year,
                start_group,
                mean_time: mean(values)?,
            })
        })
        .collect();
    YearlyMeansTable { rows }
}

/// Regroup the mean-per-year table into one series per start group.
pub fn trend_series(means: &YearlyMeansTable) -> Vec<TrendSeries> {
    let mut series: BTreeMap<i64, BTreeMap<i32, f64>> = BTreeMap::new();
    for row in &means.rows {
        series
            .entry(row.start_group)
            .or_default()
            .insert(row.year, row.mean_time);
    }
    series
        .into_iter()
        .map(|(start_group, points)| TrendSeries {
            start_group,
            points: points.into_iter().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RaceRecord;
    use crate::stats::testutil::rec;

    fn in_year(year: i32, group: i64, time: Option<f64>) -> RaceRecord {
        RaceRecord { year, ..rec(group, time) }
    }

    #[test]
    fn means_per_year_and_group() {
        let t = RaceTable::new(vec![
            in_year(2022, 1, Some(5.0)),
            in_year(2022, 1, Some(7.0)),
            in_year(2022, 1, None),
            in_year(2023, 1, Some(4.0)),
            in_year(2023, 2, None),
        ]);
        let m = yearly_means(&t);
        assert_eq!(
            m.rows,
            vec![
                YearlyMean { year: 2022, start_group: 1, mean_time: 6.0 },
                YearlyMean { year: 2023, start_group: 1, mean_time: 4.0 },
            ]
        );
    }

    #[test]
    fn series_are_sorted_by_year() {
        let means = YearlyMeansTable {
            rows: vec![
                YearlyMean { year: 2023, start_group: 0, mean_time: 4.2 },
                YearlyMean { year: 2021, start_group: 0, mean_time: 4.5 },
                YearlyMean { year: 2022, start_group: 3, mean_time: 7.0 },
            ],
        };
        let s = trend_series(&means);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].points, vec![(2021, 4.5), (2023, 4.2)]);
        assert_eq!(s[1].start_group, 3);
        assert!(trend_series(&YearlyMeansTable::default()).is_empty());
    }
}
