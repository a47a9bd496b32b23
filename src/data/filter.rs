use std::collections::BTreeSet;

use super::model::RaceTable;

// ---------------------------------------------------------------------------
// Year filters
// ---------------------------------------------------------------------------

/// Return a new table with the records of `table` whose `year` equals
/// `year`, in their original order.
pub fn filter_year(table: &RaceTable, year: i32) -> RaceTable {
    RaceTable::new(
        table
            .iter()
            .filter(|rec| rec.year == year)
            .cloned()
            .collect(),
    )
}

/// Distinct years present in `table`, most recent first.
pub fn distinct_years(table: &RaceTable) -> Vec<i32> {
    let years: BTreeSet<i32> = table.iter().map(|rec| rec.year).collect();
    years.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Checkpoint, RaceRecord, RaceStatus};

    fn rec(year: i32, group: i64) -> RaceRecord {
        RaceRecord {
            year,
            start_group: group,
            time: Some(6.0),
            race_status: RaceStatus::Finished,
            splits: [None; Checkpoint::COUNT],
        }
    }

    #[test]
    fn filter_keeps_only_matching_year() {
        let table = RaceTable::new(vec![rec(2022, 1), rec(2023, 2), rec(2022, 3)]);
        let y = filter_year(&table, 2022);
        assert_eq!(y.len(), 2);
        assert!(y.iter().all(|r| r.year == 2022));
        assert_eq!(y.records()[1].start_group, 3);
    }

    #[test]
    fn filter_unknown_year_is_empty() {
        let table = RaceTable::new(vec![rec(2022, 1)]);
        assert!(filter_year(&table, 1999).is_empty());
    }

    #[test]
    fn years_are_descending() {
        let table = RaceTable::new(vec![rec(2022, 1), rec(2023, 2), rec(2022, 3)]);
        assert_eq!(distinct_years(&table), vec![2023, 2022]);
        assert!(distinct_years(&RaceTable::default()).is_empty());
    }
}
