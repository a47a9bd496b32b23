//! Data access layer against on-disk fixtures.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, DictionaryArray, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array,
};
use arrow::datatypes::{DataType, Field, Int8Type, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use vasalytics::data::model::{Checkpoint, RaceStatus};
use vasalytics::data::{DataError, DataStore};
use vasalytics::stats::counts::start_group_counts;
use vasalytics::stats::splits::split_means;

const RECORDS_CSV: &str = "\
year,start_group,time,race_status,split_Eldris,split_Mora Förvarning
2022,0,4.0,Finished,3.5,3.9
2022,1,5.0,Finished,4.4,4.9
2022,1,,DNF,,
2023,0,3.5,Finished,3.1,3.4
2023,10,9.0,Finished,8.0,8.8
2023,12,8.0,Finished,,7.9
2023,3,,DNS,,
";

const MEANS_CSV: &str = "\
year,start_group,mean_time
2022,0,4.0
2022,1,5.0
2023,0,3.5
";

fn csv_store(dir: &Path) -> DataStore {
    std::fs::write(dir.join("all.csv"), RECORDS_CSV).unwrap();
    std::fs::write(dir.join("mean_by_year.csv"), MEANS_CSV).unwrap();
    DataStore::with_paths(dir, "all", "mean_by_year")
}

#[test]
fn test_years_are_most_recent_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = csv_store(dir.path());
    assert_eq!(*store.available_years().unwrap(), vec![2023, 2022]);
}

#[test]
fn test_year_frames_partition_the_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let store = csv_store(dir.path());
    let full = store.load_full_dataset().unwrap();

    let mut total = 0;
    for &year in store.available_years().unwrap().iter() {
        let frame = store.frame_for_year(year).unwrap();
        assert!(frame.iter().all(|r| r.year == year));
        total += frame.len();

        // Each frame keeps the full dataset's rows for that year, in order.
        let expected: Vec<_> = full.iter().filter(|r| r.year == year).cloned().collect();
        assert_eq!(frame.records(), expected.as_slice());
    }
    assert_eq!(total, full.len());
}

#[test]
fn test_group_counts_sum_to_frame_rows() {
    let dir = tempfile::tempdir().unwrap();
    let store = csv_store(dir.path());
    for &year in store.available_years().unwrap().iter() {
        let frame = store.frame_for_year(year).unwrap();
        let counts = start_group_counts(&frame);
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), frame.len());
    }

    // Group 12 is outside the usual range but still counted.
    let frame = store.frame_for_year(2023).unwrap();
    assert!(start_group_counts(&frame).iter().any(|c| c.start_group == 12));
}

#[test]
fn test_frames_are_memoized() {
    let dir = tempfile::tempdir().unwrap();
    let store = csv_store(dir.path());
    let first = store.frame_for_year(2022).unwrap();
    let second = store.frame_for_year(2022).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(store.cached_frames(), 1);

    // Source removal does not matter once the table is cached.
    std::fs::remove_file(dir.path().join("all.csv")).unwrap();
    assert_eq!(store.frame_for_year(2023).unwrap().len(), 4);
    assert!(Arc::ptr_eq(
        &store.load_full_dataset().unwrap(),
        &store.load_full_dataset().unwrap()
    ));
}

#[test]
fn test_empty_year_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = csv_store(dir.path());
    let frame = store.frame_for_year(1990).unwrap();
    assert!(frame.is_empty());
    assert!(start_group_counts(&frame).is_empty());
}

#[test]
fn test_split_means_skip_non_finishers() {
    let dir = tempfile::tempdir().unwrap();
    let store = csv_store(dir.path());
    let frame = store.frame_for_year(2022).unwrap();
    let table = split_means(&frame);
    let group1 = table.rows.iter().find(|r| r.start_group == 1).unwrap();
    assert_eq!(group1.means[Checkpoint::Eldris.index()], Some(4.4));
    assert_eq!(group1.clock_strings().last().unwrap(), "05:00:00");
}

#[test]
fn test_yearly_means_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let store = csv_store(dir.path());
    let means = store.load_yearly_means().unwrap();
    assert_eq!(means.len(), 3);
}

#[test]
fn test_missing_files_are_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataStore::with_paths(dir.path(), "all", "mean_by_year");
    assert!(matches!(
        store.load_full_dataset(),
        Err(DataError::Unavailable { .. })
    ));
    assert!(matches!(
        store.load_yearly_means(),
        Err(DataError::Unavailable { .. })
    ));
}

#[test]
fn test_concurrent_frame_requests_share_one_table() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(csv_store(dir.path()));
    let frames: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                s.spawn(move || store.frame_for_year(2023).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(frames.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn test_parquet_with_narrow_and_dictionary_columns() {
    let dir = tempfile::tempdir().unwrap();

    let status: DictionaryArray<Int8Type> = vec!["Finished", "DNF", "Finished"].into_iter().collect();
    let schema = Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("start_group", DataType::Int16, false),
        Field::new("time", DataType::Float32, true),
        Field::new(
            "race_status",
            DataType::Dictionary(Box::new(DataType::Int8), Box::new(DataType::Utf8)),
            false,
        ),
        Field::new(Checkpoint::Smagan.column_name(), DataType::Float32, true),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(vec![2021, 2021, 2024])),
        Arc::new(Int16Array::from(vec![2, 2, 5])),
        Arc::new(Float32Array::from(vec![Some(6.5), None, Some(7.25)])),
        Arc::new(status),
        Arc::new(Float32Array::from(vec![Some(1.5), Some(1.75), None])),
    ];
    let batch = RecordBatch::try_new(Arc::new(schema), columns).unwrap();

    let file = std::fs::File::create(dir.path().join("all.parquet")).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let store = DataStore::with_paths(dir.path(), "all", "mean_by_year");
    let full = store.load_full_dataset().unwrap();
    assert_eq!(full.len(), 3);
    let second = &full.records()[1];
    assert_eq!(second.start_group, 2);
    assert_eq!(second.time, None);
    assert_eq!(second.race_status, RaceStatus::DidNotFinish);
    assert_eq!(second.split(Checkpoint::Smagan), Some(1.75));
    assert_eq!(second.split(Checkpoint::Oxberg), None);
    assert_eq!(full.records()[2].time, Some(7.25));
    assert_eq!(*store.available_years().unwrap(), vec![2024, 2021]);
}

#[test]
fn test_parquet_yearly_means() {
    let dir = tempfile::tempdir().unwrap();

    let schema = Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("start_group", DataType::Int64, false),
        Field::new("mean_time", DataType::Float64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(vec![2022, 2022, 2023])),
        Arc::new(Int64Array::from(vec![0i64, 1, 0])),
        Arc::new(Float64Array::from(vec![4.5, 5.25, 4.4])),
    ];
    let batch = RecordBatch::try_new(Arc::new(schema), columns).unwrap();

    let file = std::fs::File::create(dir.path().join("mean_by_year.parquet")).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let store = DataStore::with_paths(dir.path(), "all", "mean_by_year");
    let means = store.load_yearly_means().unwrap();
    assert_eq!(means.len(), 3);
    assert_eq!(means.rows[1].year, 2022);
    assert_eq!(means.rows[1].start_group, 1);
    assert_eq!(means.rows[1].mean_time, 5.25);
    assert_eq!(means.rows[2].year, 2023);
    assert!(Arc::ptr_eq(&means, &store.load_yearly_means().unwrap()));

    // Records are resolved separately and are absent here.
    assert!(matches!(
        store.load_full_dataset(),
        Err(DataError::Unavailable { .. })
    ));
}
