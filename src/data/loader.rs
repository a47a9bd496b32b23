use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::{
    Checkpoint, RaceRecord, RaceStatus, RaceTable, YearlyMean, YearlyMeansTable,
};

/// Extensions tried, in order, when resolving a table by stem.
pub const EXTENSIONS: [&str; 3] = ["parquet", "csv", "json"];

const STATUS_UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Parquet,
    Csv,
    Json,
}

fn format_of(path: &Path) -> Option<Format> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "parquet" | "pq" => Some(Format::Parquet),
        "csv" => Some(Format::Csv),
        "json" => Some(Format::Json),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Find `<dir>/<stem>.<ext>` for the first extension in [`EXTENSIONS`] that
/// exists.  When none does, the error names the preferred Parquet path.
pub fn resolve(dir: &Path, stem: &str) -> Result<PathBuf, DataError> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
        .ok_or_else(|| DataError::Unavailable {
            path: dir.join(format!("{stem}.{}", EXTENSIONS[0])),
            reason: "file not found".to_string(),
        })
}

/// Load the race-records table.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – columns `year`, `start_group`, `time`, `race_status`,
///   `split_<checkpoint>` (recommended)
/// * `.csv`     – same columns, empty cells are missing values
/// * `.json`    – `[{ "year": 2023, "start_group": 4, ... }, ...]`
pub fn load_records(path: &Path) -> Result<RaceTable, DataError> {
    let format = format_of(path).ok_or_else(|| DataError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let records = match format {
        Format::Parquet => records_from_parquet(path),
        Format::Csv => records_from_csv(path),
        Format::Json => records_from_json(path),
    }
    .map_err(|e| DataError::unavailable(path, &e))?;
    Ok(RaceTable::new(records))
}

/// Load the precomputed mean-per-year table (`year`, `start_group`,
/// `mean_time`).
pub fn load_yearly_means(path: &Path) -> Result<YearlyMeansTable, DataError> {
    let format = format_of(path).ok_or_else(|| DataError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let rows = match format {
        Format::Parquet => means_from_parquet(path),
        Format::Csv => means_from_csv(path),
        Format::Json => means_from_json(path),
    }
    .map_err(|e| DataError::unavailable(path, &e))?;
    Ok(YearlyMeansTable { rows })
}

fn build_year(raw: i64, row: usize) -> Result<i32> {
    i32::try_from(raw).with_context(|| format!("Row {row}: year {raw} out of range"))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

fn read_batches(path: &Path) -> Result<Vec<RecordBatch>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;
    reader
        .map(|batch| batch.context("reading parquet record batch"))
        .collect()
}

fn records_from_parquet(path: &Path) -> Result<Vec<RaceRecord>> {
    let records = records_from_batches(&read_batches(path)?)?;
    warn_empty_splits(path, &records);
    Ok(records)
}

/// Rows are numbered across batches, so errors name the file row.
fn records_from_batches(batches: &[RecordBatch]) -> Result<Vec<RaceRecord>> {
    let mut records = Vec::new();
    let mut offset = 0;

    for batch in batches {
        let years = int_column(required(batch, "year")?, "year")?;
        let groups = int_column(required(batch, "start_group")?, "start_group")?;
        let times = float_column(required(batch, "time")?, "time")?;
        let statuses = string_column(required(batch, "race_status")?, "race_status")?;

        // Split columns may be absent; they then read as missing throughout.
        let mut splits: Vec<Option<Vec<Option<f64>>>> = Vec::with_capacity(Checkpoint::COUNT);
        for cp in Checkpoint::ALL {
            let values = match batch.column_by_name(cp.column_name()) {
                Some(col) => Some(float_column(col, cp.column_name())?),
                None => None,
            };
            splits.push(values);
        }

        for row in 0..batch.num_rows() {
            let row_no = offset + row;
            let year = years[row].with_context(|| format!("Row {row_no}: null 'year'"))?;
            let start_group =
                groups[row].with_context(|| format!("Row {row_no}: null 'start_group'"))?;

            let mut split_values = [None; Checkpoint::COUNT];
            for (slot, column) in split_values.iter_mut().zip(&splits) {
                *slot = column.as_ref().and_then(|values| values[row]);
            }

            records.push(RaceRecord {
                year: build_year(year, row_no)?,
                start_group,
                time: times[row],
                race_status: RaceStatus::parse(
                    statuses[row].as_deref().unwrap_or(STATUS_UNKNOWN),
                ),
                splits: split_values,
            });
        }
        offset += batch.num_rows();
    }

    Ok(records)
}

fn means_from_parquet(path: &Path) -> Result<Vec<YearlyMean>> {
    means_from_batches(&read_batches(path)?)
}

fn means_from_batches(batches: &[RecordBatch]) -> Result<Vec<YearlyMean>> {
    let mut rows = Vec::new();
    let mut offset = 0;
    for batch in batches {
        let years = int_column(required(batch, "year")?, "year")?;
        let groups = int_column(required(batch, "start_group")?, "start_group")?;
        let means = float_column(required(batch, "mean_time")?, "mean_time")?;

        for row in 0..batch.num_rows() {
            let (Some(year), Some(start_group), Some(mean_time)) =
                (years[row], groups[row], means[row])
            else {
                continue;
            };
            rows.push(YearlyMean {
                year: build_year(year, offset + row)?,
                start_group,
                mean_time,
            });
        }
        offset += batch.num_rows();
    }
    Ok(rows)
}

fn warn_empty_splits(path: &Path, records: &[RaceRecord]) {
    if records.is_empty() {
        return;
    }
    for cp in Checkpoint::ALL {
        if records.iter().all(|r| r.split(cp).is_none()) {
            log::warn!("{}: no values for '{}'", path.display(), cp.column_name());
        }
    }
}

// -- Arrow helpers --

fn required<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .with_context(|| format!("missing '{name}' column"))
}

/// Read any integer-like column as `i64`.
fn int_column(col: &ArrayRef, name: &str) -> Result<Vec<Option<i64>>> {
    let cast_col = cast(col, &DataType::Int64)
        .with_context(|| format!("column '{name}' ({:?}) is not an integer", col.data_type()))?;
    Ok(cast_col.as_primitive::<Int64Type>().iter().collect())
}

/// Read a numeric column as `f64`; NaN counts as missing.
fn float_column(col: &ArrayRef, name: &str) -> Result<Vec<Option<f64>>> {
    let cast_col = cast(col, &DataType::Float64)
        .with_context(|| format!("column '{name}' ({:?}) is not numeric", col.data_type()))?;
    Ok(cast_col
        .as_primitive::<Float64Type>()
        .iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

/// Read a text or dictionary-encoded column as owned strings.
fn string_column(col: &ArrayRef, name: &str) -> Result<Vec<Option<String>>> {
    let cast_col = cast(col, &DataType::Utf8)
        .with_context(|| format!("column '{name}' ({:?}) is not text", col.data_type()))?;
    let strings = cast_col.as_string::<i32>();
    Ok((0..strings.len())
        .map(|i| (!strings.is_null(i)).then(|| strings.value(i).to_string()))
        .collect())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

struct CsvColumns {
    headers: Vec<String>,
}

impl CsvColumns {
    fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn required(&self, name: &str) -> Result<usize> {
        self.position(name)
            .with_context(|| format!("CSV missing '{name}' column"))
    }
}

fn csv_reader(path: &Path) -> Result<(csv::Reader<std::fs::File>, CsvColumns)> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    Ok((reader, CsvColumns { headers }))
}

fn records_from_csv(path: &Path) -> Result<Vec<RaceRecord>> {
    let (mut reader, columns) = csv_reader(path)?;
    let year_idx = columns.required("year")?;
    let group_idx = columns.required("start_group")?;
    let time_idx = columns.required("time")?;
    let status_idx = columns.required("race_status")?;

    let split_idx: Vec<Option<usize>> = Checkpoint::ALL
        .iter()
        .map(|cp| columns.position(cp.column_name()))
        .collect();
    for (cp, idx) in Checkpoint::ALL.iter().zip(&split_idx) {
        if idx.is_none() {
            log::warn!("{}: no '{}' column", path.display(), cp.column_name());
        }
    }

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row}"))?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let year = parse_int(cell(year_idx))
            .with_context(|| format!("CSV row {row}: invalid 'year'"))?;
        let start_group = parse_int(cell(group_idx))
            .with_context(|| format!("CSV row {row}: invalid 'start_group'"))?;
        let time = parse_opt_float(cell(time_idx))
            .with_context(|| format!("CSV row {row}: invalid 'time'"))?;

        let mut splits = [None; Checkpoint::COUNT];
        for (slot, idx) in splits.iter_mut().zip(&split_idx) {
            if let Some(idx) = idx {
                *slot = parse_opt_float(cell(*idx))
                    .with_context(|| format!("CSV row {row}: invalid split value"))?;
            }
        }

        let status = cell(status_idx);
        records.push(RaceRecord {
            year: build_year(year, row)?,
            start_group,
            time,
            race_status: RaceStatus::parse(if status.is_empty() { STATUS_UNKNOWN } else { status }),
            splits,
        });
    }
    Ok(records)
}

fn means_from_csv(path: &Path) -> Result<Vec<YearlyMean>> {
    let (mut reader, columns) = csv_reader(path)?;
    let year_idx = columns.required("year")?;
    let group_idx = columns.required("start_group")?;
    let mean_idx = columns.required("mean_time")?;

    let mut rows = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row}"))?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");
        let Some(mean_time) = parse_opt_float(cell(mean_idx))
            .with_context(|| format!("CSV row {row}: invalid 'mean_time'"))?
        else {
            continue;
        };
        rows.push(YearlyMean {
            year: build_year(parse_int(cell(year_idx))?, row)?,
            start_group: parse_int(cell(group_idx))?,
            mean_time,
        });
    }
    Ok(rows)
}

/// Integers may be written as `3` or `3.0` (Pandas floats a column that
/// once held a missing value).
fn parse_int(s: &str) -> Result<i64> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Ok(i);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        _ => bail!("'{s}' is not an integer"),
    }
}

fn parse_opt_float(s: &str) -> Result<Option<f64>> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    let v = s
        .parse::<f64>()
        .with_context(|| format!("'{s}' is not a number"))?;
    Ok(Some(v).filter(|x| x.is_finite()))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// One object of a records-oriented export (`df.to_json(orient='records')`).
#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(deserialize_with = "integral")]
    year: i64,
    #[serde(deserialize_with = "integral")]
    start_group: i64,
    #[serde(default)]
    time: Option<f64>,
    #[serde(default)]
    race_status: Option<String>,
    /// Split columns and anything else the export carries.
    #[serde(flatten)]
    rest: BTreeMap<String, JsonValue>,
}

#[derive(Debug, Deserialize)]
struct JsonMean {
    #[serde(deserialize_with = "integral")]
    year: i64,
    #[serde(deserialize_with = "integral")]
    start_group: i64,
    #[serde(default)]
    mean_time: Option<f64>,
}

fn integral<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let v = f64::deserialize(deserializer)?;
    if v.is_finite() && v.fract() == 0.0 {
        Ok(v as i64)
    } else {
        Err(serde::de::Error::custom(format!("{v} is not an integer")))
    }
}

fn records_from_json(path: &Path) -> Result<Vec<RaceRecord>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let rows: Vec<JsonRecord> = serde_json::from_str(&text).context("parsing JSON")?;

    rows.into_iter()
        .enumerate()
        .map(|(row, rec)| -> Result<RaceRecord> {
            let mut splits = [None; Checkpoint::COUNT];
            for (slot, cp) in splits.iter_mut().zip(Checkpoint::ALL) {
                *slot = match rec.rest.get(cp.column_name()) {
                    None | Some(JsonValue::Null) => None,
                    Some(v) => Some(v.as_f64().with_context(|| {
                        format!("Row {row}: '{}' is not a number", cp.column_name())
                    })?),
                };
            }
            Ok(RaceRecord {
                year: build_year(rec.year, row)?,
                start_group: rec.start_group,
                time: rec.time.filter(|x| x.is_finite()),
                race_status: RaceStatus::parse(
                    rec.race_status.as_deref().unwrap_or(STATUS_UNKNOWN),
                ),
                splits,
            })
        })
        .collect()
}

fn means_from_json(path: &Path) -> Result<Vec<YearlyMean>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let rows: Vec<JsonMean> = serde_json::from_str(&text).context("parsing JSON")?;

    let mut out = Vec::with_capacity(rows.len());
    for (row, m) in rows.into_iter().enumerate() {
        if let Some(mean_time) = m.mean_time {
            out.push(YearlyMean {
                year: build_year(m.year, row)?,
                start_group: m.start_group,
                mean_time,
            });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::io::Write;
    use std::sync::Arc;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_records_with_missing_splits() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "all.csv",
            "year,start_group,time,race_status,split_Smågan\n\
             2023,0,5.5,Finished,1.25\n\
             2023,3.0,,DNF,\n",
        );
        let table = load_records(&path).unwrap();
        assert_eq!(table.len(), 2);
        let first = &table.records()[0];
        assert_eq!(first.time, Some(5.5));
        assert_eq!(first.split(Checkpoint::Smagan), Some(1.25));
        assert_eq!(first.split(Checkpoint::Oxberg), None);
        let second = &table.records()[1];
        assert_eq!(second.start_group, 3);
        assert_eq!(second.time, None);
        assert_eq!(second.race_status, RaceStatus::DidNotFinish);
    }

    #[test]
    fn csv_without_required_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "all.csv", "year,time\n2023,5.0\n");
        let err = load_records(&path).unwrap_err();
        assert!(matches!(err, DataError::Unavailable { .. }));
        assert!(err.to_string().contains("start_group"));
    }

    #[test]
    fn json_records_read_splits_by_column_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "all.json",
            r#"[
                {"year": 2022, "start_group": 1, "time": 6.0, "race_status": "Finished",
                 "split_Högsta punkten": 0.9, "split_Eldris": null, "name": "x"},
                {"year": 2022.0, "start_group": 10, "time": null, "race_status": "DNS"}
            ]"#,
        );
        let table = load_records(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].split(Checkpoint::HogstaPunkten), Some(0.9));
        assert_eq!(table.records()[0].split(Checkpoint::Eldris), None);
        assert_eq!(table.records()[1].race_status, RaceStatus::DidNotStart);
    }

    #[test]
    fn malformed_json_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "all.json", "{ not json");
        assert!(matches!(
            load_records(&path),
            Err(DataError::Unavailable { .. })
        ));
    }

    #[test]
    fn means_skip_missing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "mean_by_year.csv",
            "year,start_group,mean_time\n2022,0,4.5\n2022,1,\n2023,0,4.4\n",
        );
        let means = load_yearly_means(&path).unwrap();
        assert_eq!(means.len(), 2);
        assert_eq!(means.rows[1].year, 2023);
    }

    #[test]
    fn json_means_skip_null_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "mean_by_year.json",
            r#"[{"year": 2022, "start_group": 0, "mean_time": 4.5},
                {"year": 2022, "start_group": 1, "mean_time": null},
                {"year": 2023.0, "start_group": 0, "mean_time": 4.4},
                {"year": 2023, "start_group": 1}]"#,
        );
        let means = load_yearly_means(&path).unwrap();
        assert_eq!(means.len(), 2);
        assert_eq!(means.rows[0].mean_time, 4.5);
        assert_eq!(means.rows[1].year, 2023);
        assert_eq!(means.rows[1].start_group, 0);
    }

    fn records_batch(years: Vec<Option<i32>>) -> RecordBatch {
        let n = years.len();
        let schema = Schema::new(vec![
            Field::new("year", DataType::Int32, true),
            Field::new("start_group", DataType::Int64, false),
            Field::new("time", DataType::Float64, true),
            Field::new("race_status", DataType::Utf8, true),
        ]);
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(years)),
            Arc::new(Int64Array::from(vec![1i64; n])),
            Arc::new(Float64Array::from(vec![Some(5.0); n])),
            Arc::new(StringArray::from(vec![Some("Finished"); n])),
        ];
        RecordBatch::try_new(Arc::new(schema), columns).unwrap()
    }

    #[test]
    fn parquet_errors_name_the_row_across_batches() {
        let batches = [
            records_batch(vec![Some(2023), Some(2023)]),
            records_batch(vec![Some(2024), None]),
        ];
        let err = records_from_batches(&batches).unwrap_err();
        assert!(err.to_string().contains("Row 3: null 'year'"), "{err}");

        let ok = records_from_batches(&batches[..1]).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok[1].race_status, RaceStatus::Finished);
    }

    #[test]
    fn parquet_means_number_rows_across_batches() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("year", DataType::Int64, false),
            Field::new("start_group", DataType::Int64, false),
            Field::new("mean_time", DataType::Float64, true),
        ]));
        let batch = |years: Vec<i64>, means: Vec<Option<f64>>| {
            let n = years.len();
            let columns: Vec<ArrayRef> = vec![
                Arc::new(Int64Array::from(years)),
                Arc::new(Int64Array::from(vec![0i64; n])),
                Arc::new(Float64Array::from(means)),
            ];
            RecordBatch::try_new(Arc::clone(&schema), columns).unwrap()
        };

        let batches = [
            batch(vec![2022, 2023], vec![Some(4.5), None]),
            batch(vec![2024, i64::MAX], vec![Some(4.4), Some(4.3)]),
        ];
        let err = means_from_batches(&batches).unwrap_err();
        assert!(err.to_string().contains("Row 3"), "{err}");

        let rows = means_from_batches(&batches[..1]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, 2022);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = load_records(Path::new("data/all.pkl")).unwrap_err();
        assert!(matches!(err, DataError::UnsupportedFormat { .. }));
    }

    #[test]
    fn resolve_prefers_parquet_then_csv() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve(dir.path(), "all").is_err());
        write(dir.path(), "all.json", "[]");
        write(dir.path(), "all.csv", "");
        assert_eq!(resolve(dir.path(), "all").unwrap(), dir.path().join("all.csv"));
    }

    #[test]
    fn integer_parsing_accepts_float_text() {
        assert_eq!(parse_int("4").unwrap(), 4);
        assert_eq!(parse_int("4.0").unwrap(), 4);
        assert!(parse_int("4.5").is_err());
        assert_eq!(parse_opt_float("NaN").unwrap(), None);
    }
}
