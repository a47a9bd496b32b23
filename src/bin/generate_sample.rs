use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use vasalytics::data::model::{
    Checkpoint, RaceRecord, RaceStatus, RaceTable, START_GROUPS, YearlyMeansTable,
};
use vasalytics::stats::trend::yearly_means;

/// Course position (km) of each checkpoint, in [`Checkpoint::ALL`] order.
const CHECKPOINT_KM: [f64; Checkpoint::COUNT] =
    [3.5, 11.0, 24.0, 35.0, 47.0, 62.0, 71.0, 81.0, 89.0];
const COURSE_KM: f64 = 90.0;

const YEARS: std::ops::RangeInclusive<i32> = 2018..=2024;
const PARTICIPANTS_PER_YEAR: usize = 3000;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }
}

fn participant(rng: &mut SimpleRng, year: i32) -> RaceRecord {
    let groups: Vec<i64> = START_GROUPS.collect();
    let start_group = groups[rng.below(groups.len())];

    // Later start groups are slower; conditions vary a little per year.
    let year_factor = 1.0 + ((year % 5) as f64 - 2.0) * 0.03;
    let finish = rng
        .gauss(4.5 + start_group as f64 * 0.55, 0.6 + start_group as f64 * 0.05)
        .max(3.6)
        * year_factor;

    let roll = rng.next_f64();
    let (race_status, reached) = if roll < 0.04 {
        (RaceStatus::DidNotStart, 0)
    } else if roll < 0.11 {
        (RaceStatus::DidNotFinish, rng.below(Checkpoint::COUNT))
    } else {
        (RaceStatus::Finished, Checkpoint::COUNT)
    };

    let mut splits = [None; Checkpoint::COUNT];
    for (i, slot) in splits.iter_mut().enumerate().take(reached) {
        // Pace drops slightly along the course.
        let fraction = (CHECKPOINT_KM[i] / COURSE_KM).powf(1.05);
        *slot = Some(finish * fraction);
    }

    RaceRecord {
        year,
        start_group,
        time: (race_status == RaceStatus::Finished).then_some(finish),
        race_status,
        splits,
    }
}

fn write_batch(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn records_batch(table: &RaceTable) -> Result<RecordBatch> {
    let mut fields = vec![
        Field::new("year", DataType::Int32, false),
        Field::new("start_group", DataType::Int64, false),
        Field::new("time", DataType::Float64, true),
        Field::new("race_status", DataType::Utf8, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(table.iter().map(|r| r.year))),
        Arc::new(Int64Array::from_iter_values(table.iter().map(|r| r.start_group))),
        Arc::new(table.iter().map(|r| r.time).collect::<Float64Array>()),
        Arc::new(
            table
                .iter()
                .map(|r| Some(r.race_status.to_string()))
                .collect::<StringArray>(),
        ),
    ];
    for cp in Checkpoint::ALL {
        fields.push(Field::new(cp.column_name(), DataType::Float64, true));
        columns.push(Arc::new(
            table.iter().map(|r| r.split(cp)).collect::<Float64Array>(),
        ));
    }
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

fn means_batch(means: &YearlyMeansTable) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("start_group", DataType::Int64, false),
        Field::new("mean_time", DataType::Float64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(means.rows.iter().map(|m| m.year))),
        Arc::new(Int64Array::from_iter_values(means.rows.iter().map(|m| m.start_group))),
        Arc::new(Float64Array::from_iter_values(means.rows.iter().map(|m| m.mean_time))),
    ];
    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let records: Vec<RaceRecord> = YEARS
        .flat_map(|year| (0..PARTICIPANTS_PER_YEAR).map(move |_| year))
        .map(|year| participant(&mut rng, year))
        .collect();
    let table = RaceTable::new(records);
    let means = yearly_means(&table);

    let out_dir = Path::new("data");
    std::fs::create_dir_all(out_dir).context("creating data directory")?;

    let records_path = out_dir.join("all.parquet");
    write_batch(&records_path, &records_batch(&table)?)?;
    let means_path = out_dir.join("mean_by_year.parquet");
    write_batch(&means_path, &means_batch(&means)?)?;

    println!(
        "Wrote {} race records to {} and {} yearly means to {}",
        table.len(),
        records_path.display(),
        means.len(),
        means_path.display()
    );
    Ok(())
}
