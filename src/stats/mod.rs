//! Aggregates feeding the dashboard charts.
//!
//! Every function takes an immutable table and returns a plain summary; an
//! empty table yields an empty summary.  Missing values are skipped before
//! any averaging or binning.

pub mod boxplot;
pub mod counts;
pub mod histogram;
pub mod ridgeline;
pub mod splits;
pub mod trend;

/// Mean of the present values; `None` when there are none.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, n) = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Format a duration in fractional hours as `HH:MM:SS`, rounded to the
/// nearest second.  Hours are not wrapped at 24.
pub fn format_clock(hours: f64) -> String {
    let total = (hours * 3600.0).round().max(0.0) as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, total % 3600 / 60, total % 60)
}

// ---------------------------------------------------------------------------
// Fixed-width binning
// ---------------------------------------------------------------------------

/// Buckets `[anchor + i·step, anchor + (i+1)·step)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binning {
    pub anchor: f64,
    pub step: f64,
}

impl Binning {
    pub fn new(anchor: f64, step: f64) -> Self {
        Binning { anchor, step }
    }

    /// Bins aligned on zero.
    pub fn with_step(step: f64) -> Self {
        Binning { anchor: 0.0, step }
    }

    /// Bucket index of `value`.
    pub fn index(&self, value: f64) -> i64 {
        // Tolerate representation error right at a bin edge (0.3 / 0.1).
        ((value - self.anchor) / self.step + 1e-9).floor() as i64
    }

    pub fn bin(&self, index: i64, count: usize) -> BinCount {
        let start = self.anchor + index as f64 * self.step;
        BinCount {
            start,
            end: start + self.step,
            count,
        }
    }
}

/// Number of values falling in one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinCount {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl BinCount {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}
