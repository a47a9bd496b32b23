use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::cache::MemoCache;
use super::error::DataError;
use super::filter::{distinct_years, filter_year};
use super::loader;
use super::model::{RaceTable, YearlyMeansTable};
use crate::config::DashboardConfig;

// ---------------------------------------------------------------------------
// DataStore – memoized access to the on-disk tables
// ---------------------------------------------------------------------------

/// Owns every cached table for the lifetime of the process.
///
/// Constructed once at start-up and shared by `Arc`; all methods take
/// `&self` and are safe to call from several threads.
pub struct DataStore {
    data_dir: PathBuf,
    records_stem: String,
    means_stem: String,

    full: OnceCell<Arc<RaceTable>>,
    means: OnceCell<Arc<YearlyMeansTable>>,
    years: OnceCell<Arc<Vec<i32>>>,
    frames: MemoCache<i32, Arc<RaceTable>>,
}

impl DataStore {
    pub fn new(config: &DashboardConfig) -> Self {
        Self::with_paths(&config.data_dir, &config.records_stem, &config.means_stem)
    }

    pub fn with_paths(data_dir: &Path, records_stem: &str, means_stem: &str) -> Self {
        DataStore {
            data_dir: data_dir.to_path_buf(),
            records_stem: records_stem.to_string(),
            means_stem: means_stem.to_string(),
            full: OnceCell::new(),
            means: OnceCell::new(),
            years: OnceCell::new(),
            frames: MemoCache::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The complete race-records table.
    pub fn load_full_dataset(&self) -> Result<Arc<RaceTable>, DataError> {
        self.full
            .get_or_try_init(|| {
                let path = loader::resolve(&self.data_dir, &self.records_stem)?;
                let table = loader::load_records(&path).inspect_err(|e| {
                    log::error!("Failed to load race records: {e}");
                })?;
                log::info!("Loaded {} race records from {}", table.len(), path.display());
                Ok(Arc::new(table))
            })
            .map(Arc::clone)
    }

    /// The precomputed mean-time-per-(year, start group) table.
    pub fn load_yearly_means(&self) -> Result<Arc<YearlyMeansTable>, DataError> {
        self.means
            .get_or_try_init(|| {
                let path = loader::resolve(&self.data_dir, &self.means_stem)?;
                let table = loader::load_yearly_means(&path).inspect_err(|e| {
                    log::error!("Failed to load yearly means: {e}");
                })?;
                log::info!("Loaded {} yearly means from {}", table.len(), path.display());
                Ok(Arc::new(table))
            })
            .map(Arc::clone)
    }

    /// Records of a single year.  A year without records yields an empty
    /// table.
    pub fn frame_for_year(&self, year: i32) -> Result<Arc<RaceTable>, DataError> {
        self.frames.get_or_try_insert_with(&year, || {
            let full = self.load_full_dataset()?;
            let frame = filter_year(&full, year);
            log::debug!("Cached frame for {year} ({} records)", frame.len());
            Ok(Arc::new(frame))
        })
    }

    /// Distinct years in the full dataset, most recent first.
    pub fn available_years(&self) -> Result<Arc<Vec<i32>>, DataError> {
        self.years
            .get_or_try_init(|| {
                let full = self.load_full_dataset()?;
                Ok(Arc::new(distinct_years(&full)))
            })
            .map(Arc::clone)
    }

    /// Number of per-year frames currently cached.
    pub fn cached_frames(&self) -> usize {
        self.frames.len()
    }
}
