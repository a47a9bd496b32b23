use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File looked up in the working directory at start-up.
pub const CONFIG_FILE: &str = "vasalytics.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Tunables of the dashboard.  Every field has a default, so a partial (or
/// absent) config file is fine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory holding the data files.
    pub data_dir: PathBuf,
    /// File stem of the race-records table.
    pub records_stem: String,
    /// File stem of the mean-per-year table.
    pub means_stem: String,
    /// Bucket width (hours) of the layered finish-time histogram.
    pub histogram_bin_width: f64,
    /// Bucket width (hours) of the ridgeline bands.
    pub ridgeline_bin_width: f64,
    /// Bin anchor and step of the single start-group histogram.
    pub group_histogram_anchor: f64,
    pub group_histogram_step: f64,
    /// Mean times (hours) mapped to the red and blue ends of the ridgeline
    /// fill scale.
    pub mean_fill_domain: [f64; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            records_stem: "all".to_string(),
            means_stem: "mean_by_year".to_string(),
            histogram_bin_width: 0.25,
            ridgeline_bin_width: 0.25,
            group_histogram_anchor: 3.0,
            group_histogram_step: 0.5,
            mean_fill_domain: [30.0, 5.0],
        }
    }
}

impl DashboardConfig {
    /// Read the config from `path`, falling back to defaults when the file is
    /// absent or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => {
                log::debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str::<DashboardConfig>(&text) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config.sanitized()
            }
            Err(e) => {
                log::warn!("Ignoring invalid config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Replace non-positive bin widths with the defaults.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        for (value, fallback) in [
            (&mut self.histogram_bin_width, defaults.histogram_bin_width),
            (&mut self.ridgeline_bin_width, defaults.ridgeline_bin_width),
            (&mut self.group_histogram_step, defaults.group_histogram_step),
        ] {
            if !(value.is_finite() && *value > 0.0) {
                log::warn!("Bin width {value} is not positive, using {fallback}");
                *value = fallback;
            }
        }
        self
    }
}
