use std::path::PathBuf;

use thiserror::Error;

/// Failures of the data access layer.
#[derive(Debug, Error)]
pub enum DataError {
    /// Backing file missing, unreadable or not matching the expected schema.
    #[error("data unavailable at {}: {reason}", .path.display())]
    Unavailable { path: PathBuf, reason: String },

    #[error("unsupported data file format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

impl DataError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, err: &anyhow::Error) -> Self {
        DataError::Unavailable {
            path: path.into(),
            reason: format!("{err:#}"),
        }
    }
}
