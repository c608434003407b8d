//! Dashboard error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to copy resource {from} into {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dashboards archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan {path}: {reason}")]
    Scan { path: PathBuf, reason: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type DashboardResult<T> = Result<T, DashboardError>;
