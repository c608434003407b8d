//! Health check error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type HealthResult<T> = Result<T, HealthError>;
