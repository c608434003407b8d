//! Host adapter error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while commanding the host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {code:?}: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("unexpected output from `{command}`: {reason}")]
    Output { command: String, reason: String },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type HostResult<T> = Result<T, HostError>;
