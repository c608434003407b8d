//! Reconciler error types.

use thiserror::Error;

/// Errors that abort a reconciliation pass.
///
/// An aborted pass persists nothing; the next hook retries from the last
/// committed flags.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to observe host state: {0}")]
    Observe(#[source] anyhow::Error),

    #[error("{handler}: {action} failed: {source}")]
    Action {
        handler: &'static str,
        action: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
