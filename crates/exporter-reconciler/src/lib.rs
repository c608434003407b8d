//! Exporter charm reconciler: level-triggered flag state machine.
//!
//! Every hook runs one reconciliation pass. The pass compares the durable
//! [`Flags`](exporter_state::Flags) and a [`Snapshot`] of live observations
//! against the desired outcome and emits the minimal [`Action`]s to get
//! there. Handlers are pure functions; all side effects go through an
//! [`Executor`].
//!
//! # Components
//!
//! - **`snapshot`**: normalized per-pass inputs (hook, relations, config, probes)
//! - **`action`**: commands a handler can emit, and executor outcomes
//! - **`handlers`**: the fixed-priority dispatch table
//! - **`reconciler`**: the pass driver

pub mod action;
pub mod error;
pub mod handlers;
pub mod reconciler;
pub mod snapshot;

pub use action::{Action, Outcome};
pub use error::{ReconcileError, ReconcileResult};
pub use handlers::{Handler, HANDLERS};
pub use reconciler::{Executor, Observer, PassReport, Reconciler};
pub use snapshot::{Hook, Probes, RelationHook, RelationView, Snapshot};
