//! Pass driver: runs the dispatch table to quiescence.
//!
//! A pass scans [`HANDLERS`](crate::HANDLERS) in priority order and fires
//! the first handler whose guard holds and that has not fired yet. Its plan
//! is applied action by action, the snapshot is refreshed, and the scan
//! starts again from the top. The pass ends when no handler is eligible.
//! Any executor error aborts the pass; the caller persists nothing.

use exporter_core::WorkloadStatus;
use exporter_state::{Flag, Flags};
use tracing::{debug, info, warn};

use crate::action::{Action, Outcome};
use crate::error::{ReconcileError, ReconcileResult};
use crate::handlers::{Handler, HANDLERS};
use crate::snapshot::Snapshot;

/// Source of snapshots. Called once at pass start and after every fired handler.
pub trait Observer {
    fn snapshot(&mut self) -> anyhow::Result<Snapshot>;
}

/// Performs external actions on the host.
pub trait Executor {
    fn execute(&mut self, action: &Action) -> anyhow::Result<Outcome>;
}

/// What a completed pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// Flags to persist.
    pub flags: Flags,
    /// Handlers fired, in order.
    pub fired: Vec<&'static str>,
    /// Last status surfaced during the pass.
    pub status: Option<WorkloadStatus>,
}

impl PassReport {
    pub fn fired(&self, handler: &str) -> bool {
        self.fired.contains(&handler)
    }
}

pub struct Reconciler {
    handlers: &'static [Handler],
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self { handlers: &HANDLERS }
    }

    /// Run one reconciliation pass starting from `flags`.
    pub fn run_pass(
        &self,
        mut flags: Flags,
        observer: &mut dyn Observer,
        executor: &mut dyn Executor,
    ) -> ReconcileResult<PassReport> {
        let mut snapshot = observer.snapshot().map_err(ReconcileError::Observe)?;
        info!(hook = ?snapshot.hook, flags = ?flags.active(), "reconciliation pass started");

        let mut fired: Vec<&'static str> = Vec::new();
        let mut status = None;

        while let Some(handler) = self.next_handler(&flags, &snapshot, &fired) {
            fired.push(handler.name);
            let plan = handler.plan(&flags, &snapshot);
            debug!(handler = handler.name, actions = plan.len(), "handler fired");

            for action in &plan {
                match action {
                    Action::Set(flag) => {
                        if flags.set(*flag) {
                            debug!(handler = handler.name, %flag, "flag set");
                        }
                    }
                    Action::Clear(flag) => {
                        flags.clear(*flag);
                        debug!(handler = handler.name, %flag, "flag cleared");
                    }
                    _ => {
                        let outcome = executor.execute(action).map_err(|source| {
                            warn!(
                                handler = handler.name,
                                action = action.name(),
                                error = %source,
                                "action failed, aborting pass"
                            );
                            ReconcileError::Action {
                                handler: handler.name,
                                action: action.name(),
                                source,
                            }
                        })?;
                        if let Action::Status(s) = action {
                            status = Some(s.clone());
                        }
                        match outcome {
                            Outcome::Done => {}
                            Outcome::Skipped => {
                                debug!(
                                    handler = handler.name,
                                    action = action.name(),
                                    "action skipped, dropping rest of plan"
                                );
                                break;
                            }
                            Outcome::DashboardsExtracted => {
                                flags.clear(Flag::DashboardRegistered);
                                debug!("new dashboards extracted, registration pending");
                            }
                        }
                    }
                }
            }

            snapshot = observer.snapshot().map_err(ReconcileError::Observe)?;
        }

        info!(fired = ?fired, flags = ?flags.active(), "reconciliation pass completed");
        Ok(PassReport {
            flags,
            fired,
            status,
        })
    }

    fn next_handler(
        &self,
        flags: &Flags,
        snapshot: &Snapshot,
        fired: &[&'static str],
    ) -> Option<&'static Handler> {
        self.handlers
            .iter()
            .find(|h| !fired.contains(&h.name) && h.applies(flags, snapshot))
    }
}
