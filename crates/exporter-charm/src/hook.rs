//! One hook invocation, end to end.

use anyhow::Context;
use exporter_core::CharmSettings;
use exporter_host::{CommandRunner, HookTools};
use exporter_reconciler::{Hook, PassReport, Reconciler};
use exporter_state::StateStore;
use tracing::info;

use crate::context::JujuEnv;
use crate::executor::HostExecutor;
use crate::observer::HookObserver;

/// Run a reconciliation pass for `hook_name` and persist its result.
///
/// Flags and the config the pass acted on are committed together, and only
/// when the pass completes. On error the store is left as it was so the next
/// hook retries from the same starting point.
pub fn run_hook(
    env: &JujuEnv,
    settings: &CharmSettings,
    runner: &dyn CommandRunner,
    store: &StateStore,
    hook_name: &str,
) -> anyhow::Result<PassReport> {
    let tools = HookTools::new(runner);
    let config = tools.config_get().context("reading charm config")?;
    let applied = store.applied_config()?;
    let flags = store.flags()?;

    let mut observer = HookObserver::new(
        &tools,
        settings,
        Hook::parse(hook_name),
        &config,
        applied.as_ref(),
    )
    .context("observing unit state")?;
    let mut executor = HostExecutor::new(&tools, settings, env);

    let report = Reconciler::new()
        .run_pass(flags, &mut observer, &mut executor)
        .with_context(|| format!("{hook_name} hook aborted"))?;

    store.commit(&report.flags, &config)?;
    info!(
        hook = %hook_name,
        fired = ?report.fired,
        flags = ?report.flags.active(),
        "hook completed"
    );
    Ok(report)
}
