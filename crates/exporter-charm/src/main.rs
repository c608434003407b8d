//! exporter-charm: hook entry point for the prometheus-libvirt-exporter charm.
//!
//! # Usage
//!
//! ```text
//! exporter-charm hook                  # hook named by $JUJU_HOOK_NAME
//! exporter-charm hook config-changed
//! exporter-charm flags
//! exporter-charm probe --address 127.0.0.1:9177 --timeout 5
//! ```

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use exporter_charm::{run_hook, JujuEnv, DEFAULT_LOG_FILTER};
use exporter_core::{CharmSettings, EXPORTER_PORT};
use exporter_health::probe_metrics;
use exporter_host::SystemRunner;
use exporter_state::StateStore;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "exporter-charm",
    about = "Reconciles a prometheus-libvirt-exporter unit",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass
    Hook {
        /// Hook name (default: $JUJU_HOOK_NAME)
        name: Option<String>,
    },
    /// Print the persisted flag set as JSON
    Flags,
    /// Check that the exporter serves libvirt metrics
    Probe {
        #[arg(long, default_value_t = format!("127.0.0.1:{EXPORTER_PORT}"))]
        address: String,
        /// Timeout in seconds
        #[arg(long, default_value = "5")]
        timeout: u64,
    },
}

fn main() -> anyhow::Result<()> {
    // Juju captures hook stderr into the unit log.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Hook { name } => {
            let env = JujuEnv::from_env()?;
            let Some(hook_name) = name.or_else(|| env.hook_name.clone()) else {
                anyhow::bail!("no hook name given and JUJU_HOOK_NAME is not set");
            };
            let settings = CharmSettings::load(&env.charm_dir)?;
            let store = StateStore::open(&settings.state_path)
                .with_context(|| format!("opening {}", settings.state_path.display()))?;
            run_hook(&env, &settings, &SystemRunner, &store, &hook_name)?;
            Ok(())
        }
        Commands::Flags => {
            let env = JujuEnv::from_env()?;
            let settings = CharmSettings::load(&env.charm_dir)?;
            let store = StateStore::open(&settings.state_path)?;
            println!("{}", serde_json::to_string_pretty(&store.flags()?)?);
            Ok(())
        }
        Commands::Probe { address, timeout } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let result = runtime.block_on(probe_metrics(&address, Duration::from_secs(timeout)));
            info!(%address, ?result, "metrics probe finished");
            if !result.is_healthy() {
                anyhow::bail!("exporter at {address} is not healthy: {result:?}");
            }
            println!("{result:?}");
            Ok(())
        }
    }
}
