//! exporter-charm: wires the reconciler to a real Juju unit.
//!
//! A hook invocation reads the charm config and the durable flags, builds a
//! [`HookObserver`] over the hook tools, runs one pass with a
//! [`HostExecutor`], and commits the resulting flags together with the
//! config it acted on. An aborted pass commits nothing.

pub mod context;
pub mod dashboards;
pub mod executor;
pub mod hook;
pub mod observer;

pub use context::JujuEnv;
pub use dashboards::DashboardRelation;
pub use executor::HostExecutor;
pub use hook::run_hook;
pub use observer::HookObserver;

/// Default `RUST_LOG` filter for the hook binary.
pub const DEFAULT_LOG_FILTER: &str = "info,exporter=debug";
