//! exporter-host: the external collaborators the reconciler commands.
//!
//! Everything here shells out through a [`CommandRunner`], so the same code
//! drives a real machine ([`SystemRunner`]) or a recorded script in tests
//! ([`ScriptedRunner`]).
//!
//! # Components
//!
//! - **`hooktools`**: Juju hook tools (`config-get`, `relation-set`, ...)
//! - **`snap`**: install/refresh, plug connection, removal
//! - **`service`**: systemd probe and control
//! - **`apparmor`**: append-once patch of the libvirtd local profile
//! - **`relation`**: scrape relation capability

pub mod apparmor;
pub mod error;
pub mod hooktools;
pub mod relation;
pub mod runner;
pub mod service;
pub mod snap;

pub use apparmor::patch_local_profile;
pub use error::{HostError, HostResult};
pub use hooktools::HookTools;
pub use relation::{ScrapeRelation, ScrapeTarget};
pub use runner::{CommandOutput, CommandRunner, ScriptedRunner, SystemRunner};
pub use service::Systemd;
pub use snap::Snap;
