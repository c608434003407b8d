//! exporter-core: shared identities, charm options and host settings for the
//! libvirt exporter charm.

pub mod config;
pub mod types;

pub use config::{changed_keys, CharmSettings, ConfigError, ConfigMap, DesiredConfig};
pub use types::*;
