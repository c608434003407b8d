//! The Juju hook environment.

use std::path::PathBuf;

/// Values Juju exports to every hook process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JujuEnv {
    /// `$CHARM_DIR`, or the working directory when unset.
    pub charm_dir: PathBuf,
    /// `$JUJU_MODEL_NAME`, attached to every registered dashboard.
    pub model_name: String,
    /// `$JUJU_UNIT_NAME`, e.g. `prometheus-libvirt-exporter/0`.
    pub unit_name: String,
    /// `$JUJU_HOOK_NAME`.
    pub hook_name: Option<String>,
}

impl JujuEnv {
    pub fn from_env() -> std::io::Result<Self> {
        let charm_dir = match std::env::var_os("CHARM_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()?,
        };
        Ok(Self {
            charm_dir,
            model_name: std::env::var("JUJU_MODEL_NAME").unwrap_or_default(),
            unit_name: std::env::var("JUJU_UNIT_NAME").unwrap_or_default(),
            hook_name: std::env::var("JUJU_HOOK_NAME").ok().filter(|h| !h.is_empty()),
        })
    }
}
