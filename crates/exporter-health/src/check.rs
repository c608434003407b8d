//! The HTTP check registered with NRPE.

use exporter_core::{DesiredConfig, EXPORTER_PORT, METRICS_PATH};

/// Timeout used when `nrpe_check_timeout` is not an integer.
pub const DEFAULT_TIMEOUT_SECS: i64 = 15;

pub const CHECK_SHORTNAME: &str = "prometheus_libvirt_exporter_http";
pub const CHECK_DESCRIPTION: &str = "Prometheus Libvirt Exporter HTTP check";

/// Health-check timeout in seconds, falling back to 15 on parse failure.
pub fn check_timeout(config: &DesiredConfig) -> i64 {
    config
        .nrpe_check_timeout
        .trim()
        .parse::<i64>()
        .unwrap_or(DEFAULT_TIMEOUT_SECS)
}

/// A named NRPE check running `check_http` against the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpCheck {
    pub shortname: String,
    pub description: String,
    pub port: u16,
    pub path: String,
    pub timeout_secs: i64,
}

impl HttpCheck {
    /// The exporter's metrics check with the configured timeout.
    pub fn for_exporter(config: &DesiredConfig) -> Self {
        Self {
            shortname: CHECK_SHORTNAME.to_string(),
            description: CHECK_DESCRIPTION.to_string(),
            port: EXPORTER_PORT,
            path: METRICS_PATH.to_string(),
            timeout_secs: check_timeout(config),
        }
    }

    /// The check line as registered, without the plugin directory.
    pub fn command_line(&self) -> String {
        format!(
            "check_http -I 127.0.0.1 -p {} -u {} -t {}",
            self.port, self.path, self.timeout_secs
        )
    }

    /// Name of the NRPE command (`check_<shortname>`).
    pub fn command_name(&self) -> String {
        command_name(&self.shortname)
    }
}

pub(crate) fn command_name(shortname: &str) -> String {
    format!("check_{shortname}")
}
