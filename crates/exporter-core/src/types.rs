//! Shared types and fixed identities used across the exporter charm crates.

use serde::{Deserialize, Serialize};

// ── Workload identity ──────────────────────────────────────────────

/// Snap that ships the exporter binary.
pub const SNAP_NAME: &str = "prometheus-libvirt-exporter";

/// Snap plug connected to the libvirt slot after install.
pub const LIBVIRT_PLUG: &str = "prometheus-libvirt-exporter:libvirt";

/// systemd unit the snap daemon runs under.
pub const SERVICE_UNIT: &str = "snap.prometheus-libvirt-exporter.daemon";

/// Port the exporter listens on.
pub const EXPORTER_PORT: u16 = 9177;

/// HTTP path serving the Prometheus exposition.
pub const METRICS_PATH: &str = "/metrics";

/// Every metric family the exporter emits starts with this prefix.
pub const METRIC_PREFIX: &str = "libvirt_";

/// Name of the optional zip resource holding dashboard overrides.
pub const DASHBOARD_RESOURCE: &str = "dashboards";

/// Rule appended to the libvirtd local AppArmor profile.
pub const DENY_PTRACE_RULE: &str =
    "deny ptrace (read) peer=snap.prometheus-libvirt-exporter.daemon,";

// ── Relations ──────────────────────────────────────────────────────

pub const JUJU_INFO_RELATION: &str = "juju-info";
pub const SCRAPE_RELATION: &str = "scrape";
pub const NRPE_RELATION: &str = "nrpe-external-master";
pub const DASHBOARDS_RELATION: &str = "dashboards";

// ── Status ─────────────────────────────────────────────────────────

/// Workload status kinds understood by `status-set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Maintenance,
    Active,
    Blocked,
    Waiting,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Maintenance => "maintenance",
            StatusKind::Active => "active",
            StatusKind::Blocked => "blocked",
            StatusKind::Waiting => "waiting",
        }
    }
}

/// A workload status surfaced to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadStatus {
    pub kind: StatusKind,
    pub message: String,
}

impl WorkloadStatus {
    pub fn maintenance(message: &str) -> Self {
        Self {
            kind: StatusKind::Maintenance,
            message: message.to_string(),
        }
    }

    pub fn active(message: &str) -> Self {
        Self {
            kind: StatusKind::Active,
            message: message.to_string(),
        }
    }

    pub fn blocked(message: &str) -> Self {
        Self {
            kind: StatusKind::Blocked,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for WorkloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_display() {
        let status = WorkloadStatus::blocked("Waiting for nrpe package installation");
        assert_eq!(status.to_string(), "blocked: Waiting for nrpe package installation");
    }

    #[test]
    fn status_kind_serializes_snake_case() {
        let json = serde_json::to_string(&StatusKind::Maintenance).unwrap();
        assert_eq!(json, "\"maintenance\"");
    }
}
