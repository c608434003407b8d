//! Commands emitted by handlers, and what executing them produced.

use exporter_core::WorkloadStatus;
use exporter_health::HttpCheck;
use exporter_state::Flag;

/// A single step of a handler's plan.
///
/// `Set` and `Clear` are applied by the pass driver; every other variant is
/// handed to the [`Executor`](crate::Executor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Status(WorkloadStatus),
    Set(Flag),
    Clear(Flag),

    /// Install the exporter snap from `channel`, refreshing if already present.
    InstallSnap { channel: String },
    /// Connect the snap's libvirt plug.
    ConnectPlug,
    /// Append the deny-ptrace rule to the libvirtd local profile.
    PatchAppArmor,
    OpenPort { port: u16 },
    StartService,
    RemoveSnap,

    /// Publish the exporter port on every scrape relation.
    ConfigureScrape { port: u16 },

    WriteHealthCheck {
        check: HttpCheck,
        nagios_context: String,
    },
    RemoveHealthCheck {
        shortname: String,
        nagios_context: String,
    },

    /// Overlay the dashboards resource onto the shipped definitions.
    RefreshDashboards,
    /// Push every dashboard definition to the dashboards relation.
    RegisterDashboards,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Status(_) => "status",
            Action::Set(_) => "set-flag",
            Action::Clear(_) => "clear-flag",
            Action::InstallSnap { .. } => "install-snap",
            Action::ConnectPlug => "connect-plug",
            Action::PatchAppArmor => "patch-apparmor",
            Action::OpenPort { .. } => "open-port",
            Action::StartService => "start-service",
            Action::RemoveSnap => "remove-snap",
            Action::ConfigureScrape { .. } => "configure-scrape",
            Action::WriteHealthCheck { .. } => "write-health-check",
            Action::RemoveHealthCheck { .. } => "remove-health-check",
            Action::RefreshDashboards => "refresh-dashboards",
            Action::RegisterDashboards => "register-dashboards",
        }
    }

    /// Whether the action touches anything outside the flag set.
    pub fn is_external(&self) -> bool {
        !matches!(self, Action::Set(_) | Action::Clear(_))
    }
}

/// Result of executing one external action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// Benign no-op. The rest of the handler's plan is dropped.
    Skipped,
    /// New dashboard definitions landed on disk; registration must run again.
    DashboardsExtracted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_actions_are_internal() {
        assert!(!Action::Set(Flag::Installed).is_external());
        assert!(!Action::Clear(Flag::Configured).is_external());
        assert!(Action::StartService.is_external());
        assert!(Action::Status(WorkloadStatus::active("Ready")).is_external());
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(
            Action::InstallSnap {
                channel: "stable".into()
            }
            .name(),
            "install-snap"
        );
        assert_eq!(Action::RegisterDashboards.name(), "register-dashboards");
    }
}
