//! Durable flag types.
//!
//! A flag is a named boolean fact persisted across hook invocations. The
//! four flags the reconciler owns are modelled as an explicit struct rather
//! than a free-form set of strings.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One of the reconciler-owned flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flag {
    Installed,
    Started,
    Configured,
    DashboardRegistered,
}

impl Flag {
    pub const ALL: [Flag; 4] = [
        Flag::Installed,
        Flag::Started,
        Flag::Configured,
        Flag::DashboardRegistered,
    ];

    /// The flag's name as shown in logs and `flags` output.
    pub fn name(&self) -> &'static str {
        match self {
            Flag::Installed => "libvirt-exporter.installed",
            Flag::Started => "libvirt-exporter.started",
            Flag::Configured => "libvirt-exporter.configured",
            Flag::DashboardRegistered => "libvirt-exporter.dashboard-registered",
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The full flag set.
///
/// `started` is never set while `installed` is false; [`Flags::set`]
/// refuses that transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    pub installed: bool,
    pub started: bool,
    pub configured: bool,
    pub dashboard_registered: bool,
}

impl Flags {
    pub fn is_set(&self, flag: Flag) -> bool {
        match flag {
            Flag::Installed => self.installed,
            Flag::Started => self.started,
            Flag::Configured => self.configured,
            Flag::DashboardRegistered => self.dashboard_registered,
        }
    }

    /// Set a flag. Returns false if the transition was refused.
    pub fn set(&mut self, flag: Flag) -> bool {
        if flag == Flag::Started && !self.installed {
            debug!(%flag, "refusing to set started before installed");
            return false;
        }
        *self.slot(flag) = true;
        true
    }

    pub fn clear(&mut self, flag: Flag) {
        *self.slot(flag) = false;
    }

    /// Names of all flags currently set.
    pub fn active(&self) -> Vec<&'static str> {
        Flag::ALL
            .iter()
            .filter(|flag| self.is_set(**flag))
            .map(Flag::name)
            .collect()
    }

    fn slot(&mut self, flag: Flag) -> &mut bool {
        match flag {
            Flag::Installed => &mut self.installed,
            Flag::Started => &mut self.started,
            Flag::Configured => &mut self.configured,
            Flag::DashboardRegistered => &mut self.dashboard_registered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn started_requires_installed() {
        let mut flags = Flags::default();
        assert!(!flags.set(Flag::Started));
        assert!(!flags.started);

        assert!(flags.set(Flag::Installed));
        assert!(flags.set(Flag::Started));
        assert!(flags.started);
    }

    #[test]
    fn clear_is_independent() {
        let mut flags = Flags {
            installed: true,
            started: true,
            ..Default::default()
        };
        flags.clear(Flag::Installed);
        assert!(!flags.installed);
        assert!(flags.started);
    }

    #[test]
    fn active_lists_names_in_order() {
        let flags = Flags {
            installed: true,
            configured: true,
            ..Default::default()
        };
        assert_eq!(
            flags.active(),
            vec!["libvirt-exporter.installed", "libvirt-exporter.configured"]
        );
    }

    #[test]
    fn missing_fields_deserialize_as_unset() {
        let flags: Flags = serde_json::from_str(r#"{"installed": true}"#).unwrap();
        assert!(flags.installed);
        assert!(!flags.dashboard_registered);
    }
}
