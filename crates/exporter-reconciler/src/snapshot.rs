//! Normalized inputs to a reconciliation pass.
//!
//! Handlers never query the host themselves. Everything they decide on is in
//! a [`Snapshot`]: the triggering hook, relation availability, leadership,
//! the charm config and which keys of it changed, and live probes.

use std::collections::BTreeSet;

use exporter_core::config::KEY_SNAP_CHANNEL;
use exporter_core::{DesiredConfig, NRPE_RELATION};

/// Kind of relation hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationHook {
    Created,
    Joined,
    Changed,
    Departed,
    Broken,
}

/// The hook that triggered the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hook {
    Install,
    Start,
    ConfigChanged,
    UpgradeCharm,
    UpdateStatus,
    LeaderElected,
    LeaderSettingsChanged,
    Stop,
    Remove,
    Relation {
        endpoint: String,
        kind: RelationHook,
    },
    Other(String),
}

impl Hook {
    /// Parse a Juju hook name such as `config-changed` or `scrape-relation-joined`.
    pub fn parse(name: &str) -> Self {
        match name {
            "install" => Hook::Install,
            "start" => Hook::Start,
            "config-changed" => Hook::ConfigChanged,
            "upgrade-charm" => Hook::UpgradeCharm,
            "update-status" => Hook::UpdateStatus,
            "leader-elected" => Hook::LeaderElected,
            "leader-settings-changed" => Hook::LeaderSettingsChanged,
            "stop" => Hook::Stop,
            "remove" => Hook::Remove,
            _ => Self::parse_relation(name).unwrap_or_else(|| Hook::Other(name.to_string())),
        }
    }

    fn parse_relation(name: &str) -> Option<Self> {
        let (endpoint, suffix) = name.rsplit_once("-relation-")?;
        let kind = match suffix {
            "created" => RelationHook::Created,
            "joined" => RelationHook::Joined,
            "changed" => RelationHook::Changed,
            "departed" => RelationHook::Departed,
            "broken" => RelationHook::Broken,
            _ => return None,
        };
        Some(Hook::Relation {
            endpoint: endpoint.to_string(),
            kind,
        })
    }

    pub fn is_relation(&self, endpoint: &str, kind: RelationHook) -> bool {
        matches!(self, Hook::Relation { endpoint: e, kind: k } if e == endpoint && *k == kind)
    }
}

/// Relation availability as seen from this unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationView {
    /// A `juju-info` relation exists.
    pub juju_info_connected: bool,
    /// A `juju-info` relation has a remote unit.
    pub juju_info_available: bool,
    pub scrape_available: bool,
    pub nrpe_available: bool,
    /// A `dashboards` relation exists.
    pub dashboards_joined: bool,
}

/// Live observations, refreshed after every fired handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Probes {
    pub service_running: bool,
    pub nagios_dir_present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub hook: Hook,
    pub config: DesiredConfig,
    /// Config keys whose value differs from the last committed pass.
    pub config_changed: BTreeSet<String>,
    pub relations: RelationView,
    pub is_leader: bool,
    pub probes: Probes,
}

impl Snapshot {
    /// A quiet snapshot: `update-status`, default config, nothing related.
    pub fn idle() -> Self {
        Self {
            hook: Hook::UpdateStatus,
            config: DesiredConfig::default(),
            config_changed: BTreeSet::new(),
            relations: RelationView::default(),
            is_leader: false,
            probes: Probes::default(),
        }
    }

    /// `config.changed`: any option changed.
    pub fn config_changed(&self) -> bool {
        !self.config_changed.is_empty()
    }

    /// `config.changed.<key>`.
    pub fn config_key_changed(&self, key: &str) -> bool {
        self.config_changed.contains(key)
    }

    pub fn channel_changed(&self) -> bool {
        self.config_key_changed(KEY_SNAP_CHANNEL)
    }

    /// `nrpe-external-master.changed`: this pass runs a relation-changed hook for NRPE.
    pub fn nrpe_changed(&self) -> bool {
        self.hook.is_relation(NRPE_RELATION, RelationHook::Changed)
    }
}
