//! Charm configuration and process settings.
//!
//! Two layers live here:
//!
//! - [`DesiredConfig`]: the operator-facing charm options (`config-get`),
//!   read fresh on every hook and never cached beyond one pass.
//! - [`CharmSettings`]: where the charm keeps its files on the host. Defaults
//!   match a real machine; an optional `charm.toml` in the charm directory
//!   overrides them (tests point everything at temp directories).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Raw charm config as returned by `config-get --format=json`.
pub type ConfigMap = serde_json::Map<String, Value>;

pub const DEFAULT_CHANNEL: &str = "stable";
pub const DEFAULT_CHECK_TIMEOUT: &str = "15";
pub const DEFAULT_NAGIOS_CONTEXT: &str = "juju";

/// Charm option keys.
pub const KEY_SNAP_CHANNEL: &str = "snap_channel";
pub const KEY_CHECK_TIMEOUT: &str = "nrpe_check_timeout";
pub const KEY_NAGIOS_CONTEXT: &str = "nagios_context";

/// Alternate spellings accepted for an option, as `(alias, key)`.
const OPTION_ALIASES: [(&str, &str); 2] = [
    ("channel", KEY_SNAP_CHANNEL),
    ("check_timeout", KEY_CHECK_TIMEOUT),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The subset of charm options the reconciler acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredConfig {
    /// Snap channel the exporter is installed from.
    pub snap_channel: String,
    /// Health-check timeout in seconds, kept as the raw option text.
    pub nrpe_check_timeout: String,
    /// Prefix for the host name exported to Nagios.
    pub nagios_context: String,
}

impl Default for DesiredConfig {
    fn default() -> Self {
        Self {
            snap_channel: DEFAULT_CHANNEL.to_string(),
            nrpe_check_timeout: DEFAULT_CHECK_TIMEOUT.to_string(),
            nagios_context: DEFAULT_NAGIOS_CONTEXT.to_string(),
        }
    }
}

impl DesiredConfig {
    /// Extract the options from a raw config map.
    ///
    /// `channel` and `check_timeout` are accepted as aliases. Numbers are
    /// kept as their decimal text; missing or null options use defaults.
    pub fn from_map(map: &ConfigMap) -> Self {
        let defaults = Self::default();
        Self {
            snap_channel: lookup(map, &[KEY_SNAP_CHANNEL, OPTION_ALIASES[0].0])
                .unwrap_or(defaults.snap_channel),
            nrpe_check_timeout: lookup(map, &[KEY_CHECK_TIMEOUT, OPTION_ALIASES[1].0])
                .unwrap_or(defaults.nrpe_check_timeout),
            nagios_context: lookup(map, &[KEY_NAGIOS_CONTEXT]).unwrap_or(defaults.nagios_context),
        }
    }

    /// Option keys whose resolved value differs from `other`.
    fn differing_keys(&self, other: &Self) -> impl Iterator<Item = &'static str> {
        [
            (KEY_SNAP_CHANNEL, self.snap_channel != other.snap_channel),
            (KEY_CHECK_TIMEOUT, self.nrpe_check_timeout != other.nrpe_check_timeout),
            (KEY_NAGIOS_CONTEXT, self.nagios_context != other.nagios_context),
        ]
        .into_iter()
        .filter_map(|(key, differs)| differs.then_some(key))
    }
}

fn lookup(map: &ConfigMap, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Keys whose value differs between the recorded and the current config.
///
/// With no recorded config every current key counts as changed, so the
/// first hook after install sees `config.changed.<key>` for all options.
/// An option set through an alias is also reported under its primary key
/// whenever its resolved value moves.
pub fn changed_keys(previous: Option<&ConfigMap>, current: &ConfigMap) -> BTreeSet<String> {
    let Some(previous) = previous else {
        let mut changed: BTreeSet<String> = current.keys().cloned().collect();
        for (alias, key) in OPTION_ALIASES {
            if current.contains_key(alias) {
                changed.insert(key.to_string());
            }
        }
        return changed;
    };
    let mut changed: BTreeSet<String> = previous
        .keys()
        .chain(current.keys())
        .filter(|key| previous.get(*key) != current.get(*key))
        .cloned()
        .collect();
    let before = DesiredConfig::from_map(previous);
    let after = DesiredConfig::from_map(current);
    changed.extend(after.differing_keys(&before).map(str::to_string));
    changed
}

// ── Process settings ───────────────────────────────────────────────

/// Host paths the charm reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharmSettings {
    /// redb file holding flags and the last applied config.
    pub state_path: PathBuf,
    /// Directory of dashboard JSON definitions shipped with the charm.
    pub dashboard_dir: PathBuf,
    /// libvirtd local AppArmor profile that receives the deny rule.
    pub apparmor_local_profile: PathBuf,
    /// Main libvirtd profile reloaded after patching.
    pub apparmor_profile: PathBuf,
    /// Presence of this directory means the NRPE package is installed.
    pub nagios_dir: PathBuf,
    pub nrpe_config_dir: PathBuf,
    pub nagios_export_dir: PathBuf,
    pub nagios_plugin_dir: PathBuf,
}

impl Default for CharmSettings {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(".exporter-state.redb"),
            dashboard_dir: PathBuf::from("files/grafana-dashboards"),
            apparmor_local_profile: PathBuf::from("/etc/apparmor.d/local/usr.sbin.libvirtd"),
            apparmor_profile: PathBuf::from("/etc/apparmor.d/usr.sbin.libvirtd"),
            nagios_dir: PathBuf::from("/var/lib/nagios"),
            nrpe_config_dir: PathBuf::from("/etc/nagios/nrpe.d"),
            nagios_export_dir: PathBuf::from("/var/lib/nagios/export"),
            nagios_plugin_dir: PathBuf::from("/usr/lib/nagios/plugins"),
        }
    }
}

impl CharmSettings {
    pub const FILE_NAME: &'static str = "charm.toml";

    /// Load settings for a charm directory.
    ///
    /// `charm.toml` is optional. Relative paths resolve against `charm_dir`.
    pub fn load(charm_dir: &Path) -> Result<Self, ConfigError> {
        let path = charm_dir.join(Self::FILE_NAME);
        let settings = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })?
        } else {
            Self::default()
        };
        Ok(settings.resolve(charm_dir))
    }

    /// Make every relative path absolute under `base`.
    pub fn resolve(self, base: &Path) -> Self {
        let at = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        Self {
            state_path: at(self.state_path),
            dashboard_dir: at(self.dashboard_dir),
            apparmor_local_profile: at(self.apparmor_local_profile),
            apparmor_profile: at(self.apparmor_profile),
            nagios_dir: at(self.nagios_dir),
            nrpe_config_dir: at(self.nrpe_config_dir),
            nagios_export_dir: at(self.nagios_export_dir),
            nagios_plugin_dir: at(self.nagios_plugin_dir),
        }
    }
}
