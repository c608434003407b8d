//! The dispatch table.
//!
//! Each handler is a guard and a plan, both pure functions of the flag set
//! and the snapshot. Order in [`HANDLERS`] is priority order.

use exporter_core::{WorkloadStatus, EXPORTER_PORT};
use exporter_health::check::{HttpCheck, CHECK_SHORTNAME};
use exporter_state::{Flag, Flags};

use crate::action::Action;
use crate::snapshot::{Hook, Snapshot};

pub type Guard = fn(&Flags, &Snapshot) -> bool;
pub type Plan = fn(&Flags, &Snapshot) -> Vec<Action>;

#[derive(Clone, Copy)]
pub struct Handler {
    pub name: &'static str,
    pub guard: Guard,
    pub plan: Plan,
}

impl Handler {
    pub fn applies(&self, flags: &Flags, snapshot: &Snapshot) -> bool {
        (self.guard)(flags, snapshot)
    }

    pub fn plan(&self, flags: &Flags, snapshot: &Snapshot) -> Vec<Action> {
        (self.plan)(flags, snapshot)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler").field("name", &self.name).finish()
    }
}

pub static HANDLERS: [Handler; 10] = [
    Handler {
        name: "upgrade",
        guard: upgrade_guard,
        plan: upgrade,
    },
    Handler {
        name: "snap_channel_changed",
        guard: channel_guard,
        plan: channel_changed,
    },
    Handler {
        name: "remove_exporter",
        guard: remove_exporter_guard,
        plan: remove_exporter,
    },
    Handler {
        name: "install",
        guard: install_guard,
        plan: install,
    },
    Handler {
        name: "start",
        guard: start_guard,
        plan: start,
    },
    Handler {
        name: "configure_scrape",
        guard: scrape_guard,
        plan: configure_scrape,
    },
    Handler {
        name: "nrpe_changed",
        guard: nrpe_changed_guard,
        plan: nrpe_changed,
    },
    Handler {
        name: "update_nrpe",
        guard: update_nrpe_guard,
        plan: update_nrpe,
    },
    Handler {
        name: "remove_nrpe",
        guard: remove_nrpe_guard,
        plan: remove_nrpe,
    },
    Handler {
        name: "register_dashboards",
        guard: register_guard,
        plan: register_dashboards,
    },
];

/// Look up a handler by name.
pub fn handler(name: &str) -> Option<&'static Handler> {
    HANDLERS.iter().find(|h| h.name == name)
}

// -- upgrade-charm --

fn upgrade_guard(_: &Flags, s: &Snapshot) -> bool {
    s.hook == Hook::UpgradeCharm
}

fn upgrade(_: &Flags, _: &Snapshot) -> Vec<Action> {
    vec![
        Action::Status(WorkloadStatus::maintenance("Charm upgrade in progress")),
        Action::Clear(Flag::Installed),
        Action::Clear(Flag::Started),
        Action::Clear(Flag::DashboardRegistered),
        Action::RefreshDashboards,
    ]
}

// -- config.changed.snap_channel --

fn channel_guard(_: &Flags, s: &Snapshot) -> bool {
    s.channel_changed()
}

fn channel_changed(_: &Flags, _: &Snapshot) -> Vec<Action> {
    vec![Action::Clear(Flag::Installed), Action::Clear(Flag::Started)]
}

// -- juju-info gone --

fn remove_exporter_guard(f: &Flags, s: &Snapshot) -> bool {
    f.installed && !s.relations.juju_info_available
}

fn remove_exporter(_: &Flags, _: &Snapshot) -> Vec<Action> {
    vec![
        Action::Clear(Flag::Installed),
        Action::Clear(Flag::Started),
        Action::RemoveSnap,
    ]
}

// -- install --

fn install_guard(f: &Flags, s: &Snapshot) -> bool {
    s.relations.juju_info_connected && !(f.installed && f.started)
}

fn install(f: &Flags, s: &Snapshot) -> Vec<Action> {
    // Installed but not yet started: the start handler owns the rest.
    if f.installed {
        return Vec::new();
    }
    vec![
        Action::Status(WorkloadStatus::maintenance("Installing software")),
        Action::InstallSnap {
            channel: s.config.snap_channel.clone(),
        },
        Action::ConnectPlug,
        Action::PatchAppArmor,
        Action::Status(WorkloadStatus::active(
            "Exporter installed and connected to libvirt slot",
        )),
        Action::OpenPort {
            port: EXPORTER_PORT,
        },
        Action::Set(Flag::Installed),
    ]
}

// -- start --

fn start_guard(f: &Flags, s: &Snapshot) -> bool {
    !f.started && (f.installed || s.config_changed())
}

fn start(f: &Flags, s: &Snapshot) -> Vec<Action> {
    let mut actions = if s.probes.service_running {
        let mut ready = vec![Action::Status(WorkloadStatus::active("Ready"))];
        if f.installed {
            ready.push(Action::Set(Flag::Started));
        }
        ready
    } else if f.installed {
        vec![
            Action::Status(WorkloadStatus::maintenance("Service is down, starting")),
            Action::StartService,
            Action::Status(WorkloadStatus::active("Service started")),
        ]
    } else {
        // Config changed before the snap is installed; nothing to start yet.
        Vec::new()
    };
    actions.push(Action::RefreshDashboards);
    actions
}

// -- scrape.available --

fn scrape_guard(f: &Flags, s: &Snapshot) -> bool {
    f.started && s.relations.scrape_available
}

fn configure_scrape(_: &Flags, _: &Snapshot) -> Vec<Action> {
    vec![
        Action::ConfigureScrape {
            port: EXPORTER_PORT,
        },
        Action::Clear(Flag::Configured),
    ]
}

// -- nrpe-external-master --

fn nrpe_changed_guard(_: &Flags, s: &Snapshot) -> bool {
    s.nrpe_changed()
}

fn nrpe_changed(_: &Flags, _: &Snapshot) -> Vec<Action> {
    vec![Action::Clear(Flag::Configured)]
}

fn update_nrpe_guard(f: &Flags, s: &Snapshot) -> bool {
    s.relations.nrpe_available && !f.configured
}

fn update_nrpe(_: &Flags, s: &Snapshot) -> Vec<Action> {
    if !s.probes.nagios_dir_present {
        return vec![Action::Status(WorkloadStatus::blocked(
            "Waiting for nrpe package installation",
        ))];
    }
    vec![
        Action::Status(WorkloadStatus::maintenance("Configuring nrpe checks")),
        Action::WriteHealthCheck {
            check: HttpCheck::for_exporter(&s.config),
            nagios_context: s.config.nagios_context.clone(),
        },
        Action::Status(WorkloadStatus::active("ready")),
        Action::Set(Flag::Configured),
    ]
}

fn remove_nrpe_guard(f: &Flags, s: &Snapshot) -> bool {
    f.configured && !s.relations.nrpe_available
}

fn remove_nrpe(_: &Flags, s: &Snapshot) -> Vec<Action> {
    vec![
        Action::RemoveHealthCheck {
            shortname: CHECK_SHORTNAME.to_string(),
            nagios_context: s.config.nagios_context.clone(),
        },
        Action::Clear(Flag::Configured),
    ]
}

// -- dashboards --

fn register_guard(f: &Flags, s: &Snapshot) -> bool {
    s.is_leader && s.relations.dashboards_joined && !f.dashboard_registered
}

fn register_dashboards(_: &Flags, _: &Snapshot) -> Vec<Action> {
    vec![Action::RegisterDashboards, Action::Set(Flag::DashboardRegistered)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::RelationView;

    fn flags(installed: bool, started: bool) -> Flags {
        Flags {
            installed,
            started,
            ..Default::default()
        }
    }

    fn connected() -> Snapshot {
        let mut snapshot = Snapshot::idle();
        snapshot.relations = RelationView {
            juju_info_connected: true,
            juju_info_available: true,
            ..Default::default()
        };
        snapshot
    }

    fn external(actions: &[Action]) -> Vec<&'static str> {
        actions
            .iter()
            .filter(|a| a.is_external() && !matches!(a, Action::Status(_)))
            .map(Action::name)
            .collect()
    }

    #[test]
    fn table_names_are_unique() {
        let mut names: Vec<_> = HANDLERS.iter().map(|h| h.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), HANDLERS.len());
    }

    #[test]
    fn install_plans_full_sequence() {
        let h = handler("install").unwrap();
        let snapshot = connected();
        assert!(h.applies(&Flags::default(), &snapshot));

        let actions = h.plan(&Flags::default(), &snapshot);
        assert_eq!(
            external(&actions),
            vec!["install-snap", "connect-plug", "patch-apparmor", "open-port"]
        );
        assert_eq!(actions.last(), Some(&Action::Set(Flag::Installed)));
        assert!(actions.contains(&Action::InstallSnap {
            channel: "stable".into()
        }));
    }

    #[test]
    fn install_is_noop_when_already_installed() {
        let h = handler("install").unwrap();
        let snapshot = connected();
        // Guard still matches while started is pending.
        assert!(h.applies(&flags(true, false), &snapshot));
        assert!(h.plan(&flags(true, false), &snapshot).is_empty());
        assert!(!h.applies(&flags(true, true), &snapshot));
    }

    #[test]
    fn install_waits_for_juju_info() {
        let h = handler("install").unwrap();
        assert!(!h.applies(&Flags::default(), &Snapshot::idle()));
    }

    #[test]
    fn start_issues_start_when_down() {
        let h = handler("start").unwrap();
        let actions = h.plan(&flags(true, false), &connected());
        assert_eq!(external(&actions), vec!["start-service", "refresh-dashboards"]);
        assert!(!actions.contains(&Action::Set(Flag::Started)));
    }

    #[test]
    fn start_sets_started_when_running() {
        let h = handler("start").unwrap();
        let mut snapshot = connected();
        snapshot.probes.service_running = true;
        let actions = h.plan(&flags(true, false), &snapshot);
        assert_eq!(
            actions,
            vec![
                Action::Status(WorkloadStatus::active("Ready")),
                Action::Set(Flag::Started),
                Action::RefreshDashboards,
            ]
        );
    }

    #[test]
    fn start_never_sets_started_without_installed() {
        let h = handler("start").unwrap();
        let mut snapshot = connected();
        snapshot.probes.service_running = true;
        snapshot.config_changed.insert("nrpe_check_timeout".into());
        assert!(h.applies(&Flags::default(), &snapshot));
        let actions = h.plan(&Flags::default(), &snapshot);
        assert!(!actions.contains(&Action::Set(Flag::Started)));
        assert!(!actions.contains(&Action::StartService));
        assert_eq!(actions.last(), Some(&Action::RefreshDashboards));
    }

    #[test]
    fn channel_change_clears_install_flags() {
        let h = handler("snap_channel_changed").unwrap();
        let mut snapshot = connected();
        snapshot.config_changed.insert("snap_channel".into());
        assert!(h.applies(&flags(true, true), &snapshot));
        assert_eq!(
            h.plan(&flags(true, true), &snapshot),
            vec![Action::Clear(Flag::Installed), Action::Clear(Flag::Started)]
        );
    }

    #[test]
    fn scrape_requires_started() {
        let h = handler("configure_scrape").unwrap();
        let mut snapshot = connected();
        snapshot.relations.scrape_available = true;
        assert!(!h.applies(&flags(true, false), &snapshot));
        assert!(h.applies(&flags(true, true), &snapshot));
        assert_eq!(
            h.plan(&flags(true, true), &snapshot),
            vec![
                Action::ConfigureScrape {
                    port: 9177,
                },
                Action::Clear(Flag::Configured),
            ]
        );
    }

    #[test]
    fn update_nrpe_blocks_without_nagios() {
        let h = handler("update_nrpe").unwrap();
        let mut snapshot = connected();
        snapshot.relations.nrpe_available = true;
        let actions = h.plan(&Flags::default(), &snapshot);
        assert_eq!(
            actions,
            vec![Action::Status(WorkloadStatus::blocked(
                "Waiting for nrpe package installation"
            ))]
        );
    }

    #[test]
    fn update_nrpe_uses_configured_timeout() {
        let h = handler("update_nrpe").unwrap();
        let mut snapshot = connected();
        snapshot.relations.nrpe_available = true;
        snapshot.probes.nagios_dir_present = true;

        for (raw, expected) in [("30", 30), ("soon", 15), ("", 15)] {
            snapshot.config.nrpe_check_timeout = raw.to_string();
            let actions = h.plan(&Flags::default(), &snapshot);
            let check = actions
                .iter()
                .find_map(|a| match a {
                    Action::WriteHealthCheck { check, .. } => Some(check.clone()),
                    _ => None,
                })
                .unwrap();
            assert_eq!(
                check.command_line(),
                format!("check_http -I 127.0.0.1 -p 9177 -u /metrics -t {expected}")
            );
            assert_eq!(actions.last(), Some(&Action::Set(Flag::Configured)));
        }
    }

    #[test]
    fn remove_nrpe_when_relation_gone() {
        let h = handler("remove_nrpe").unwrap();
        let configured = Flags {
            configured: true,
            ..flags(true,
            true)
        };
        assert!(h.applies(&configured, &connected()));
        assert_eq!(
            h.plan(&configured, &connected()),
            vec![
                Action::RemoveHealthCheck {
                    shortname: "prometheus_libvirt_exporter_http".into(),
                    nagios_context: "juju".into(),
                },
                Action::Clear(Flag::Configured),
            ]
        );
    }

    #[test]
    fn register_requires_leader_and_join() {
        let h = handler("register_dashboards").unwrap();
        let mut snapshot = connected();
        snapshot.relations.dashboards_joined = true;
        assert!(!h.applies(&Flags::default(), &snapshot));
        snapshot.is_leader = true;
        assert!(h.applies(&Flags::default(), &snapshot));
        let registered = Flags {
            dashboard_registered: true,
            ..Default::default()
        };
        assert!(!h.applies(&registered, &snapshot));
    }

    #[test]
    fn teardown_leaves_configured_and_registered() {
        let h = handler("remove_exporter").unwrap();
        let actions = h.plan(&flags(true, true), &Snapshot::idle());
        assert!(!actions.contains(&Action::Clear(Flag::Configured)));
        assert!(!actions.contains(&Action::Clear(Flag::DashboardRegistered)));
        assert!(actions.contains(&Action::RemoveSnap));
    }
}
