//! Builds [`Snapshot`]s from hook tools and the local filesystem.

use std::collections::BTreeSet;

use exporter_core::{
    changed_keys, CharmSettings, ConfigMap, DesiredConfig, DASHBOARDS_RELATION,
    JUJU_INFO_RELATION, NRPE_RELATION, SCRAPE_RELATION, SERVICE_UNIT,
};
use exporter_host::{HookTools, HostResult, Systemd};
use exporter_reconciler::{Hook, Observer, Probes, RelationView, Snapshot};
use tracing::debug;

/// Relations, leadership and config are read once per hook. The service
/// and Nagios probes are re-read on every snapshot.
pub struct HookObserver<'a> {
    tools: &'a HookTools<'a>,
    settings: &'a CharmSettings,
    hook: Hook,
    config: DesiredConfig,
    config_changed: BTreeSet<String>,
    relations: RelationView,
    is_leader: bool,
}

impl<'a> HookObserver<'a> {
    /// `applied` is the config committed by the last successful pass.
    pub fn new(
        tools: &'a HookTools<'a>,
        settings: &'a CharmSettings,
        hook: Hook,
        config: &ConfigMap,
        applied: Option<&ConfigMap>,
    ) -> HostResult<Self> {
        let relations = observe_relations(tools)?;
        let is_leader = tools.is_leader()?;
        let config_changed = changed_keys(applied, config);
        debug!(?hook, ?relations, is_leader, changed = ?config_changed, "hook observed");

        Ok(Self {
            tools,
            settings,
            hook,
            config: DesiredConfig::from_map(config),
            config_changed,
            relations,
            is_leader,
        })
    }

    fn probes(&self) -> HostResult<Probes> {
        Ok(Probes {
            service_running: Systemd::new(self.tools.runner()).is_running(SERVICE_UNIT)?,
            nagios_dir_present: self.settings.nagios_dir.is_dir(),
        })
    }
}

impl Observer for HookObserver<'_> {
    fn snapshot(&mut self) -> anyhow::Result<Snapshot> {
        Ok(Snapshot {
            hook: self.hook.clone(),
            config: self.config.clone(),
            config_changed: self.config_changed.clone(),
            relations: self.relations,
            is_leader: self.is_leader,
            probes: self.probes()?,
        })
    }
}

/// A relation counts as connected once it has a remote unit. Juju drops
/// departing units from `relation-list`, so a broken relation reads as gone.
fn observe_relations(tools: &HookTools<'_>) -> HostResult<RelationView> {
    let juju_info = tools.relation_has_units(JUJU_INFO_RELATION)?;
    Ok(RelationView {
        juju_info_connected: juju_info,
        juju_info_available: juju_info,
        scrape_available: tools.relation_has_units(SCRAPE_RELATION)?,
        nrpe_available: tools.relation_has_units(NRPE_RELATION)?,
        dashboards_joined: tools.relation_has_units(DASHBOARDS_RELATION)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use exporter_host::{CommandOutput, ScriptedRunner};
    use serde_json::json;

    fn settings(nagios_dir: &std::path::Path) -> CharmSettings {
        CharmSettings {
            nagios_dir: nagios_dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn first_run_marks_every_key_changed() {
        let runner = ScriptedRunner::new();
        runner.respond("is-leader", CommandOutput::ok("true"));
        let tools = HookTools::new(&runner);
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&dir.path().join("nagios"));
        let config = json!({"snap_channel": "stable", "nrpe_check_timeout": "15"})
            .as_object()
            .cloned()
            .unwrap();

        let mut observer =
            HookObserver::new(&tools, &settings, Hook::Install, &config, None).unwrap();
        let snapshot = observer.snapshot().unwrap();

        assert!(snapshot.channel_changed());
        assert!(snapshot.config_key_changed("nrpe_check_timeout"));
        assert!(snapshot.is_leader);
        assert!(!snapshot.probes.nagios_dir_present);
        assert_eq!(snapshot.relations, RelationView::default());
    }

    #[test]
    fn probes_are_refreshed_per_snapshot() {
        let runner = ScriptedRunner::new();
        runner.respond("is-leader", CommandOutput::ok("false"));
        runner.fail("systemctl is-active");
        runner.respond(
            "relation-ids --format=json juju-info",
            CommandOutput::ok(r#"["juju-info:1"]"#),
        );
        runner.respond(
            "relation-list --format=json -r juju-info:1",
            CommandOutput::ok(r#"["nova-compute/0"]"#),
        );
        let tools = HookTools::new(&runner);
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&dir.path().join("nagios"));
        let config = ConfigMap::new();

        let mut observer = HookObserver::new(
            &tools,
            &settings,
            Hook::UpdateStatus,
            &config,
            Some(&config),
        )
        .unwrap();
        let before = observer.snapshot().unwrap();
        assert!(!before.probes.service_running);
        assert!(before.relations.juju_info_available);
        assert!(!before.config_changed());

        runner.respond("systemctl is-active", CommandOutput::ok(""));
        std::fs::create_dir(&settings.nagios_dir).unwrap();
        let after = observer.snapshot().unwrap();
        assert!(after.probes.service_running);
        assert!(after.probes.nagios_dir_present);
        assert_eq!(runner.count("relation-ids --format=json juju-info"), 1);
    }
}
