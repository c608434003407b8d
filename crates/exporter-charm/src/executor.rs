//! Carries out reconciler actions on the unit.

use exporter_core::{
    CharmSettings, DASHBOARD_RESOURCE, LIBVIRT_PLUG, SCRAPE_RELATION, SERVICE_UNIT, SNAP_NAME,
};
use exporter_dashboards::{
    extract_resource, load_dashboards, register_all, Extraction, Registration,
};
use exporter_health::{nagios_hostname, NrpeWriter};
use exporter_host::{patch_local_profile, HookTools, ScrapeRelation, ScrapeTarget, Snap, Systemd};
use exporter_reconciler::{Action, Executor, Outcome};
use tracing::{debug, info};

use crate::context::JujuEnv;
use crate::dashboards::DashboardRelation;

pub const NRPE_SERVICE: &str = "nagios-nrpe-server";

pub struct HostExecutor<'a> {
    tools: &'a HookTools<'a>,
    settings: &'a CharmSettings,
    env: &'a JujuEnv,
}

impl<'a> HostExecutor<'a> {
    pub fn new(tools: &'a HookTools<'a>, settings: &'a CharmSettings, env: &'a JujuEnv) -> Self {
        Self { tools, settings, env }
    }

    fn snap(&self) -> Snap<'a> {
        Snap::new(self.tools.runner(), SNAP_NAME)
    }

    fn systemd(&self) -> Systemd<'a> {
        Systemd::new(self.tools.runner())
    }

    fn nrpe(&self) -> NrpeWriter {
        NrpeWriter::new(
            &self.settings.nrpe_config_dir,
            &self.settings.nagios_export_dir,
            &self.settings.nagios_plugin_dir,
        )
    }

    fn refresh_dashboards(&self) -> anyhow::Result<Outcome> {
        let resource = self.tools.resource_get(DASHBOARD_RESOURCE)?;
        let outcome = match extract_resource(resource.as_deref(), &self.settings.dashboard_dir) {
            Extraction::Extracted { files } => {
                info!(files, "dashboards resource extracted");
                Outcome::DashboardsExtracted
            }
            Extraction::NoResource | Extraction::Failed => Outcome::Done,
        };
        Ok(outcome)
    }

    fn register_dashboards(&self) -> anyhow::Result<Outcome> {
        let dashboards = load_dashboards(&self.settings.dashboard_dir, &self.env.model_name)?;
        let sink = DashboardRelation::new(self.tools);
        match register_all(&sink, &dashboards) {
            Registration::Completed { count } => {
                info!(count, "dashboards registered");
                Ok(Outcome::Done)
            }
            Registration::NoEndpoint => Ok(Outcome::Skipped),
            Registration::Interrupted { sent, failed } => {
                debug!(sent, %failed, "dashboard set incomplete, retrying next hook");
                Ok(Outcome::Skipped)
            }
        }
    }
}

impl Executor for HostExecutor<'_> {
    fn execute(&mut self, action: &Action) -> anyhow::Result<Outcome> {
        match action {
            Action::Status(status) => self.tools.status_set(status)?,
            Action::InstallSnap { channel } => self.snap().install(channel)?,
            Action::ConnectPlug => self.snap().connect(LIBVIRT_PLUG)?,
            Action::PatchAppArmor => {
                patch_local_profile(
                    &self.settings.apparmor_local_profile,
                    &self.settings.apparmor_profile,
                    self.tools.runner(),
                )?;
            }
            Action::OpenPort { port } => self.tools.open_port(*port)?,
            Action::StartService => self.systemd().start(SERVICE_UNIT)?,
            Action::RemoveSnap => self.snap().remove()?,
            Action::ConfigureScrape { port } => {
                ScrapeRelation::new(self.tools, SCRAPE_RELATION).configure(*port)?
            }
            Action::WriteHealthCheck { check, nagios_context } => {
                let hostname = nagios_hostname(nagios_context, &self.env.unit_name);
                self.nrpe().write(check, &hostname, nagios_context)?;
                self.systemd().restart(NRPE_SERVICE)?;
            }
            Action::RemoveHealthCheck { shortname, nagios_context } => {
                let hostname = nagios_hostname(nagios_context, &self.env.unit_name);
                self.nrpe().remove(shortname, &hostname)?;
                self.systemd().restart(NRPE_SERVICE)?;
            }
            Action::RefreshDashboards => return self.refresh_dashboards(),
            Action::RegisterDashboards => return self.register_dashboards(),
            // Flag changes never reach the executor.
            Action::Set(_) | Action::Clear(_) => {}
        }
        Ok(Outcome::Done)
    }
}
