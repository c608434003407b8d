//! NRPE check materialization.
//!
//! A registered check is two files: the NRPE command definition the local
//! `nagios-nrpe-server` executes, and the Nagios service definition exported
//! for the monitoring host to collect. Restarting the NRPE daemon is left to
//! the caller.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::check::{command_name, HttpCheck};
use crate::error::{HealthError, HealthResult};

/// Host name this unit is known by in Nagios: `<context>-<unit>`, with the
/// unit's `/` replaced by `-`.
pub fn nagios_hostname(nagios_context: &str, unit_name: &str) -> String {
    format!("{}-{}", nagios_context, unit_name.replace('/', "-"))
}

/// Writes and removes NRPE check files under configurable roots.
#[derive(Debug, Clone)]
pub struct NrpeWriter {
    config_dir: PathBuf,
    export_dir: PathBuf,
    plugin_dir: PathBuf,
}

impl NrpeWriter {
    pub fn new(config_dir: &Path, export_dir: &Path, plugin_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            export_dir: export_dir.to_path_buf(),
            plugin_dir: plugin_dir.to_path_buf(),
        }
    }

    pub fn command_path(&self, shortname: &str) -> PathBuf {
        self.config_dir.join(format!("{}.cfg", command_name(shortname)))
    }

    pub fn service_path(&self, shortname: &str, hostname: &str) -> PathBuf {
        self.export_dir
            .join(format!("service__{}_{}.cfg", hostname, command_name(shortname)))
    }

    /// Write both definitions for `check`, replacing any previous version.
    pub fn write(&self, check: &HttpCheck, hostname: &str, servicegroup: &str) -> HealthResult<()> {
        let command_path = self.command_path(&check.shortname);
        write_file(&command_path, &self.render_command(check, servicegroup))?;

        let service_path = self.service_path(&check.shortname, hostname);
        write_file(&service_path, &render_service(check, hostname, servicegroup))?;

        info!(
            check = %check.shortname,
            command = %check.command_line(),
            "nrpe check written"
        );
        Ok(())
    }

    /// Remove both definitions. Missing files are not an error.
    pub fn remove(&self, shortname: &str, hostname: &str) -> HealthResult<()> {
        remove_file(&self.command_path(shortname))?;
        remove_file(&self.service_path(shortname, hostname))?;
        info!(check = %shortname, "nrpe check removed");
        Ok(())
    }

    fn render_command(&self, check: &HttpCheck, servicegroup: &str) -> String {
        let plugin = self.plugin_dir.join(check.command_line());
        format!(
            "# check {shortname}\n\
             # The following header was added automatically by juju\n\
             # Modifying it will affect nagios monitoring and alerting\n\
             # servicegroups: {servicegroup}\n\
             command[{command}]={plugin}\n",
            shortname = check.shortname,
            command = check.command_name(),
            plugin = plugin.display(),
        )
    }
}

fn render_service(check: &HttpCheck, hostname: &str, servicegroup: &str) -> String {
    format!(
        "#---------------------------------------------------\n\
         # This file is Juju managed\n\
         #---------------------------------------------------\n\
         define service {{\n\
         \x20   use                             active-service\n\
         \x20   host_name                       {hostname}\n\
         \x20   service_description             {hostname}[{shortname}] {description}\n\
         \x20   check_command                   check_nrpe!{command}\n\
         \x20   servicegroups                   {servicegroup}\n\
         }}\n",
        shortname = check.shortname,
        description = check.description,
        command = check.command_name(),
    )
}

fn write_file(path: &Path, content: &str) -> HealthResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| HealthError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| HealthError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn remove_file(path: &Path) -> HealthResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(?path, "nrpe file already absent");
            Ok(())
        }
        Err(source) => Err(HealthError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exporter_core::DesiredConfig;

    fn writer(root: &Path) -> NrpeWriter {
        NrpeWriter::new(
            &root.join("nrpe.d"),
            &root.join("export"),
            Path::new("/usr/lib/nagios/plugins"),
        )
    }

    #[test]
    fn hostname_replaces_unit_separator() {
        assert_eq!(
            nagios_hostname("juju", "prometheus-libvirt-exporter/0"),
            "juju-prometheus-libvirt-exporter-0"
        );
    }

    #[test]
    fn write_creates_command_and_service() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());
        let check = HttpCheck::for_exporter(&DesiredConfig::default());

        writer.write(&check, "juju-exporter-0", "juju").unwrap();

        let command = std::fs::read_to_string(writer.command_path(&check.shortname)).unwrap();
        assert!(command.contains(
            "command[check_prometheus_libvirt_exporter_http]=\
             /usr/lib/nagios/plugins/check_http -I 127.0.0.1 -p 9177 -u /metrics -t 15"
        ));

        let service =
            std::fs::read_to_string(writer.service_path(&check.shortname, "juju-exporter-0"))
                .unwrap();
        assert!(service.contains("host_name                       juju-exporter-0"));
        assert!(service.contains("check_nrpe!check_prometheus_libvirt_exporter_http"));
        assert!(service.contains("Prometheus Libvirt Exporter HTTP check"));
    }

    #[test]
    fn rewrite_replaces_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());
        let mut check = HttpCheck::for_exporter(&DesiredConfig::default());
        writer.write(&check, "h", "juju").unwrap();

        check.timeout_secs = 45;
        writer.write(&check, "h", "juju").unwrap();

        let command = std::fs::read_to_string(writer.command_path(&check.shortname)).unwrap();
        assert!(command.contains("-t 45"));
        assert!(!command.contains("-t 15"));
    }

    #[test]
    fn remove_deletes_both_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());
        let check = HttpCheck::for_exporter(&DesiredConfig::default());
        writer.write(&check, "h", "juju").unwrap();

        writer.remove(&check.shortname, "h").unwrap();
        assert!(!writer.command_path(&check.shortname).exists());
        assert!(!writer.service_path(&check.shortname, "h").exists());

        writer.remove(&check.shortname, "h").unwrap();
    }
}
