//! Snap package control.

use tracing::info;

use crate::error::HostResult;
use crate::runner::CommandRunner;

pub struct Snap<'a> {
    runner: &'a dyn CommandRunner,
    name: &'a str,
}

impl<'a> Snap<'a> {
    pub fn new(runner: &'a dyn CommandRunner, name: &'a str) -> Self {
        Self { runner, name }
    }

    pub fn is_installed(&self) -> HostResult<bool> {
        Ok(self.runner.run("snap", &["list", self.name])?.success)
    }

    /// Install from `channel`, or refresh onto it when already present.
    pub fn install(&self, channel: &str) -> HostResult<()> {
        let channel_arg = format!("--channel={channel}");
        if self.is_installed()? {
            self.runner
                .check("snap", &["refresh", self.name, &channel_arg])?;
            info!(snap = %self.name, %channel, "snap refreshed");
        } else {
            self.runner
                .check("snap", &["install", self.name, &channel_arg])?;
            info!(snap = %self.name, %channel, "snap installed");
        }
        Ok(())
    }

    pub fn connect(&self, plug: &str) -> HostResult<()> {
        self.runner.check("snap", &["connect", plug])?;
        info!(%plug, "snap plug connected");
        Ok(())
    }

    pub fn remove(&self) -> HostResult<()> {
        self.runner.check("snap", &["remove", self.name])?;
        info!(snap = %self.name, "snap removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScriptedRunner;

    #[test]
    fn installs_when_absent() {
        let runner = ScriptedRunner::new();
        runner.fail("snap list");
        Snap::new(&runner, "prometheus-libvirt-exporter")
            .install("stable")
            .unwrap();
        assert_eq!(
            runner.calls(),
            vec![
                "snap list prometheus-libvirt-exporter".to_string(),
                "snap install prometheus-libvirt-exporter --channel=stable".to_string(),
            ]
        );
    }

    #[test]
    fn refreshes_when_present() {
        let runner = ScriptedRunner::new();
        Snap::new(&runner, "prometheus-libvirt-exporter")
            .install("edge")
            .unwrap();
        assert_eq!(runner.count("snap refresh prometheus-libvirt-exporter --channel=edge"), 1);
        assert_eq!(runner.count("snap install"), 0);
    }

    #[test]
    fn install_failure_propagates() {
        let runner = ScriptedRunner::new();
        runner.fail("snap list");
        runner.fail("snap install");
        assert!(Snap::new(&runner, "x").install("stable").is_err());
    }
}
