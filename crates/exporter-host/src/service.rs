//! systemd service probe and control.

use tracing::info;

use crate::error::HostResult;
use crate::runner::CommandRunner;

pub struct Systemd<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Systemd<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Whether `unit` is active. An inactive or unknown unit is `false`.
    pub fn is_running(&self, unit: &str) -> HostResult<bool> {
        Ok(self
            .runner
            .run("systemctl", &["is-active", "--quiet", unit])?
            .success)
    }

    pub fn start(&self, unit: &str) -> HostResult<()> {
        self.runner.check("systemctl", &["start", unit])?;
        info!(%unit, "service start issued");
        Ok(())
    }

    pub fn restart(&self, unit: &str) -> HostResult<()> {
        self.runner.check("systemctl", &["restart", unit])?;
        info!(%unit, "service restarted");
        Ok(())
    }
}
