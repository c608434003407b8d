//! libvirtd AppArmor local-profile patch.
//!
//! libvirtd's profile logs a ptrace denial every time the exporter daemon
//! reads its process state. Appending a deny rule to the local include
//! silences it. The rule is appended at most once and the profile is only
//! reloaded when the file actually changed.

use std::io::Write;
use std::path::Path;

use exporter_core::DENY_PTRACE_RULE;
use tracing::{debug, info};

use crate::error::{HostError, HostResult};
use crate::runner::CommandRunner;

/// Ensure the deny-ptrace rule is present in `local_profile`, reloading
/// `profile` when it had to be added.
///
/// Returns whether the file was changed. A missing local profile (libvirtd
/// not installed) is a no-op.
pub fn patch_local_profile(
    local_profile: &Path,
    profile: &Path,
    runner: &dyn CommandRunner,
) -> HostResult<bool> {
    if !local_profile.exists() {
        debug!(?local_profile, "no libvirtd local profile, skipping apparmor patch");
        return Ok(false);
    }

    let io_err = |source| HostError::Io {
        path: local_profile.to_path_buf(),
        source,
    };

    let current = std::fs::read_to_string(local_profile).map_err(io_err)?;
    if current.lines().any(|line| line.trim() == DENY_PTRACE_RULE) {
        debug!(?local_profile, "deny ptrace rule already present");
        return Ok(false);
    }

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(local_profile)
        .map_err(io_err)?;
    write!(file, "\n{DENY_PTRACE_RULE}\n").map_err(io_err)?;

    let profile_arg = profile.to_string_lossy();
    runner.check("apparmor_parser", &["-r", &profile_arg])?;
    info!(?local_profile, "deny ptrace rule added, libvirtd profile reloaded");
    Ok(true)
}
