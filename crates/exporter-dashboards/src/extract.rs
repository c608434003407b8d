//! Overlay an operator-supplied zip of dashboards onto the defaults.
//!
//! Failures never escape: a bad copy, a corrupt archive or an unwritable
//! target are logged and the definitions already on disk stay authoritative.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::error::{DashboardError, DashboardResult};

/// What an extraction attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// No resource attached; defaults remain in place.
    NoResource,
    /// Archive entries were written into the dashboard directory.
    Extracted { files: usize },
    /// The attempt was abandoned; existing definitions are untouched or partially overlaid.
    Failed,
}

/// Copy `resource` into `dashboard_dir` and extract every file entry there,
/// overwriting same-named definitions.
pub fn extract_resource(resource: Option<&Path>, dashboard_dir: &Path) -> Extraction {
    let Some(resource) = resource else {
        debug!("no dashboards resource found");
        return Extraction::NoResource;
    };

    debug!(?resource, "installing dashboards from resource");
    if let Err(e) = copy_into(resource, dashboard_dir) {
        error!(error = %e, "problem copying dashboards resource");
        return Extraction::Failed;
    }

    match unpack(resource, dashboard_dir) {
        Ok(files) => {
            debug!(files, "extracted dashboards from resource");
            Extraction::Extracted { files }
        }
        Err(e) => {
            error!(error = %e, "unable to unzip dashboards resource");
            Extraction::Failed
        }
    }
}

fn copy_into(resource: &Path, dir: &Path) -> DashboardResult<PathBuf> {
    let copy_err = |source| DashboardError::Copy {
        from: resource.to_path_buf(),
        to: dir.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(copy_err)?;
    let file_name = resource.file_name().unwrap_or(resource.as_os_str());
    let target = dir.join(file_name);
    std::fs::copy(resource, &target).map_err(copy_err)?;
    Ok(target)
}

/// Extract file entries flatly: only each entry's final path component is kept.
fn unpack(resource: &Path, dir: &Path) -> DashboardResult<usize> {
    let file = File::open(resource).map_err(|source| DashboardError::Read {
        path: resource.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut written = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let Some(file_name) = entry
            .enclosed_name()
            .and_then(|name| name.file_name().map(|n| n.to_os_string()))
        else {
            debug!(entry = %entry.name(), "skipping unsafe archive entry");
            continue;
        };

        let target = dir.join(file_name);
        let write_err = |source| DashboardError::Write {
            path: target.clone(),
            source,
        };
        let mut out = File::create(&target).map_err(write_err)?;
        std::io::copy(&mut entry, &mut out).map_err(write_err)?;
        written += 1;
    }
    Ok(written)
}
