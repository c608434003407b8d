//! Dashboard loading and registration.

use std::path::Path;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{DashboardError, DashboardResult};

pub const DASHBOARD_EXTENSION: &str = "json";

/// A dashboard definition ready to be transmitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    /// File stem of the definition, used as the registration key.
    pub name: String,
    /// Hex SHA-256 of the raw file bytes.
    pub digest: String,
    /// Parsed definition with `digest` and `source_model` added.
    pub document: Value,
}

/// Hex SHA-256 digest of `bytes`.
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Load every `*.json` definition directly inside `dir` (no recursion),
/// sorted by file name.
///
/// Each document gets a `digest` of its raw bytes and the `source_model` it
/// was pushed from. Files that are not JSON objects are logged and skipped.
/// A missing directory yields no dashboards.
pub fn load_dashboards(dir: &Path, model: &str) -> DashboardResult<Vec<Dashboard>> {
    if !dir.is_dir() {
        debug!(?dir, "dashboard directory absent");
        return Ok(Vec::new());
    }

    let mut dashboards = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| DashboardError::Scan {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(DASHBOARD_EXTENSION)
        {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let bytes = std::fs::read(path).map_err(|source| DashboardError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let hash = digest(&bytes);

        let mut document: Map<String, Value> = match serde_json::from_slice(&bytes) {
            Ok(document) => document,
            Err(e) => {
                warn!(?path, error = %e, "skipping unparsable dashboard");
                continue;
            }
        };
        document.insert("digest".to_string(), Value::String(hash.clone()));
        document.insert("source_model".to_string(), Value::String(model.to_string()));

        dashboards.push(Dashboard {
            name: name.to_string(),
            digest: hash,
            document: Value::Object(document),
        });
    }
    Ok(dashboards)
}

/// The dashboard consumer relation.
pub trait DashboardSink {
    type Error: std::fmt::Display;

    /// Whether a consumer endpoint can be resolved right now.
    fn is_available(&self) -> bool;

    fn register_dashboard(&self, name: &str, dashboard: &Value) -> Result<(), Self::Error>;
}

/// Outcome of pushing the full dashboard set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// No consumer endpoint; nothing was sent.
    NoEndpoint,
    /// Every dashboard was transmitted.
    Completed {
        count: usize,
    },
    /// Transmission stopped at `failed`; the set must be retried in full.
    Interrupted {
        sent: usize,
        failed: String,
    },
}

impl Registration {
    pub fn is_complete(&self) -> bool {
        matches!(self, Registration::Completed { .. })
    }
}

/// Push every dashboard to `sink`, stopping at the first failure.
pub fn register_all<S: DashboardSink>(sink: &S, dashboards: &[Dashboard]) -> Registration {
    if !sink.is_available() {
        info!("no grafana endpoint available, skipping dashboard registration");
        return Registration::NoEndpoint;
    }

    for (sent, dashboard) in dashboards.iter().enumerate() {
        if let Err(e) = sink.register_dashboard(&dashboard.name, &dashboard.document) {
            warn!(dashboard = %dashboard.name, error = %e, "dashboard registration interrupted");
            return Registration::Interrupted {
                sent,
                failed: dashboard.name.clone(),
            };
        }
        info!(dashboard = %dashboard.name, digest = %dashboard.digest, "pushed dashboard");
    }
    Registration::Completed {
        count: dashboards.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        available: bool,
        fail_on: Option<&'static str>,
        received: RefCell<Vec<(String, Value)>>,
    }

    impl DashboardSink for RecordingSink {
        type Error = String;

        fn is_available(&self) -> bool {
            self.available
        }

        fn register_dashboard(&self, name: &str, dashboard: &Value) -> Result<(), String> {
            if self.fail_on.is_some_and(|f| f == name) {
                return Err("relation departed".to_string());
            }
            self.received
                .borrow_mut()
                .push((name.to_string(), dashboard.clone()));
            Ok(())
        }
    }

    fn dashboard_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("libvirt.json"), r#"{"title": "Libvirt"}"#).unwrap();
        std::fs::write(dir.path().join("hosts.json"), r#"{"title": "Hosts"}"#).unwrap();
        std::fs::write(dir.path().join("README.md"), "not a dashboard").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/deep.json"), "{}").unwrap();
        dir
    }

    #[test]
    fn digest_is_deterministic_and_content_sensitive() {
        let a = digest(br#"{"title": "Libvirt"}"#);
        assert_eq!(a, digest(br#"{"title": "Libvirt"}"#));
        assert_eq!(a.len(), 64);
        assert_ne!(a, digest(br#"{"title": "Libvirs"}"#));
    }

    #[test]
    fn load_scans_flat_json_only() {
        let dir = dashboard_dir();
        let dashboards = load_dashboards(dir.path(), "openstack").unwrap();
        let names: Vec<_> = dashboards.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["hosts", "libvirt"]);
    }

    #[test]
    fn load_augments_documents() {
        let dir = dashboard_dir();
        let dashboards = load_dashboards(dir.path(), "openstack").unwrap();
        let libvirt = dashboards.iter().find(|d| d.name == "libvirt").unwrap();

        assert_eq!(libvirt.document["title"], "Libvirt");
        assert_eq!(libvirt.document["source_model"], "openstack");
        assert_eq!(
            libvirt.document["digest"],
            Value::String(digest(br#"{"title": "Libvirt"}"#))
        );
    }

    #[test]
    fn load_skips_unparsable_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        std::fs::write(dir.path().join("list.json"), "[1, 2]").unwrap();
        std::fs::write(dir.path().join("ok.json"), "{}").unwrap();
        let dashboards = load_dashboards(dir.path(), "m").unwrap();
        assert_eq!(dashboards.len(), 1);
        assert_eq!(dashboards[0].name, "ok");
    }

    #[test]
    fn load_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dashboards(&dir.path().join("absent"), "m").unwrap().is_empty());
    }

    #[test]
    fn register_without_endpoint_sends_nothing() {
        let dir = dashboard_dir();
        let sink = RecordingSink::default();
        let result = register_all(&sink, &load_dashboards(dir.path(), "m").unwrap());
        assert_eq!(result, Registration::NoEndpoint);
        assert!(sink.received.borrow().is_empty());
    }

    #[test]
    fn register_sends_full_set() {
        let dir = dashboard_dir();
        let sink = RecordingSink {
            available: true,
            ..Default::default()
        };
        let result = register_all(&sink, &load_dashboards(dir.path(), "m").unwrap());
        assert_eq!(result, Registration::Completed { count: 2 });
        assert!(result.is_complete());
        assert_eq!(sink.received.borrow().len(), 2);
    }

    #[test]
    fn register_stops_at_first_failure() {
        let dir = dashboard_dir();
        let sink = RecordingSink {
            available: true,
            fail_on: Some("libvirt"),
            ..Default::default()
        };
        let result = register_all(&sink, &load_dashboards(dir.path(), "m").unwrap());
        assert_eq!(
            result,
            Registration::Interrupted {
                sent: 1,
                failed: "libvirt".to_string()
            }
        );
        assert!(!result.is_complete());
    }

    #[test]
    fn same_content_registers_same_digest_twice() {
        let dir = dashboard_dir();
        let first = load_dashboards(dir.path(), "m").unwrap();
        let second = load_dashboards(dir.path(), "m").unwrap();
        assert_eq!(first[1].digest, second[1].digest);

        std::fs::write(dir.path().join("libvirt.json"), r#"{"title": "Libvirt!"}"#).unwrap();
        let changed = load_dashboards(dir.path(), "m").unwrap();
        assert_ne!(first[1].digest, changed[1].digest);
    }
}
