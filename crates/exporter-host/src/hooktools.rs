//! Juju hook tools.
//!
//! Thin typed wrappers over the commands Juju puts on `$PATH` while a hook
//! runs. Structured output is requested as JSON wherever the tool supports it.

use std::path::PathBuf;

use exporter_core::config::ConfigMap;
use exporter_core::WorkloadStatus;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{HostError, HostResult};
use crate::runner::{render, CommandRunner};

pub struct HookTools<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> HookTools<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &'a dyn CommandRunner {
        self.runner
    }

    /// All charm options.
    pub fn config_get(&self) -> HostResult<ConfigMap> {
        let args = ["--format=json"];
        match self.json("config-get", &args)? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(ConfigMap::new()),
            other => Err(HostError::Output {
                command: render("config-get", &args),
                reason: format!("expected an object, got {other}"),
            }),
        }
    }

    pub fn is_leader(&self) -> HostResult<bool> {
        let args = ["--format=json"];
        match self.json("is-leader", &args)? {
            Value::Bool(leader) => Ok(leader),
            other => Err(HostError::Output {
                command: render("is-leader", &args),
                reason: format!("expected a boolean, got {other}"),
            }),
        }
    }

    /// Relation ids established for the named endpoint.
    pub fn relation_ids(&self, endpoint: &str) -> HostResult<Vec<String>> {
        self.string_list("relation-ids", &["--format=json", endpoint])
    }

    /// Remote units on a relation.
    pub fn relation_list(&self, relation_id: &str) -> HostResult<Vec<String>> {
        self.string_list("relation-list", &["--format=json", "-r", relation_id])
    }

    /// Whether any relation on `endpoint` has at least one remote unit.
    pub fn relation_has_units(&self, endpoint: &str) -> HostResult<bool> {
        for relation_id in self.relation_ids(endpoint)? {
            if !self.relation_list(&relation_id)?.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Publish `settings` into this unit's data bag on `relation_id`.
    pub fn relation_set(&self, relation_id: &str, settings: &[(&str, &str)]) -> HostResult<()> {
        let pairs: Vec<String> = settings.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let mut args = vec!["-r", relation_id];
        args.extend(pairs.iter().map(String::as_str));
        self.runner.check("relation-set", &args)?;
        debug!(%relation_id, keys = settings.len(), "relation data set");
        Ok(())
    }

    pub fn status_set(&self, status: &WorkloadStatus) -> HostResult<()> {
        self.runner
            .check("status-set", &[status.kind.as_str(), &status.message])?;
        info!(status = %status, "status set");
        Ok(())
    }

    pub fn open_port(&self, port: u16) -> HostResult<()> {
        self.runner.check("open-port", &[&format!("{port}/tcp")])?;
        Ok(())
    }

    /// Local path of an attached resource, or `None` when nothing is attached.
    pub fn resource_get(&self, name: &str) -> HostResult<Option<PathBuf>> {
        let output = self.runner.run("resource-get", &[name])?;
        let path = output.stdout.trim();
        if !output.success || path.is_empty() {
            debug!(resource = %name, stderr = %output.stderr.trim(), "resource not available");
            return Ok(None);
        }
        Ok(Some(PathBuf::from(path)))
    }

    pub fn private_address(&self) -> HostResult<String> {
        let address = self.runner.check("unit-get", &["private-address"])?;
        Ok(address.trim().to_string())
    }

    fn json(&self, program: &str, args: &[&str]) -> HostResult<Value> {
        let stdout = self.runner.check(program, args)?;
        if stdout.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&stdout).map_err(|e| HostError::Output {
            command: render(program, args),
            reason: e.to_string(),
        })
    }

    fn string_list(&self, program: &str, args: &[&str]) -> HostResult<Vec<String>> {
        match self.json(program, args)? {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()),
            other => Err(HostError::Output {
                command: render(program, args),
                reason: format!("expected a list, got {other}"),
            }),
        }
    }
}
