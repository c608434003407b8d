//! The `dashboards` relation as a [`DashboardSink`].

use exporter_core::DASHBOARDS_RELATION;
use exporter_dashboards::DashboardSink;
use exporter_host::{HookTools, HostError};
use serde_json::{json, Value};
use tracing::warn;

/// Publishes registration requests on the first `dashboards` relation.
///
/// Each dashboard goes into this unit's data bag as
/// `request_<name> = {"name": ..., "dashboard": ...}`.
pub struct DashboardRelation<'a> {
    tools: &'a HookTools<'a>,
}

impl<'a> DashboardRelation<'a> {
    pub fn new(tools: &'a HookTools<'a>) -> Self {
        Self { tools }
    }

    fn relation_id(&self) -> Result<Option<String>, HostError> {
        Ok(self.tools.relation_ids(DASHBOARDS_RELATION)?.into_iter().next())
    }
}

impl DashboardSink for DashboardRelation<'_> {
    type Error = HostError;

    fn is_available(&self) -> bool {
        match self.relation_id() {
            Ok(id) => id.is_some(),
            Err(e) => {
                warn!(error = %e, "cannot resolve dashboards relation");
                false
            }
        }
    }

    fn register_dashboard(&self, name: &str, dashboard: &Value) -> Result<(), HostError> {
        let Some(relation_id) = self.relation_id()? else {
            return Err(HostError::Output {
                command: format!("relation-ids {DASHBOARDS_RELATION}"),
                reason: "relation departed".to_string(),
            });
        };
        let request = json!({ "name": name, "dashboard": dashboard }).to_string();
        let key = format!("request_{name}");
        self.tools
            .relation_set(&relation_id, &[(key.as_str(), request.as_str())])
    }
}
