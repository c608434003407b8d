//! Scrape relation capability.

use tracing::{debug, info};

use crate::error::HostResult;
use crate::hooktools::HookTools;

/// Something a metrics scraper can be pointed at.
pub trait ScrapeTarget {
    /// Advertise the exporter port to every connected scraper.
    fn configure(&self, port: u16) -> HostResult<()>;
}

/// Publishes `hostname`/`port` on every `scrape` relation.
pub struct ScrapeRelation<'a> {
    tools: &'a HookTools<'a>,
    endpoint: &'a str,
}

impl<'a> ScrapeRelation<'a> {
    pub fn new(tools: &'a HookTools<'a>, endpoint: &'a str) -> Self {
        Self { tools, endpoint }
    }
}

impl ScrapeTarget for ScrapeRelation<'_> {
    fn configure(&self, port: u16) -> HostResult<()> {
        let relation_ids = self.tools.relation_ids(self.endpoint)?;
        if relation_ids.is_empty() {
            debug!(endpoint = %self.endpoint, "no scrape relation to configure");
            return Ok(());
        }
        let hostname = self.tools.private_address()?;
        let port = port.to_string();
        for relation_id in &relation_ids {
            self.tools.relation_set(
                relation_id,
                &[("hostname", hostname.as_str()), ("port", port.as_str())],
            )?;
        }
        info!(%port, relations = relation_ids.len(), "scrape relation configured");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandOutput, ScriptedRunner};

    #[test]
    fn configure_publishes_port_on_each_relation() {
        let runner = ScriptedRunner::new();
        runner.respond(
            "relation-ids --format=json scrape",
            CommandOutput::ok(r#"["scrape:1","scrape:2"]"#),
        );
        runner.respond("unit-get private-address", CommandOutput::ok("10.5.0.9\n"));
        let tools = HookTools::new(&runner);

        ScrapeRelation::new(&tools, "scrape").configure(9177).unwrap();

        assert_eq!(runner.count("relation-set -r scrape:1 hostname=10.5.0.9 port=9177"), 1);
        assert_eq!(runner.count("relation-set -r scrape:2 hostname=10.5.0.9 port=9177"), 1);
    }

    #[test]
    fn configure_without_relation_is_noop() {
        let runner = ScriptedRunner::new();
        let tools = HookTools::new(&runner);
        ScrapeRelation::new(&tools, "scrape").configure(9177).unwrap();
        assert_eq!(runner.count("relation-set"), 0);
    }
}
