//! exporter-dashboards: Grafana dashboards shipped with the exporter charm.
//!
//! The charm ships default dashboard definitions in a flat directory. An
//! operator may attach a zip resource whose entries overlay those defaults.
//! Registration pushes every definition to the dashboard consumer, each
//! augmented with a content digest and the source model name.
//!
//! ```text
//! resource.zip ──extract_resource()──▶ dashboard_dir/*.json
//!                                          │
//!                             load_dashboards(dir, model)
//!                                          │
//!                        register_all(sink) ──▶ DashboardSink
//! ```

pub mod error;
pub mod extract;
pub mod register;

pub use error::{DashboardError, DashboardResult};
pub use extract::{extract_resource, Extraction};
pub use register::{digest, load_dashboards, register_all, Dashboard, DashboardSink, Registration};
