//! exporter-health: health checking for the libvirt exporter.
//!
//! Two independent concerns:
//!
//! - **NRPE registration.** [`HttpCheck`] renders the `check_http` command
//!   the monitoring host runs against the exporter, and [`NrpeWriter`]
//!   materializes it as NRPE command and Nagios service definitions.
//! - **Live probing.** [`probe_metrics`] fetches `/metrics` and verifies the
//!   exporter is emitting its metric families.
//!
//! ```text
//! DesiredConfig ──check_timeout()──▶ HttpCheck ──NrpeWriter::write()──▶ nrpe.d/*.cfg
//!                                                                     └▶ export/service__*.cfg
//! probe_metrics(addr) ──GET /metrics──▶ MetricsProbe
//! ```

pub mod check;
pub mod error;
pub mod nrpe;
pub mod probe;

pub use check::{check_timeout, HttpCheck};
pub use error::{HealthError, HealthResult};
pub use nrpe::{nagios_hostname, NrpeWriter};
pub use probe::{probe_metrics, MetricsProbe};
