//! Live probe of the exporter's metrics endpoint.
//!
//! Fetches `/metrics` and checks the exposition actually carries libvirt
//! metric families, not just a 200 from an unrelated listener.

use std::time::Duration;

use http_body_util::BodyExt;
use tracing::debug;

use exporter_core::{METRICS_PATH, METRIC_PREFIX};

/// Result of a single metrics probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsProbe {
    /// 2xx with at least one sample line carrying the metric prefix.
    Healthy {
        samples: usize,
    },
    /// 2xx, but no line starts with the metric prefix.
    MissingMetrics,
    /// The endpoint answered with a non-2xx status.
    Unhealthy {
        status: u16,
    },
    /// The probe could not be executed (connection error or timeout).
    Failed,
}

impl MetricsProbe {
    pub fn is_healthy(&self) -> bool {
        matches!(self, MetricsProbe::Healthy { .. })
    }
}

/// Probe `http://{address}/metrics` within `timeout`.
pub async fn probe_metrics(address: &str, timeout: Duration) -> MetricsProbe {
    let uri = format!("http://{address}{METRICS_PATH}");

    let result = tokio::time::timeout(timeout, async {
        let stream = match tokio::net::TcpStream::connect(address).await {
            Ok(s) => s,
            Err(e) => {
                debug!(error = %e, %uri, "metrics probe connection failed");
                return MetricsProbe::Failed;
            }
        };

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = match hyper::client::conn::http1::handshake(io).await {
            Ok(pair) => pair,
            Err(e) => {
                debug!(error = %e, %uri, "metrics probe handshake failed");
                return MetricsProbe::Failed;
            }
        };

        // Drive the connection in the background.
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let req = match http::Request::builder()
            .method("GET")
            .uri(&uri)
            .header("host", address)
            .header("user-agent", "exporter-charm/0.1")
            .body(http_body_util::Empty::<bytes::Bytes>::new())
        {
            Ok(req) => req,
            Err(e) => {
                debug!(error = %e, %uri, "metrics probe request invalid");
                return MetricsProbe::Failed;
            }
        };

        let resp = match sender.send_request(req).await {
            Ok(resp) => resp,
            Err(e) => {
                debug!(error = %e, %uri, "metrics probe request failed");
                return MetricsProbe::Failed;
            }
        };

        let status = resp.status();
        if !status.is_success() {
            debug!(%status, %uri, "metrics probe non-2xx");
            return MetricsProbe::Unhealthy {
                status: status.as_u16(),
            };
        }

        match resp.into_body().collect().await {
            Ok(body) => classify_exposition(&String::from_utf8_lossy(&body.to_bytes())),
            Err(e) => {
                debug!(error = %e, %uri, "metrics probe body read failed");
                MetricsProbe::Failed
            }
        }
    })
    .await;

    match result {
        Ok(probe) => probe,
        Err(_) => {
            debug!(%uri, "metrics probe timed out");
            MetricsProbe::Failed
        }
    }
}

/// Count sample lines starting with the libvirt metric prefix.
fn classify_exposition(body: &str) -> MetricsProbe {
    let samples = body
        .lines()
        .filter(|line| line.starts_with(METRIC_PREFIX))
        .count();
    if samples == 0 {
        MetricsProbe::MissingMetrics
    } else {
        MetricsProbe::Healthy { samples }
    }
}
