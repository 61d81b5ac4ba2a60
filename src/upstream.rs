//! Client for the Storm UI REST API.

use crate::{
    UpstreamError,
    model::{ClusterSummary, NimbusSummary, SupervisorSummary, TopologyDetail, TopologySummary},
};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

pub const CLUSTER_SUMMARY: &str = "/api/v1/cluster/summary";
pub const NIMBUS_SUMMARY: &str = "/api/v1/nimbus/summary";
pub const SUPERVISOR_SUMMARY: &str = "/api/v1/supervisor/summary";
pub const TOPOLOGY_SUMMARY: &str = "/api/v1/topology/summary";

/// Read-only Storm UI client. One GET per call, no retries.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct StormClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl StormClient {
    /// Client for the Storm UI at `host` (`address[:port]`, no scheme). Every
    /// request fails with [`UpstreamError::Timeout`] after `timeout`.
    pub fn new(host: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: format!("http://{}", host.trim_end_matches('/')),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and decode the JSON body.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, UpstreamError> {
        let started = Instant::now();
        let url = format!("{}{}", self.base_url, path);

        let transport = |source: reqwest::Error| {
            if source.is_timeout() {
                UpstreamError::Timeout {
                    path: path.to_owned(),
                    timeout: self.timeout,
                }
            } else {
                UpstreamError::Transport {
                    path: path.to_owned(),
                    source,
                }
            }
        };

        let resp = self.http.get(&url).send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                path: path.to_owned(),
                status,
            });
        }

        let body = resp.bytes().await.map_err(transport)?;
        let doc = serde_json::from_slice(&body).map_err(|source| UpstreamError::Decode {
            path: path.to_owned(),
            source,
        })?;

        debug!(
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched"
        );
        Ok(doc)
    }

    pub async fn cluster_summary(&self) -> Result<ClusterSummary, UpstreamError> {
        self.fetch(CLUSTER_SUMMARY).await
    }

    pub async fn nimbus_summary(&self) -> Result<NimbusSummary, UpstreamError> {
        self.fetch(NIMBUS_SUMMARY).await
    }

    pub async fn supervisor_summary(&self) -> Result<SupervisorSummary, UpstreamError> {
        self.fetch(SUPERVISOR_SUMMARY).await
    }

    pub async fn topology_summary(&self) -> Result<TopologySummary, UpstreamError> {
        self.fetch(TOPOLOGY_SUMMARY).await
    }

    pub async fn topology_detail(&self, id: &str) -> Result<TopologyDetail, UpstreamError> {
        self.fetch(&format!("/api/v1/topology/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_becomes_plain_http_base() {
        let client = StormClient::new("storm-ui:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://storm-ui:8080");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = StormClient::new(&addr.to_string(), Duration::from_secs(2)).unwrap();
        let err = client.cluster_summary().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport { .. }), "{err:?}");
        assert_eq!(err.path(), CLUSTER_SUMMARY);
    }
}
