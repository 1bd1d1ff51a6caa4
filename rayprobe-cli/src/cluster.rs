///! Connection to a running Ray cluster through its dashboard

use crate::api::ApiClient;
use crate::error::{ProbeError, ProbeResult};
use rayprobe_common::{ClusterVersion, Endpoint, NodeRecord, NodeSummaryData, RestResponse};
use std::time::Duration;

pub const VERSION_PATH: &str = "/api/version";
pub const NODES_PATH: &str = "/nodes?view=summary";

/// An open connection to a cluster control endpoint
pub struct ClusterClient {
    api: ApiClient,
    version: ClusterVersion,
}

impl ClusterClient {
    /// Connect to the dashboard at `endpoint`.
    ///
    /// The dashboard has to answer the version handshake; a listener that is
    /// not a Ray dashboard fails here rather than at the node query.
    pub async fn connect(endpoint: Endpoint, timeout: Option<Duration>) -> ProbeResult<Self> {
        let connection_error = |reason: anyhow::Error| ProbeError::Connection {
            endpoint: endpoint.clone(),
            reason,
        };

        let api = ApiClient::new(endpoint.clone(), timeout).map_err(connection_error)?;
        let version: ClusterVersion = api.get(VERSION_PATH).await.map_err(connection_error)?;

        tracing::info!(
            endpoint = %endpoint,
            ray_version = %version.ray_version,
            "Connected to Ray cluster"
        );

        Ok(Self { api, version })
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.api.endpoint()
    }

    pub fn version(&self) -> &ClusterVersion {
        &self.version
    }

    /// Fetch the node roster, in the order the dashboard returns it
    pub async fn list_nodes(&self) -> ProbeResult<Vec<NodeRecord>> {
        let query_error = |reason: anyhow::Error| ProbeError::Query {
            endpoint: self.endpoint().clone(),
            reason,
        };

        let response: RestResponse<NodeSummaryData> =
            self.api.get(NODES_PATH).await.map_err(query_error)?;

        if !response.result {
            return Err(query_error(anyhow::anyhow!(
                "dashboard reported failure: {}",
                response.msg
            )));
        }

        let nodes: Vec<NodeRecord> = response
            .data
            .unwrap_or_default()
            .summary
            .into_iter()
            .map(NodeRecord::from)
            .collect();

        tracing::debug!(count = nodes.len(), "Fetched node roster");
        Ok(nodes)
    }

    /// Release the connection
    pub fn shutdown(self) {
        tracing::debug!(endpoint = %self.endpoint(), "Disconnecting from Ray cluster");
    }
}
