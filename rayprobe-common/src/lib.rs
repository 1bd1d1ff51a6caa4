//! Common types shared by the rayprobe crates: the node roster model and
//! cluster address resolution.

pub mod address;

pub use address::{AddressSpec, Discovery, DiscoveryError, Endpoint};

use serde::{Deserialize, Serialize};

/// Raylet state string the dashboard reports for a live node
pub const NODE_STATE_ALIVE: &str = "ALIVE";

/// Snapshot of one cluster member at query time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeRecord {
    pub hostname: String,
    pub alive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub is_head_node: bool,
}

impl NodeRecord {
    pub fn new(hostname: impl Into<String>, alive: bool) -> Self {
        Self {
            hostname: hostname.into(),
            alive,
            node_id: None,
            address: None,
            is_head_node: false,
        }
    }
}

/// Raylet section of a node summary item
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RayletInfo {
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub node_manager_address: Option<String>,
    #[serde(default)]
    pub node_manager_hostname: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub is_head_node: bool,
}

/// One item of the dashboard's `/nodes?view=summary` listing.
///
/// Only the fields the probe reads are modelled; everything else the
/// dashboard sends (physical stats, load averages, ...) is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeSummary {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub raylet: RayletInfo,
}

impl From<NodeSummary> for NodeRecord {
    fn from(summary: NodeSummary) -> Self {
        let NodeSummary { hostname, ip, raylet } = summary;

        // Dead nodes have no physical stats, so the raylet hostname wins
        let hostname = raylet
            .node_manager_hostname
            .filter(|h| !h.is_empty())
            .or(hostname)
            .unwrap_or_default();

        Self {
            hostname,
            alive: raylet.state.as_deref() == Some(NODE_STATE_ALIVE),
            node_id: raylet.node_id,
            address: raylet.node_manager_address.or(ip),
            is_head_node: raylet.is_head_node,
        }
    }
}

/// Body of `/nodes?view=summary`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeSummaryData {
    #[serde(default)]
    pub summary: Vec<NodeSummary>,
}

/// Envelope every dashboard REST handler wraps its payload in
#[derive(Debug, Clone, Deserialize)]
pub struct RestResponse<T> {
    pub result: bool,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

/// Version document served at `/api/version`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterVersion {
    #[serde(default)]
    pub version: String,
    pub ray_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ray_commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
}
