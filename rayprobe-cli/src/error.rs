//! Probe error types
//!
//! Every failure the probe can hit ends up as one of these. They are all
//! reported the same way (the failure preamble followed by the `Display`
//! text); the variants only exist so logs and callers can tell them apart.

use rayprobe_common::{DiscoveryError, Endpoint};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// No usable cluster address
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Dashboard unreachable or not answering like a Ray dashboard
    #[error("Could not connect to Ray dashboard at {endpoint}: {reason:#}")]
    Connection {
        endpoint: Endpoint,
        reason: anyhow::Error,
    },

    /// Connected, but the node roster could not be fetched or decoded
    #[error("Failed to list nodes from {endpoint}: {reason:#}")]
    Query {
        endpoint: Endpoint,
        reason: anyhow::Error,
    },

    /// Writing the report to the output stream failed
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;
