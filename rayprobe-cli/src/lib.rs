///! rayprobe
///!
///! Checks that a Ray cluster is reachable and prints its node roster.

pub mod api;
pub mod cluster;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod probe;

pub use error::{ProbeError, ProbeResult};
pub use probe::{run, ProbeReport, ProbeSettings};
