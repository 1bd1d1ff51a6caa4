///! Cluster probe
///!
///! connect → enumerate → print → disconnect. Any failure along the way is
///! reported on the output stream, never propagated: the caller only learns
///! whether the probe succeeded.

use crate::cluster::ClusterClient;
use crate::error::{ProbeError, ProbeResult};
use crate::output::{self, OutputFormat};
use chrono::{DateTime, Utc};
use colored::Colorize;
use rayprobe_common::{AddressSpec, Discovery, Endpoint, NodeRecord};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;

pub const BANNER: &str = "Testing Ray";
pub const STATUS_HEADER: &str = "=== Ray Cluster Status ===";
pub const SUCCESS_MESSAGE: &str = "Ray initialization successful!";
pub const FAILURE_PREAMBLE: &str = "Ray initialization failed:";

/// Everything one probe run needs
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub address: AddressSpec,
    pub discovery: Discovery,
    pub timeout: Option<Duration>,
    pub format: OutputFormat,
}

/// Machine-readable result of a probe run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ray_version: Option<String>,
    pub node_count: usize,
    pub nodes: Vec<NodeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub probed_at: DateTime<Utc>,
}

impl Default for ProbeReport {
    fn default() -> Self {
        Self {
            success: false,
            endpoint: None,
            ray_version: None,
            node_count: 0,
            nodes: Vec::new(),
            error: None,
            probed_at: Utc::now(),
        }
    }
}

/// Writes probe progress in the selected format
pub struct Reporter<W: Write> {
    out: W,
    format: OutputFormat,
    report: ProbeReport,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            report: ProbeReport::default(),
        }
    }

    pub fn start(&mut self) -> std::io::Result<()> {
        if self.format.is_streaming() {
            writeln!(self.out, "{}", BANNER)?;
        }
        Ok(())
    }

    pub fn connected(&mut self, cluster: &ClusterClient) -> std::io::Result<()> {
        self.report.endpoint = Some(cluster.endpoint().clone());
        self.report.ray_version = Some(cluster.version().ray_version.clone());

        if self.format.is_streaming() {
            writeln!(self.out)?;
            writeln!(self.out, "{}", STATUS_HEADER)?;
        }
        Ok(())
    }

    pub fn roster(&mut self, nodes: Vec<NodeRecord>) -> std::io::Result<()> {
        self.report.node_count = nodes.len();

        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "Number of nodes: {}", nodes.len())?;
                output::write_node_lines(&mut self.out, &nodes)?;
            }
            OutputFormat::Table => {
                writeln!(self.out, "Number of nodes: {}", nodes.len())?;
                output::write_node_table(&mut self.out, &nodes)?;
            }
            OutputFormat::Json | OutputFormat::Yaml => {}
        }

        self.report.nodes = nodes;
        Ok(())
    }

    /// Write the closing message (or the whole document) and hand back the report
    pub fn finish(mut self, failure: Option<&ProbeError>) -> anyhow::Result<ProbeReport> {
        self.report.success = failure.is_none();
        self.report.error = failure.map(|e| e.to_string());

        match (self.format, failure) {
            (OutputFormat::Text, None) => writeln!(self.out, "{}", SUCCESS_MESSAGE)?,
            (OutputFormat::Text, Some(e)) => writeln!(self.out, "{} {}", FAILURE_PREAMBLE, e)?,
            (OutputFormat::Table, None) => writeln!(self.out, "{}", output::success_line(SUCCESS_MESSAGE))?,
            (OutputFormat::Table, Some(e)) => writeln!(
                self.out,
                "{} {}",
                output::error_line(FAILURE_PREAMBLE),
                e.to_string().red()
            )?,
            (OutputFormat::Json, _) => output::write_json(&mut self.out, &self.report)?,
            (OutputFormat::Yaml, _) => output::write_yaml(&mut self.out, &self.report)?,
        }

        self.out.flush()?;
        Ok(self.report)
    }
}

/// Run one probe, writing the report to `out`.
///
/// Probe failures end up in the report; only a failure to write the closing
/// message itself is returned as an error.
pub async fn run<W: Write>(settings: &ProbeSettings, out: W) -> anyhow::Result<ProbeReport> {
    let mut reporter = Reporter::new(out, settings.format);
    reporter.start()?;

    let outcome = probe(settings, &mut reporter).await;
    match &outcome {
        Ok(()) => tracing::info!("Probe succeeded"),
        Err(e) => tracing::warn!(error = %e, "Probe failed"),
    }

    reporter.finish(outcome.as_ref().err())
}

async fn probe<W: Write>(settings: &ProbeSettings, reporter: &mut Reporter<W>) -> ProbeResult<()> {
    let endpoint = settings.discovery.resolve(&settings.address)?;
    tracing::debug!(address = %settings.address, endpoint = %endpoint, "Resolved cluster address");

    let cluster = ClusterClient::connect(endpoint, settings.timeout).await?;
    let result = report_cluster(&cluster, reporter).await;
    cluster.shutdown();
    result
}

async fn report_cluster<W: Write>(cluster: &ClusterClient, reporter: &mut Reporter<W>) -> ProbeResult<()> {
    reporter.connected(cluster)?;
    let nodes = cluster.list_nodes().await?;
    reporter.roster(nodes)?;
    Ok(())
}
