///! Output formatting for CLI
///!
///! `text` reproduces the classic line-oriented report; `table` is the same
///! report with a node table; `json` and `yaml` emit a single document.

use colored::Colorize;
use rayprobe_common::NodeRecord;
use serde::Serialize;
use std::io::{self, Write};
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "table" => OutputFormat::Table,
            "json" => OutputFormat::Json,
            "yaml" | "yml" => OutputFormat::Yaml,
            _ => OutputFormat::Text,
        }
    }

    /// Human-readable formats print progress as the probe runs
    pub fn is_streaming(self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::Table)
    }
}

/// Liveness the way the classic report spells it
pub fn liveness_label(alive: bool) -> &'static str {
    if alive {
        "True"
    } else {
        "False"
    }
}

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "HOSTNAME")]
    hostname: String,
    #[tabled(rename = "ADDRESS")]
    address: String,
    #[tabled(rename = "HEAD")]
    head: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

impl From<&NodeRecord> for NodeRow {
    fn from(node: &NodeRecord) -> Self {
        Self {
            hostname: node.hostname.clone(),
            address: node.address.clone().unwrap_or_else(|| "-".to_string()),
            head: if node.is_head_node { "yes" } else { "" }.to_string(),
            status: if node.alive { "Alive" } else { "Dead" }.to_string(),
        }
    }
}

/// Write one line per node, in roster order
pub fn write_node_lines<W: Write>(out: &mut W, nodes: &[NodeRecord]) -> io::Result<()> {
    for node in nodes {
        writeln!(out, "Node: {}, Status: {}", node.hostname, liveness_label(node.alive))?;
    }
    Ok(())
}

/// Write the roster as a table using the tabled crate
pub fn write_node_table<W: Write>(out: &mut W, nodes: &[NodeRecord]) -> io::Result<()> {
    if nodes.is_empty() {
        return writeln!(out, "{}", "No nodes found".yellow());
    }

    let table = Table::new(nodes.iter().map(NodeRow::from));
    writeln!(out, "{}", table)
}

/// Write data as pretty-printed JSON
pub fn write_json<W: Write, T: Serialize>(out: &mut W, data: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, data)?;
    writeln!(out)?;
    Ok(())
}

/// Write data as YAML
pub fn write_yaml<W: Write, T: Serialize>(out: &mut W, data: &T) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    write!(out, "{}", yaml)?;
    Ok(())
}

/// Success message with green checkmark
pub fn success_line(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message.green())
}

/// Error message with red X
pub fn error_line(message: &str) -> String {
    format!("{} {}", "✗".red().bold(), message.red())
}
