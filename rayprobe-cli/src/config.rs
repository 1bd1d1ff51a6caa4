///! CLI configuration management

use crate::output::OutputFormat;
use crate::probe::ProbeSettings;
use anyhow::Result;
use rayprobe_common::address::DEFAULT_DASHBOARD_PORT;
use rayprobe_common::{AddressSpec, Discovery};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub address: String,
    pub output: String,
    pub dashboard_port: u16,
    pub temp_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: "auto".to_string(),
            output: "text".to_string(),
            dashboard_port: DEFAULT_DASHBOARD_PORT,
            temp_dir: None,
            timeout_secs: None,
            log_level: "warn".to_string(),
            log_json: false,
            log_dir: None,
        }
    }
}

impl Config {
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Load the config file, falling back to defaults when it is unusable.
    ///
    /// The second value explains why the file was ignored.
    pub fn load_or_default() -> (Self, Option<String>) {
        match Self::config_path() {
            Ok(path) => Self::load_from_or_default(&path),
            Err(e) => (Self::default(), Some(format!("cannot locate config file: {:#}", e))),
        }
    }

    pub fn load_from_or_default(config_path: &Path) -> (Self, Option<String>) {
        match Self::load_from(config_path) {
            Ok(config) => (config, None),
            Err(e) => (
                Self::default(),
                Some(format!("ignoring {}: {:#}", config_path.display(), e)),
            ),
        }
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")?;
        Ok(PathBuf::from(home).join(".config/rayprobe/cli.toml"))
    }

    /// Settings for one probe run; `discovery` carries the process environment
    pub fn probe_settings(&self, discovery: Discovery) -> ProbeSettings {
        let mut discovery = discovery.with_dashboard_port(self.dashboard_port);
        if let Some(temp_dir) = &self.temp_dir {
            discovery = discovery.with_temp_dir(temp_dir.clone());
        }

        let address = self.address.parse().unwrap_or(AddressSpec::Auto);

        ProbeSettings {
            address,
            discovery,
            timeout: self.timeout_secs.map(Duration::from_secs),
            format: OutputFormat::from_str(&self.output),
        }
    }
}
