//! Cluster address resolution
//!
//! Turns the address the user asked for (or `auto`) into the base URL of the
//! cluster's dashboard. `auto` follows the same lookup order Ray clients use:
//! the `RAY_ADDRESS` environment variable first, then the bootstrap address the
//! local head node wrote to `<ray temp dir>/ray_current_cluster`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use url::Url;

pub const RAY_ADDRESS_ENV: &str = "RAY_ADDRESS";
pub const RAY_TMPDIR_ENV: &str = "RAY_TMPDIR";
pub const DEFAULT_DASHBOARD_PORT: u16 = 8265;
pub const CURRENT_CLUSTER_FILE: &str = "ray_current_cluster";

/// Address discovery errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Neither the environment nor the temp dir names a cluster
    #[error(
        "Could not find any running Ray instance (looked in $RAY_ADDRESS and {}). \
         Please specify the one to connect to with --address or $RAY_ADDRESS.",
        .searched.display()
    )]
    NoRunningCluster { searched: PathBuf },

    /// Address could not be turned into a dashboard URL
    #[error("Invalid cluster address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Current-cluster file exists but could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    ClusterFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where to look for the cluster
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AddressSpec {
    #[default]
    Auto,
    Explicit(String),
}

impl FromStr for AddressSpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("auto") {
            Ok(AddressSpec::Auto)
        } else {
            Ok(AddressSpec::Explicit(s.to_string()))
        }
    }
}

impl fmt::Display for AddressSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressSpec::Auto => f.write_str("auto"),
            AddressSpec::Explicit(addr) => f.write_str(addr),
        }
    }
}

/// Base URL of a cluster dashboard, without trailing slash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join an absolute API path onto the endpoint
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inputs for resolving an [`AddressSpec`]
#[derive(Debug, Clone)]
pub struct Discovery {
    pub env_address: Option<String>,
    pub temp_dir: PathBuf,
    pub dashboard_port: u16,
}

impl Default for Discovery {
    fn default() -> Self {
        Self {
            env_address: None,
            temp_dir: PathBuf::from("/tmp/ray"),
            dashboard_port: DEFAULT_DASHBOARD_PORT,
        }
    }
}

impl Discovery {
    /// Read `RAY_ADDRESS` and `RAY_TMPDIR` from the process environment
    pub fn from_env() -> Self {
        let env_address = std::env::var(RAY_ADDRESS_ENV).ok();
        let temp_dir = ray_temp_dir(std::env::var(RAY_TMPDIR_ENV).ok());

        Self {
            env_address,
            temp_dir,
            ..Default::default()
        }
    }

    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    pub fn with_dashboard_port(mut self, port: u16) -> Self {
        self.dashboard_port = port;
        self
    }

    pub fn resolve(&self, spec: &AddressSpec) -> Result<Endpoint, DiscoveryError> {
        match spec {
            AddressSpec::Explicit(addr) => self.normalize(addr),
            AddressSpec::Auto => {
                if let Some(addr) = self.env_address.as_deref().map(str::trim) {
                    if !addr.is_empty() && !addr.eq_ignore_ascii_case("auto") {
                        tracing::debug!(address = addr, "Using address from {}", RAY_ADDRESS_ENV);
                        return self.normalize(addr);
                    }
                }

                let path = self.temp_dir.join(CURRENT_CLUSTER_FILE);
                match read_bootstrap_address(&path)? {
                    Some(addr) => {
                        tracing::debug!(address = %addr, path = %path.display(), "Using address of local cluster");
                        self.normalize(&addr)
                    }
                    None => Err(DiscoveryError::NoRunningCluster { searched: path }),
                }
            }
        }
    }

    fn normalize(&self, address: &str) -> Result<Endpoint, DiscoveryError> {
        let address = address.trim();
        let invalid = |reason: &str| DiscoveryError::InvalidAddress {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        // Schemes are case-insensitive
        let raw = match address.split_once("://") {
            Some((scheme, rest)) => format!("{}://{}", scheme.to_ascii_lowercase(), rest),
            None => address.to_string(),
        };
        let raw = raw.as_str();

        if raw.starts_with("http://") || raw.starts_with("https://") {
            let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
            if url.host_str().map_or(true, str::is_empty) {
                return Err(invalid("missing host"));
            }
            return Ok(Endpoint(raw.trim_end_matches('/').to_string()));
        }

        if raw.contains("://") && !raw.starts_with("ray://") {
            return Err(invalid("unsupported scheme"));
        }

        let bootstrap = raw.strip_prefix("ray://").unwrap_or(raw);
        let bootstrap = bootstrap.split('/').next().unwrap_or_default();
        let host = split_host(bootstrap);
        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        let dashboard = format!("http://{}:{}", host, self.dashboard_port);
        Url::parse(&dashboard).map_err(|e| invalid(&e.to_string()))?;
        Ok(Endpoint(dashboard))
    }
}

/// Ray's temp dir: `$RAY_TMPDIR/ray` when set, else `/tmp/ray`
fn ray_temp_dir(ray_tmpdir: Option<String>) -> PathBuf {
    match ray_tmpdir.filter(|dir| !dir.trim().is_empty()) {
        Some(dir) => PathBuf::from(dir).join("ray"),
        None => PathBuf::from("/tmp/ray"),
    }
}

/// Host part of `host[:port]`, keeping IPv6 brackets
fn split_host(addr: &str) -> &str {
    if addr.starts_with('[') {
        match addr.find(']') {
            Some(end) => &addr[..=end],
            None => addr,
        }
    } else {
        addr.split(':').next().unwrap_or_default()
    }
}

/// First non-empty line of the current-cluster file, if the file exists
fn read_bootstrap_address(path: &Path) -> Result<Option<String>, DiscoveryError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(DiscoveryError::ClusterFile {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    Ok(contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovery(dir: &Path) -> Discovery {
        Discovery::default().with_temp_dir(dir)
    }

    #[test]
    fn test_parse_address_spec() {
        assert_eq!("auto".parse::<AddressSpec>().unwrap(), AddressSpec::Auto);
        assert_eq!("AUTO".parse::<AddressSpec>().unwrap(), AddressSpec::Auto);
        assert_eq!("".parse::<AddressSpec>().unwrap(), AddressSpec::Auto);
        assert_eq!(
            "10.0.0.1:6379".parse::<AddressSpec>().unwrap(),
            AddressSpec::Explicit("10.0.0.1:6379".to_string())
        );
    }

    #[test]
    fn test_bootstrap_address_maps_to_dashboard() {
        let d = Discovery::default();
        let spec = AddressSpec::Explicit("10.0.0.1:6379".to_string());
        assert_eq!(d.resolve(&spec).unwrap().as_str(), "http://10.0.0.1:8265");
    }

    #[test]
    fn test_ray_client_address() {
        let d = Discovery::default().with_dashboard_port(9000);
        let spec = AddressSpec::Explicit("ray://head.example.com:10001".to_string());
        assert_eq!(d.resolve(&spec).unwrap().as_str(), "http://head.example.com:9000");
    }

    #[test]
    fn test_http_address_used_verbatim() {
        let d = Discovery::default();
        let spec = AddressSpec::Explicit("https://ray.example.com:443/".to_string());
        assert_eq!(d.resolve(&spec).unwrap().as_str(), "https://ray.example.com:443");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let d = Discovery::default();
        let spec = AddressSpec::Explicit("HTTP://ray.example.com:8265".to_string());
        assert_eq!(d.resolve(&spec).unwrap().as_str(), "http://ray.example.com:8265");

        let spec = AddressSpec::Explicit("Ray://head:10001".to_string());
        assert_eq!(d.resolve(&spec).unwrap().as_str(), "http://head:8265");
    }

    #[test]
    fn test_ray_temp_dir() {
        assert_eq!(ray_temp_dir(None), PathBuf::from("/tmp/ray"));
        assert_eq!(ray_temp_dir(Some(String::new())), PathBuf::from("/tmp/ray"));
        assert_eq!(
            ray_temp_dir(Some("/scratch/user".to_string())),
            PathBuf::from("/scratch/user/ray")
        );
    }

    #[test]
    fn test_ipv6_bootstrap_address() {
        let d = Discovery::default();
        let spec = AddressSpec::Explicit("[::1]:6379".to_string());
        assert_eq!(d.resolve(&spec).unwrap().as_str(), "http://[::1]:8265");
    }

    #[test]
    fn test_invalid_addresses() {
        let d = Discovery::default();
        for addr in [":6379", "ftp://host:21", "http://", "bad host:6379"] {
            let err = d.resolve(&AddressSpec::Explicit(addr.to_string())).unwrap_err();
            assert!(
                matches!(err, DiscoveryError::InvalidAddress { .. }),
                "{} should be invalid, got {:?}",
                addr,
                err
            );
        }
    }

    #[test]
    fn test_auto_prefers_environment() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CURRENT_CLUSTER_FILE), "10.0.0.2:6379\n").unwrap();

        let d = Discovery {
            env_address: Some("10.0.0.1:6379".to_string()),
            ..discovery(dir.path())
        };
        assert_eq!(d.resolve(&AddressSpec::Auto).unwrap().as_str(), "http://10.0.0.1:8265");
    }

    #[test]
    fn test_auto_env_set_to_auto_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CURRENT_CLUSTER_FILE), "\n10.0.0.2:6379\n").unwrap();

        let d = Discovery {
            env_address: Some("auto".to_string()),
            ..discovery(dir.path())
        };
        assert_eq!(d.resolve(&AddressSpec::Auto).unwrap().as_str(), "http://10.0.0.2:8265");
    }

    #[test]
    fn test_auto_without_cluster() {
        let dir = tempfile::tempdir().unwrap();
        let err = discovery(dir.path()).resolve(&AddressSpec::Auto).unwrap_err();

        assert!(matches!(err, DiscoveryError::NoRunningCluster { .. }));
        assert!(err.to_string().contains("Could not find any running Ray instance"));
    }

    #[test]
    fn test_auto_with_empty_cluster_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CURRENT_CLUSTER_FILE), "  \n").unwrap();

        let err = discovery(dir.path()).resolve(&AddressSpec::Auto).unwrap_err();
        assert!(matches!(err, DiscoveryError::NoRunningCluster { .. }));
    }
}
