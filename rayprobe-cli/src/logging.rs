///! Logging configuration module
///!
///! Diagnostics go to stderr (and optionally a log file) so stdout only ever
///! carries the probe report.

use anyhow::Result;
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::non_blocking;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_FILE_NAME: &str = "rayprobe.log";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
            log_dir: None,
        }
    }
}

impl From<&crate::config::Config> for LoggingConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            level: config.log_level.clone(),
            json_format: config.log_json,
            log_dir: config.log_dir.clone(),
        }
    }
}

impl LoggingConfig {
    /// Filter from `RUST_LOG`, falling back to the configured level
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    /// Install the global subscriber.
    ///
    /// The returned guard flushes the file writer on drop and has to be held
    /// until the process is done logging.
    pub fn init(&self) -> Result<Option<WorkerGuard>> {
        let console_layer = if self.json_format {
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(io::stderr)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(io::stderr)
                .boxed()
        };

        let (file_layer, guard) = match &self.log_dir {
            Some(dir) => {
                let appender = RollingFileAppender::builder()
                    .rotation(Rotation::NEVER)
                    .filename_prefix(LOG_FILE_NAME)
                    .build(dir)?;
                let (writer, guard) = non_blocking(appender);
                let layer = fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .json()
                    .with_writer(writer);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .with(self.env_filter())
            .try_init()?;

        tracing::debug!("Logging initialized - level: {}", self.level);

        Ok(guard)
    }
}
