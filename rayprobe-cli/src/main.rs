///! rayprobe CLI
///!
///! Connects to a running Ray cluster, prints its nodes and whether the
///! connection worked. The exit status does not reflect the probe result.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rayprobe_cli::{config, logging, probe};
use rayprobe_common::Discovery;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Cluster address (auto, host:port, ray://host:port or dashboard URL)
    #[arg(short, long)]
    address: Option<String>,

    /// Output format (text, table, json, yaml)
    #[arg(short, long)]
    output: Option<String>,

    /// Dashboard port used with bootstrap and ray:// addresses
    #[arg(long)]
    dashboard_port: Option<u16>,

    /// Request timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    // Load config
    let (mut config, config_warning) = config::Config::load_or_default();
    if let Some(address) = cli.address {
        config.address = address;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(port) = cli.dashboard_port {
        config.dashboard_port = port;
    }
    if cli.timeout.is_some() {
        config.timeout_secs = cli.timeout;
    }

    // A broken log setup must not stop the probe
    let (logging_ready, _log_guard) = match logging::LoggingConfig::from(&config).init() {
        Ok(guard) => (true, guard),
        Err(e) => {
            eprintln!("warning: logging disabled: {:#}", e);
            (false, None)
        }
    };

    if let Some(warning) = config_warning {
        if logging_ready {
            tracing::warn!("{}", warning);
        } else {
            eprintln!("warning: {}", warning);
        }
    }

    let settings = config.probe_settings(Discovery::from_env());
    let stdout = std::io::stdout();
    probe::run(&settings, stdout.lock()).await?;

    Ok(())
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}
