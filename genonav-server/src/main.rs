//! genonav server - navigation daemon

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use genonav_server::config::{ConfigLoader, DEFAULT_CONFIG_TOML};
use genonav_server::{tcp, SharedState};
use genonav_utils::{init_logging_with_config, LogConfig, Result};

/// AI-driven navigation daemon for genome browsers
#[derive(Parser, Debug)]
#[command(name = "genonav-server")]
#[command(version)]
struct Cli {
    /// Configuration file (default: $XDG_CONFIG_HOME/genonav/config.toml)
    #[arg(short, long, env = "GENONAV_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding `[server] listen_addr`
    #[arg(short, long, env = "GENONAV_LISTEN")]
    listen: Option<String>,

    /// Log filter directive (e.g. "debug" or "genonav_server=trace")
    #[arg(long, env = "GENONAV_LOG")]
    log: Option<String>,

    /// Log to a file under the state directory instead of stderr
    #[arg(long)]
    log_file: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", DEFAULT_CONFIG_TOML.trim_start());
        return Ok(());
    }

    let log_config = if cli.log_file {
        LogConfig::detached()
    } else {
        LogConfig::server()
    };
    let log_config = match &cli.log {
        Some(filter) => log_config.with_filter(filter.clone()),
        None => log_config,
    };
    init_logging_with_config(log_config)?;

    let mut config = ConfigLoader::load_and_validate(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen;
    }

    info!("genonav server starting");

    let listener = tcp::bind(&config.server.listen_addr).await?;
    let shared_state = SharedState::new(config);

    let signal_state = shared_state.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received, shutting down"),
            Err(e) => error!("Failed to listen for interrupt: {}", e),
        }
        signal_state.shutdown();
    });

    tcp::run_tcp_accept_loop(listener, shared_state).await;

    info!("genonav server stopped");
    Ok(())
}
