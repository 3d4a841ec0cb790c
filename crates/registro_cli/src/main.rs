//! `registrod` process entry point.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment.
//! - Initialize logging before anything else runs.
//! - Build the single in-memory store and serve HTTP until Ctrl-C.

use anyhow::{anyhow, Context};
use clap::Parser;
use log::{info, warn};
use registro_api::{serve, AppState, ServerConfig, REGISTROS_PATH};
use registro_core::{default_log_level, init_logging};
use std::net::SocketAddr;

#[derive(Debug, Parser)]
#[command(name = "registrod", version, about = "In-memory registro CRUD service")]
struct Cli {
    /// Socket address to bind, e.g. 127.0.0.1:3000
    #[arg(long, env = "REGISTRO_LISTEN", default_value = "0.0.0.0:3000")]
    listen: SocketAddr,
    /// One of trace|debug|info|warn|error. Defaults to debug in debug builds.
    #[arg(long, env = "REGISTRO_LOG_LEVEL")]
    log_level: Option<String>,
    /// Absolute directory for rolling log files. Logs go to stderr when unset.
    #[arg(long, env = "REGISTRO_LOG_DIR")]
    log_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, cli.log_dir.as_deref())
        .map_err(|err| anyhow!("logging init failed: {err}"))?;

    let config = ServerConfig { listen: cli.listen };
    info!(
        "event=core_init module=cli status=ok version={} listen={}",
        registro_core::core_version(),
        config.listen
    );
    info!(
        "event=collection_ready module=cli status=ok url=http://{}{}",
        config.listen, REGISTROS_PATH
    );

    serve(&config, AppState::in_memory(), shutdown_signal())
        .await
        .with_context(|| format!("server failed on {}", config.listen))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=shutdown_signal module=cli status=error error={err}");
        // Without a signal handler the server runs until killed.
        std::future::pending::<()>().await;
    }
    info!("event=shutdown_signal module=cli status=ok");
}
