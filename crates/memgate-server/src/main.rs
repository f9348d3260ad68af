//! `memgate` binary: HTTP access layer over a Mem0 memory engine.

use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use memgate_config::{Credentials, MemgateConfig};
use memgate_engine::{HttpMemoryEngine, MemoryEngine};
use memgate_server::{AppState, build_router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line options for the server.
#[derive(Debug, Parser)]
#[command(name = "memgate", version)]
struct Cli {
    /// Path to a JSON5 config file; defaults to `memgate.json5` in the cwd.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen address, overriding `server.bind`.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let mut config = if let Some(path) = cli.config.as_ref() {
        MemgateConfig::load_from_path(path).context("failed to load config")?
    } else {
        debug!("discovering config in cwd: {}", cwd.display());
        MemgateConfig::load_discovered(&cwd).context("failed to load config")?
    };
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.server.bind))?;

    let credentials = Credentials::resolve(&config.engine.api_key_env, &cwd)
        .context("failed to resolve engine credential")?;
    let engine: Arc<dyn MemoryEngine> = Arc::new(
        HttpMemoryEngine::new(&config.engine, &credentials)
            .context("failed to build engine client")?,
    );

    let router = build_router(AppState::new(engine), &config.server);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        "listening (addr={}, allow_reset={}, request_timeout_secs={})",
        addr, config.server.allow_reset, config.server.request_timeout_secs
    );
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for ctrl-c: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                log::warn!("failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
