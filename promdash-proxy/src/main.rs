mod alertmanager;
mod args;
mod config;
mod error;
mod logging;
mod prometheus;
mod proxy;
mod state;
mod upstream;

#[cfg(test)]
mod testutil;

use args::Args;
use clap::Parser;
use config::{Config, DEFAULT_LISTEN};
use state::AppState;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = Config::load(&args)?;

    let (level_name, level) = cfg.log_level();
    logging::init(level.unwrap_or_default());
    if level.is_none() {
        warn!(requested = level_name, "Unrecognized log level, falling back to info");
    }

    let state = Arc::new(AppState::from_config(&cfg)?);
    let app = proxy::router(state);

    let listen = cfg.listen.as_deref().unwrap_or(DEFAULT_LISTEN);
    let addr: SocketAddr = listen.parse()?;
    info!(%addr, "Starting promdash-proxy");

    let server = axum::Server::try_bind(&addr)?
        .serve(app.into_make_service_with_connect_info::<SocketAddr>());

    let graceful = server.with_graceful_shutdown(shutdown_signal());
    graceful.await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}
