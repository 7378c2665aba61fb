// src/server/mod.rs

use crate::config::Config;
use anyhow::Result;
use tracing::info;

pub mod api;
mod context;
mod initialization;
mod metrics_server;

pub use context::ServerContext;
pub use initialization::build_directory;

/// The main agent startup function, orchestrating all setup phases.
pub async fn run(config: Config) -> Result<()> {
    // 1. Build the directory, its collaborators and the API listener.
    let ctx = initialization::setup(config).await?;

    // 2. Start the metrics exporter if enabled.
    let metrics = ctx.directory.config().metrics.clone();
    if metrics.enabled {
        let shutdown_rx = ctx.shutdown_tx.subscribe();
        tokio::spawn(metrics_server::run_metrics_server(metrics.port, shutdown_rx));
    }

    // 3. Serve the API until Ctrl-C.
    let app = api::router(ctx.directory.clone());
    let shutdown_tx = ctx.shutdown_tx.clone();
    axum::serve(ctx.listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received, stopping agent.");
            shutdown_tx.send(()).ok();
        })
        .await?;

    Ok(())
}
