// src/server/initialization.rs

//! Builds the directory and its collaborators from the configuration and
//! binds the API listener.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::Directory;
use crate::core::cluster::{LocalMembership, RpcProxy, StaticPeerSource};
use crate::core::state::StatsState;
use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Initializes all agent components before starting the API loop.
pub async fn setup(config: Config) -> Result<ServerContext> {
    log_startup_info(&config);
    let (shutdown_tx, _) = broadcast::channel(1);

    let directory = Arc::new(build_directory(Arc::new(config)));
    info!("Directory initialized with role {}.", directory.role());

    seed_fallback_servers(&directory);

    let config = directory.config();
    let listener = TcpListener::bind((config.bind_addr.as_str(), config.http_port)).await?;
    info!(
        "Convoy agent API listening on {}:{}",
        config.bind_addr, config.http_port
    );

    Ok(ServerContext {
        directory,
        listener,
        shutdown_tx,
    })
}

/// Wires the standalone collaborators for the roles enabled in `config`.
pub fn build_directory(config: Arc<Config>) -> Directory {
    let mut builder = Directory::builder(config.clone()).stats(Arc::new(StatsState::new()));

    if config.server.enabled {
        builder = builder.server(
            Arc::new(StaticPeerSource::new(&config)),
            Arc::new(LocalMembership::new(&config)),
        );
    }
    if config.client.enabled {
        builder = builder.client(Arc::new(RpcProxy::new()));
    }

    builder.build()
}

/// Registers the configured `client.servers` through the best-effort batch path.
fn seed_fallback_servers(directory: &Directory) {
    let servers = &directory.config().client.servers;
    if !directory.role().is_client() || servers.is_empty() {
        return;
    }

    match directory.register_servers(servers) {
        Ok(outcomes) => {
            let rejected = outcomes.iter().filter(|o| !o.accepted).count();
            if rejected > 0 {
                warn!(
                    "{} of {} configured client servers were rejected",
                    rejected,
                    outcomes.len()
                );
            } else {
                info!("Seeded {} fallback servers from configuration", outcomes.len());
            }
        }
        Err(e) => warn!("Failed to seed fallback servers: {}", e),
    }
}

fn log_startup_info(config: &Config) {
    info!(
        "Starting Convoy agent {} (node {}, datacenter {}, region {})",
        env!("CARGO_PKG_VERSION"),
        config.node_name,
        config.datacenter,
        config.region
    );
    if !config.server.enabled && !config.client.enabled {
        warn!("Neither server nor client mode is enabled; only the self descriptor is useful.");
    }
}
