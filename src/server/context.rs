// src/server/context.rs

use crate::core::Directory;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Holds all the initialized state required to run the agent's API loop.
pub struct ServerContext {
    pub directory: Arc<Directory>,
    pub listener: TcpListener,
    pub shutdown_tx: broadcast::Sender<()>,
}
