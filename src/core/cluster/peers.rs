// src/core/cluster/peers.rs

//! A consensus peer source backed by the configured peer list.

use crate::config::Config;
use crate::core::directory::ConsensusPeerSource;
use crate::core::errors::CollaboratorError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Reports this node's advertised RPC address followed by the configured
/// `server.peers`.
pub struct StaticPeerSource {
    peers: RwLock<Vec<String>>,
}

impl StaticPeerSource {
    pub fn new(config: &Config) -> Self {
        let mut peers = vec![config.advertise_rpc_addr()];
        peers.extend(config.server.peers.iter().cloned());
        Self::from_peers(peers)
    }

    pub fn from_peers(peers: Vec<String>) -> Self {
        Self {
            peers: RwLock::new(peers),
        }
    }

    /// Replaces the peer list, for embedders that track peers outside the
    /// agent config.
    pub fn set_peers(&self, peers: Vec<String>) {
        *self.peers.write() = peers;
    }
}

#[async_trait]
impl ConsensusPeerSource for StaticPeerSource {
    async fn peers(&self) -> Result<Vec<String>, CollaboratorError> {
        Ok(self.peers.read().clone())
    }

    fn stats(&self) -> BTreeMap<String, String> {
        let mut stats = BTreeMap::new();
        stats.insert("num_peers".to_string(), self.peers.read().len().to_string());
        stats
    }
}
