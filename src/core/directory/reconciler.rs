// src/core/directory/reconciler.rs

//! Merges the consensus peer list and the client fallback cache into the
//! server list handed out to callers.

use super::collaborators::ConsensusPeerSource;
use super::fallback::FallbackRegistry;
use crate::core::errors::ConvoyError;
use crate::core::metrics::SERVER_LIST_SIZE;
use crate::core::role::NodeRole;
use indexmap::IndexSet;
use std::sync::Arc;
use tracing::debug;

// Sized for a typical 3-5 server deployment plus a few fallbacks.
const INITIAL_SERVER_LIST_SIZE: usize = 8;

pub struct ServerSetReconciler {
    role: NodeRole,
    consensus: Option<Arc<dyn ConsensusPeerSource>>,
    registry: Arc<FallbackRegistry>,
}

impl ServerSetReconciler {
    pub fn new(
        role: NodeRole,
        consensus: Option<Arc<dyn ConsensusPeerSource>>,
        registry: Arc<FallbackRegistry>,
    ) -> Self {
        Self {
            role,
            consensus,
            registry,
        }
    }

    /// Returns consensus peers first, then fallback addresses, each address
    /// listed once at its first position.
    ///
    /// A node that is neither server nor client gets an empty list. A failure
    /// to fetch the consensus peers fails the whole call.
    pub async fn list(&self) -> Result<Vec<String>, ConvoyError> {
        let mut servers = IndexSet::with_capacity(INITIAL_SERVER_LIST_SIZE);

        if self.role.is_server()
            && let Some(consensus) = &self.consensus
        {
            let peers = consensus.peers().await?;
            servers.extend(peers);
        }

        if self.role.is_client() {
            servers.extend(self.registry.snapshot());
        }

        debug!(
            "Reconciled {} server addresses for role {}",
            servers.len(),
            self.role
        );
        SERVER_LIST_SIZE.set(servers.len() as f64);
        Ok(servers.into_iter().collect())
    }
}
