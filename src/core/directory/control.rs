// src/core/directory/control.rs

//! Join, member listing and forced eviction, delegated to the gossip layer.

use super::collaborators::GossipMembership;
use super::member::{Node, translate};
use crate::core::errors::ConvoyError;
use crate::core::role::NodeRole;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// The result of a join request: how many addresses were contacted and the
/// aggregated error message, empty when the gossip layer reported none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResult {
    pub num_joined: usize,
    pub error: String,
}

pub struct ClusterControlOps {
    role: NodeRole,
    gossip: Option<Arc<dyn GossipMembership>>,
}

impl ClusterControlOps {
    pub fn new(role: NodeRole, gossip: Option<Arc<dyn GossipMembership>>) -> Self {
        Self { role, gossip }
    }

    fn gossip(&self, operation: &'static str) -> Result<&Arc<dyn GossipMembership>, ConvoyError> {
        self.role.require_server(operation)?;
        self.gossip
            .as_ref()
            .ok_or_else(|| ConvoyError::Internal("server role without a gossip layer".to_string()))
    }

    /// The local member, or the zero node when this agent is not a
    /// server-capable gossip participant.
    pub fn local_node(&self) -> Node {
        match &self.gossip {
            Some(gossip) if self.role.is_server() => translate(&gossip.local_member()),
            _ => Node::default(),
        }
    }

    pub async fn join(&self, addresses: &[String]) -> Result<JoinResult, ConvoyError> {
        let gossip = self.gossip("join")?;
        if addresses.is_empty() {
            return Err(ConvoyError::InvalidRequest(
                "missing address to join".to_string(),
            ));
        }

        let attempt = gossip.join(addresses).await;
        let error = match attempt.error {
            Some(e) => {
                warn!(
                    "Join contacted {}/{} addresses with error: {}",
                    attempt.joined,
                    addresses.len(),
                    e
                );
                e.to_string()
            }
            None => {
                info!("Join contacted {}/{} addresses", attempt.joined, addresses.len());
                String::new()
            }
        };

        Ok(JoinResult {
            num_joined: attempt.joined,
            error,
        })
    }

    /// The current membership, in the order the gossip layer reports it.
    pub async fn members(&self) -> Result<Vec<Node>, ConvoyError> {
        let gossip = self.gossip("members")?;
        Ok(gossip.members().await.iter().map(translate).collect())
    }

    /// Evicts a node that left without a graceful shutdown.
    pub async fn force_leave(&self, node: &str) -> Result<(), ConvoyError> {
        let gossip = self.gossip("force_leave")?;
        if node.is_empty() {
            return Err(ConvoyError::InvalidRequest(
                "missing node to force leave".to_string(),
            ));
        }

        gossip.remove_failed_node(node).await?;
        info!("Force leave of node {} accepted", node);
        Ok(())
    }
}
