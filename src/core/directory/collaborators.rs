// src/core/directory/collaborators.rs

//! The contracts the directory consumes from the consensus engine, the gossip
//! membership layer and the client's RPC proxy.

use super::member::GossipMember;
use crate::core::errors::CollaboratorError;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// The outcome of a gossip join attempt. The count and the error are
/// independent: some addresses may be reached while others fail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinAttempt {
    pub joined: usize,
    pub error: Option<CollaboratorError>,
}

/// Source of the authoritative server set (the consensus peer list).
#[async_trait]
pub trait ConsensusPeerSource: Send + Sync {
    async fn peers(&self) -> Result<Vec<String>, CollaboratorError>;

    /// Optional statistics reported in the agent's self descriptor.
    fn stats(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// The gossip membership layer.
#[async_trait]
pub trait GossipMembership: Send + Sync {
    fn local_member(&self) -> GossipMember;

    async fn members(&self) -> Vec<GossipMember>;

    async fn join(&self, addresses: &[String]) -> JoinAttempt;

    /// Administratively transitions a failed node to the left state.
    async fn remove_failed_node(&self, name: &str) -> Result<(), CollaboratorError>;

    fn stats(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// The client's RPC proxy, which decides whether a candidate server address
/// is usable.
pub trait ClientProxyRegistrar: Send + Sync {
    /// Returns whether the address was accepted.
    fn add_server(&self, address: &str) -> bool;
}
