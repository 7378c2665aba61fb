// src/core/cluster/gossip.rs

//! An in-process membership table used when the agent runs without an
//! external gossip engine. It does no failure detection of its own: joins
//! are a TCP reachability probe, and members only change state when told to.

use crate::config::Config;
use crate::core::directory::{GossipMember, GossipMembership, GossipStatus, JoinAttempt};
use crate::core::errors::CollaboratorError;
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpStream, lookup_host};
use tracing::{debug, info, warn};

// Timeout for a single join probe.
const JOIN_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

pub const PROTOCOL_VERSION_MIN: u8 = 1;
pub const PROTOCOL_VERSION_MAX: u8 = 5;
pub const PROTOCOL_VERSION_CUR: u8 = 2;
pub const DELEGATE_VERSION_MIN: u8 = 2;
pub const DELEGATE_VERSION_MAX: u8 = 5;
pub const DELEGATE_VERSION_CUR: u8 = 4;

/// A membership table keyed by member name, in join order.
pub struct LocalMembership {
    local_name: String,
    members: RwLock<IndexMap<String, GossipMember>>,
}

impl LocalMembership {
    /// Creates the table with the local member built from the agent config.
    pub fn new(config: &Config) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert("role".to_string(), "server".to_string());
        tags.insert("dc".to_string(), config.datacenter.clone());
        tags.insert("region".to_string(), config.region.clone());
        tags.insert("port".to_string(), config.server.rpc_port.to_string());

        let local = GossipMember {
            name: format!("{}.{}", config.node_name, config.region),
            addr: config.bind_addr.parse::<IpAddr>().ok(),
            port: config.server.serf_port,
            tags,
            status: GossipStatus::Alive,
            ..versioned_member()
        };
        Self::with_local_member(local)
    }

    pub fn with_local_member(local: GossipMember) -> Self {
        let mut members = IndexMap::new();
        let local_name = local.name.clone();
        members.insert(local_name.clone(), local);
        Self {
            local_name,
            members: RwLock::new(members),
        }
    }

    /// Inserts or replaces a member record.
    pub fn upsert(&self, member: GossipMember) {
        self.members.write().insert(member.name.clone(), member);
    }

    /// Marks an alive member as failed. The table has no failure detector of
    /// its own, so code embedding it calls this.
    pub fn mark_failed(&self, name: &str) -> bool {
        match self.members.write().get_mut(name) {
            Some(member) if member.status == GossipStatus::Alive => {
                warn!("Member {} marked as failed", name);
                member.status = GossipStatus::Failed;
                true
            }
            _ => false,
        }
    }

    async fn probe(address: &str) -> Result<SocketAddr, String> {
        let target = lookup_host(address)
            .await
            .map_err(|e| format!("{address}: {e}"))?
            .next()
            .ok_or_else(|| format!("{address}: no addresses resolved"))?;

        match tokio::time::timeout(JOIN_CONNECT_TIMEOUT, TcpStream::connect(target)).await {
            Ok(Ok(_)) => Ok(target),
            Ok(Err(e)) => Err(format!("{address}: {e}")),
            Err(_) => Err(format!("{address}: connect timeout")),
        }
    }
}

fn versioned_member() -> GossipMember {
    GossipMember {
        protocol_min: PROTOCOL_VERSION_MIN,
        protocol_max: PROTOCOL_VERSION_MAX,
        protocol_cur: PROTOCOL_VERSION_CUR,
        delegate_min: DELEGATE_VERSION_MIN,
        delegate_max: DELEGATE_VERSION_MAX,
        delegate_cur: DELEGATE_VERSION_CUR,
        ..GossipMember::default()
    }
}

#[async_trait]
impl GossipMembership for LocalMembership {
    fn local_member(&self) -> GossipMember {
        self.members
            .read()
            .get(&self.local_name)
            .cloned()
            .unwrap_or_default()
    }

    async fn members(&self) -> Vec<GossipMember> {
        self.members.read().values().cloned().collect()
    }

    async fn join(&self, addresses: &[String]) -> JoinAttempt {
        let mut joined = 0;
        let mut failures = Vec::new();

        for address in addresses {
            match Self::probe(address).await {
                Ok(target) => {
                    debug!("Join probe reached {} ({})", address, target);
                    let member = GossipMember {
                        name: address.clone(),
                        addr: Some(target.ip()),
                        port: target.port(),
                        status: GossipStatus::Alive,
                        ..versioned_member()
                    };
                    self.upsert(member);
                    joined += 1;
                }
                Err(e) => failures.push(e),
            }
        }

        let error = if failures.is_empty() {
            None
        } else {
            Some(CollaboratorError::recoverable(format!(
                "{} error(s) occurred: {}",
                failures.len(),
                failures.join("; ")
            )))
        };
        JoinAttempt { joined, error }
    }

    async fn remove_failed_node(&self, name: &str) -> Result<(), CollaboratorError> {
        let mut members = self.members.write();
        match members.get_mut(name) {
            Some(member)
                if matches!(member.status, GossipStatus::Failed | GossipStatus::Leaving) =>
            {
                info!("Member {} transitioned to left", name);
                member.status = GossipStatus::Left;
            }
            Some(member) => {
                debug!(
                    "Force leave of member {} ignored, status is {:?}",
                    name, member.status
                );
            }
            None => debug!("Force leave of unknown member {} ignored", name),
        }
        Ok(())
    }

    fn stats(&self) -> BTreeMap<String, String> {
        let members = self.members.read();
        let count = |status: GossipStatus| {
            members
                .values()
                .filter(|m| m.status == status)
                .count()
                .to_string()
        };

        let mut stats = BTreeMap::new();
        stats.insert("members".to_string(), members.len().to_string());
        stats.insert("alive".to_string(), count(GossipStatus::Alive));
        stats.insert("failed".to_string(), count(GossipStatus::Failed));
        stats.insert("left".to_string(), count(GossipStatus::Left));
        stats
    }
}
