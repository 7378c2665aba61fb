// src/core/directory/mod.rs

//! The cluster directory: the de-duplicated view of reachable servers, the
//! client fallback cache, and the join / members / force-leave controls.
//!
//! A `Directory` is the explicit context value the request layer calls into.
//! It is built once from the collaborators the agent runs with, and the
//! node's role is derived from which collaborators were supplied.

pub mod collaborators;
pub mod control;
pub mod fallback;
pub mod member;
pub mod reconciler;

pub use collaborators::{ClientProxyRegistrar, ConsensusPeerSource, GossipMembership, JoinAttempt};
pub use control::{ClusterControlOps, JoinResult};
pub use fallback::{FallbackRegistry, RegistrationOutcome};
pub use member::{GossipMember, GossipStatus, MemberStatus, Node, translate};
pub use reconciler::ServerSetReconciler;

use crate::config::Config;
use crate::core::errors::ConvoyError;
use crate::core::role::NodeRole;
use crate::core::state::StatsState;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Statistics grouped by section, then by key.
pub type StatsMap = BTreeMap<String, BTreeMap<String, String>>;

/// The agent's description of itself.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSelf {
    pub config: Config,
    pub member: Node,
    pub stats: StatsMap,
}

/// The collaborators a server-role agent runs with.
#[derive(Clone)]
pub struct ServerCollaborators {
    pub consensus: Arc<dyn ConsensusPeerSource>,
    pub gossip: Arc<dyn GossipMembership>,
}

/// Builds a `Directory`; the role follows from the collaborators given.
pub struct DirectoryBuilder {
    config: Arc<Config>,
    server: Option<ServerCollaborators>,
    registrar: Option<Arc<dyn ClientProxyRegistrar>>,
    stats: Option<Arc<StatsState>>,
}

impl DirectoryBuilder {
    pub fn server(
        mut self,
        consensus: Arc<dyn ConsensusPeerSource>,
        gossip: Arc<dyn GossipMembership>,
    ) -> Self {
        self.server = Some(ServerCollaborators { consensus, gossip });
        self
    }

    pub fn client(mut self, registrar: Arc<dyn ClientProxyRegistrar>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    pub fn stats(mut self, stats: Arc<StatsState>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn build(self) -> Directory {
        let role = NodeRole::from_flags(self.server.is_some(), self.registrar.is_some());
        let (consensus, gossip) = match self.server {
            Some(s) => (Some(s.consensus), Some(s.gossip)),
            None => (None, None),
        };

        let registry = Arc::new(FallbackRegistry::new(role, self.registrar));
        Directory {
            role,
            config: self.config,
            control: ClusterControlOps::new(role, gossip.clone()),
            reconciler: ServerSetReconciler::new(role, consensus.clone(), registry.clone()),
            registry,
            consensus,
            gossip,
            stats: self.stats.unwrap_or_default(),
        }
    }
}

/// The entry point for every directory request.
pub struct Directory {
    role: NodeRole,
    config: Arc<Config>,
    control: ClusterControlOps,
    reconciler: ServerSetReconciler,
    registry: Arc<FallbackRegistry>,
    consensus: Option<Arc<dyn ConsensusPeerSource>>,
    gossip: Option<Arc<dyn GossipMembership>>,
    stats: Arc<StatsState>,
}

impl Directory {
    pub fn builder(config: Arc<Config>) -> DirectoryBuilder {
        DirectoryBuilder {
            config,
            server: None,
            registrar: None,
            stats: None,
        }
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn stats(&self) -> &Arc<StatsState> {
        &self.stats
    }

    pub fn registry(&self) -> &Arc<FallbackRegistry> {
        &self.registry
    }

    /// Describes the local agent. Never fails: a node that is not a server
    /// reports the zero member.
    pub fn self_descriptor(&self) -> AgentSelf {
        AgentSelf {
            config: self.config.as_ref().clone(),
            member: self.control.local_node(),
            stats: self.collect_stats(),
        }
    }

    pub async fn join(&self, addresses: &[String]) -> Result<JoinResult, ConvoyError> {
        self.control.join(addresses).await
    }

    pub async fn members(&self) -> Result<Vec<Node>, ConvoyError> {
        self.control.members().await
    }

    pub async fn force_leave(&self, node: &str) -> Result<(), ConvoyError> {
        self.control.force_leave(node).await
    }

    pub async fn list_servers(&self) -> Result<Vec<String>, ConvoyError> {
        self.reconciler.list().await
    }

    pub fn register_server(&self, address: &str) -> Result<bool, ConvoyError> {
        self.registry.register(address)
    }

    pub fn register_servers(
        &self,
        addresses: &[String],
    ) -> Result<Vec<RegistrationOutcome>, ConvoyError> {
        self.registry.register_all(addresses)
    }

    fn collect_stats(&self) -> StatsMap {
        let mut stats = StatsMap::new();

        let mut agent = BTreeMap::new();
        agent.insert("node_name".to_string(), self.config.node_name.clone());
        agent.insert("role".to_string(), self.role.to_string());
        agent.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());
        agent.insert("datacenter".to_string(), self.config.datacenter.clone());
        agent.insert("region".to_string(), self.config.region.clone());
        stats.insert("agent".to_string(), agent);

        let mut directory = BTreeMap::new();
        directory.insert(
            "fallback_servers".to_string(),
            self.registry.len().to_string(),
        );
        directory.insert(
            "registrations_accepted".to_string(),
            self.registry.accepted_count().to_string(),
        );
        directory.insert(
            "registrations_rejected".to_string(),
            self.registry.rejected_count().to_string(),
        );
        stats.insert("directory".to_string(), directory);

        stats.insert("requests".to_string(), self.stats.request_section());

        let mut runtime = BTreeMap::new();
        runtime.insert("os".to_string(), std::env::consts::OS.to_string());
        runtime.insert("arch".to_string(), std::env::consts::ARCH.to_string());
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        runtime.insert("cpus".to_string(), cpus.to_string());
        runtime.insert(
            "uptime_secs".to_string(),
            self.stats.uptime().as_secs().to_string(),
        );
        stats.insert("runtime".to_string(), runtime);

        if let Some(consensus) = &self.consensus {
            let raft = consensus.stats();
            if !raft.is_empty() {
                stats.insert("raft".to_string(), raft);
            }
        }
        if let Some(gossip) = &self.gossip {
            let serf = gossip.stats();
            if !serf.is_empty() {
                stats.insert("serf".to_string(), serf);
            }
        }

        stats
    }
}
