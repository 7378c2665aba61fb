// src/core/cluster/mod.rs

//! In-process stand-ins for the consensus, gossip and client-proxy
//! collaborators, used when the agent runs on its own.

pub mod gossip;
pub mod peers;
pub mod proxy;

// Re-export key types for easier access from other modules.
pub use gossip::LocalMembership;
pub use peers::StaticPeerSource;
pub use proxy::RpcProxy;
