// src/core/role.rs

//! The runtime capability of the local agent: consensus server, workload
//! client, both, or neither.

use crate::core::errors::ConvoyError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role(s) the local node is currently playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// A pure controller process with no server or client attached.
    #[default]
    None,
    Server,
    Client,
    Both,
}

impl NodeRole {
    /// Builds the role from the two independent capability flags.
    pub fn from_flags(server: bool, client: bool) -> Self {
        match (server, client) {
            (true, true) => NodeRole::Both,
            (true, false) => NodeRole::Server,
            (false, true) => NodeRole::Client,
            (false, false) => NodeRole::None,
        }
    }

    pub fn is_server(self) -> bool {
        matches!(self, NodeRole::Server | NodeRole::Both)
    }

    pub fn is_client(self) -> bool {
        matches!(self, NodeRole::Client | NodeRole::Both)
    }

    /// Fails with `RoleUnavailable` unless the node is server-capable.
    pub fn require_server(self, operation: &'static str) -> Result<(), ConvoyError> {
        if self.is_server() {
            Ok(())
        } else {
            Err(ConvoyError::RoleUnavailable {
                operation,
                required: NodeRole::Server,
                actual: self,
            })
        }
    }

    /// Fails with `RoleUnavailable` unless the node is client-capable.
    pub fn require_client(self, operation: &'static str) -> Result<(), ConvoyError> {
        if self.is_client() {
            Ok(())
        } else {
            Err(ConvoyError::RoleUnavailable {
                operation,
                required: NodeRole::Client,
                actual: self,
            })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeRole::None => "none",
            NodeRole::Server => "server",
            NodeRole::Client => "client",
            NodeRole::Both => "both",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
