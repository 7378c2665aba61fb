// src/core/directory/member.rs

//! The directory's stable node representation and its translation from raw
//! gossip membership records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

/// The gossip layer's internal member status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GossipStatus {
    #[default]
    None,
    Alive,
    Leaving,
    Left,
    Failed,
}

/// A raw membership record as handed out by the gossip collaborator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GossipMember {
    pub name: String,
    pub addr: Option<IpAddr>,
    pub port: u16,
    pub tags: BTreeMap<String, String>,
    pub status: GossipStatus,
    pub protocol_min: u8,
    pub protocol_max: u8,
    pub protocol_cur: u8,
    pub delegate_min: u8,
    pub delegate_max: u8,
    pub delegate_cur: u8,
}

/// The stable, externally visible status of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Only seen on the zero node.
    #[default]
    None,
    Alive,
    Leaving,
    Left,
    Failed,
}

impl MemberStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberStatus::None => "none",
            MemberStatus::Alive => "alive",
            MemberStatus::Leaving => "leaving",
            MemberStatus::Left => "left",
            MemberStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<GossipStatus> for MemberStatus {
    fn from(status: GossipStatus) -> Self {
        match status {
            GossipStatus::None => MemberStatus::None,
            GossipStatus::Alive => MemberStatus::Alive,
            GossipStatus::Leaving => MemberStatus::Leaving,
            GossipStatus::Left => MemberStatus::Left,
            GossipStatus::Failed => MemberStatus::Failed,
        }
    }
}

/// A cluster participant as reported by the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    pub name: String,
    pub addr: Option<IpAddr>,
    pub port: u16,
    pub tags: BTreeMap<String, String>,
    pub status: MemberStatus,
    pub protocol_min: u8,
    pub protocol_max: u8,
    pub protocol_cur: u8,
    pub delegate_min: u8,
    pub delegate_max: u8,
    pub delegate_cur: u8,
}

impl Node {
    /// Checks `min <= cur <= max` for both the protocol and delegate versions.
    pub fn has_consistent_versions(&self) -> bool {
        self.protocol_min <= self.protocol_cur
            && self.protocol_cur <= self.protocol_max
            && self.delegate_min <= self.delegate_cur
            && self.delegate_cur <= self.delegate_max
    }

    /// Returns true if this is the zero node handed out when no gossip
    /// participant is available.
    pub fn is_empty(&self) -> bool {
        *self == Node::default()
    }
}

/// Translates a raw gossip record into a `Node`. Total and side-effect free.
pub fn translate(member: &GossipMember) -> Node {
    Node {
        name: member.name.clone(),
        addr: member.addr,
        port: member.port,
        tags: member.tags.clone(),
        status: member.status.into(),
        protocol_min: member.protocol_min,
        protocol_max: member.protocol_max,
        protocol_cur: member.protocol_cur,
        delegate_min: member.delegate_min,
        delegate_max: member.delegate_max,
        delegate_cur: member.delegate_cur,
    }
}

impl From<&GossipMember> for Node {
    fn from(member: &GossipMember) -> Self {
        translate(member)
    }
}
