// src/config.rs

//! Manages agent configuration: loading, defaults, and validation.

use crate::core::role::NodeRole;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::warn;

/// Settings for the consensus server side of the agent.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfig {
    /// If `true`, the agent participates in consensus and gossip as a server.
    #[serde(default)]
    pub enabled: bool,
    /// The port servers use for RPC, advertised in the consensus peer list.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,
    /// The port the gossip layer binds to.
    #[serde(default = "default_serf_port")]
    pub serf_port: u16,
    /// Other consensus peers (`host:port`) known at startup.
    #[serde(default)]
    pub peers: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rpc_port: default_rpc_port(),
            serf_port: default_serf_port(),
            peers: Vec::new(),
        }
    }
}

fn default_rpc_port() -> u16 {
    4647
}
fn default_serf_port() -> u16 {
    4648
}

/// Settings for the workload client side of the agent.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ClientConfig {
    /// If `true`, the agent hosts workloads and keeps a fallback server list.
    #[serde(default)]
    pub enabled: bool,
    /// Server addresses the fallback registry is seeded with at startup.
    #[serde(default)]
    pub servers: Vec<String>,
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MetricsConfig {
    /// If true, an HTTP server will be started to expose Prometheus metrics.
    #[serde(default)]
    pub enabled: bool,
    /// The port for the Prometheus metrics server.
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

fn default_metrics_port() -> u16 {
    9646
}

/// The top-level agent configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_node_name")]
    pub node_name: String,
    #[serde(default = "default_datacenter")]
    pub datacenter: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// The port of the HTTP API.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

fn default_node_name() -> String {
    "convoy-agent".to_string()
}
fn default_datacenter() -> String {
    "dc1".to_string()
}
fn default_region() -> String {
    "global".to_string()
}
fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}
fn default_http_port() -> u16 {
    4646
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_name: default_node_name(),
            datacenter: default_datacenter(),
            region: default_region(),
            bind_addr: default_bind_addr(),
            http_port: default_http_port(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            client: ClientConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance by reading and parsing a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        Self::from_toml_str(&contents).with_context(|| format!("Invalid config in '{path}'"))
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// The role(s) this agent runs with.
    pub fn role(&self) -> NodeRole {
        NodeRole::from_flags(self.server.enabled, self.client.enabled)
    }

    /// The RPC address this agent advertises to consensus peers.
    pub fn advertise_rpc_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.server.rpc_port)
    }

    /// Validates the configuration to ensure logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.node_name.trim().is_empty() {
            return Err(anyhow!("node_name cannot be empty"));
        }
        if self.bind_addr.trim().is_empty() {
            return Err(anyhow!("bind_addr cannot be empty"));
        }
        if self.http_port == 0 {
            return Err(anyhow!("http_port cannot be 0"));
        }

        if self.server.enabled {
            if self.server.rpc_port == 0 {
                return Err(anyhow!("server.rpc_port cannot be 0"));
            }
            if self.server.serf_port == 0 {
                return Err(anyhow!("server.serf_port cannot be 0"));
            }
            if self.server.rpc_port == self.server.serf_port {
                return Err(anyhow!(
                    "server.rpc_port and server.serf_port must differ"
                ));
            }
            if let Some(peer) = self.server.peers.iter().find(|p| p.trim().is_empty()) {
                return Err(anyhow!("server.peers contains an empty address: {peer:?}"));
            }
        }

        if self.client.enabled && self.client.servers.is_empty() && !self.server.enabled {
            warn!(
                "client mode is enabled without server addresses; servers must be registered at runtime"
            );
        }

        if self.metrics.enabled {
            if self.metrics.port == 0 {
                return Err(anyhow!("metrics.port cannot be 0"));
            }
            if self.metrics.port == self.http_port {
                return Err(anyhow!(
                    "metrics.port cannot be the same as the HTTP API port"
                ));
            }
        }
        Ok(())
    }
}
