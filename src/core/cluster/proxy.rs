// src/core/cluster/proxy.rs

//! The client's RPC proxy registrar.

use crate::core::directory::ClientProxyRegistrar;
use tracing::debug;

/// Accepts server addresses of the form `host:port` with a non-empty host
/// and a non-zero port.
#[derive(Debug, Default)]
pub struct RpcProxy;

impl RpcProxy {
    pub fn new() -> Self {
        Self
    }
}

/// Checks that `address` is a usable `host:port` endpoint.
pub fn is_valid_server_address(address: &str) -> bool {
    let Some((host, port)) = address.rsplit_once(':') else {
        return false;
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    !host.is_empty()
        && !host.chars().any(char::is_whitespace)
        && matches!(port.parse::<u16>(), Ok(p) if p != 0)
}

impl ClientProxyRegistrar for RpcProxy {
    fn add_server(&self, address: &str) -> bool {
        let valid = is_valid_server_address(address);
        if !valid {
            debug!("Rejected malformed server address {:?}", address);
        }
        valid
    }
}
