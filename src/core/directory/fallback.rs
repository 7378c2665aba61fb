// src/core/directory/fallback.rs

//! The client-side cache of candidate server addresses.

use super::collaborators::ClientProxyRegistrar;
use crate::core::errors::ConvoyError;
use crate::core::metrics::FALLBACK_REGISTRATIONS_TOTAL;
use crate::core::role::NodeRole;
use indexmap::IndexSet;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, trace};

/// The per-address result of a batch registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationOutcome {
    pub address: String,
    pub accepted: bool,
}

/// An ordered, de-duplicated set of fallback server addresses.
///
/// Insertions are serialized by the write lock; readers get a copy of the
/// whole set taken under the read lock.
pub struct FallbackRegistry {
    role: NodeRole,
    registrar: Option<Arc<dyn ClientProxyRegistrar>>,
    cache: RwLock<IndexSet<String>>,
    accepted: AtomicU64,
    rejected: AtomicU64,
}

impl FallbackRegistry {
    pub fn new(role: NodeRole, registrar: Option<Arc<dyn ClientProxyRegistrar>>) -> Self {
        Self {
            role,
            registrar,
            cache: RwLock::new(IndexSet::new()),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    fn registrar(&self, operation: &'static str) -> Result<&Arc<dyn ClientProxyRegistrar>, ConvoyError> {
        self.role.require_client(operation)?;
        self.registrar
            .as_ref()
            .ok_or_else(|| ConvoyError::Internal("client role without a client proxy".to_string()))
    }

    /// Registers a single address. Returns whether the client proxy accepted it.
    pub fn register(&self, address: &str) -> Result<bool, ConvoyError> {
        let registrar = self.registrar("register")?;
        if address.is_empty() {
            return Err(ConvoyError::InvalidRequest(
                "missing server address".to_string(),
            ));
        }
        Ok(self.register_with(registrar.as_ref(), address))
    }

    /// Registers every address in the batch. A rejected address is logged and
    /// does not stop the remaining ones from being processed.
    pub fn register_all(&self, addresses: &[String]) -> Result<Vec<RegistrationOutcome>, ConvoyError> {
        let registrar = self.registrar("register")?;
        if addresses.is_empty() {
            return Err(ConvoyError::InvalidRequest(
                "missing server address".to_string(),
            ));
        }

        let outcomes = addresses
            .iter()
            .map(|address| RegistrationOutcome {
                address: address.clone(),
                accepted: self.register_with(registrar.as_ref(), address),
            })
            .collect::<Vec<_>>();

        debug!(
            "Registered {}/{} fallback server addresses",
            outcomes.iter().filter(|o| o.accepted).count(),
            outcomes.len()
        );
        Ok(outcomes)
    }

    fn register_with(&self, registrar: &dyn ClientProxyRegistrar, address: &str) -> bool {
        trace!("Adding server {} to the client's fallback server list", address);

        if address.is_empty() || !registrar.add_server(address) {
            error!("Attempt to add server {:?} to client failed", address);
            self.rejected.fetch_add(1, Ordering::Relaxed);
            FALLBACK_REGISTRATIONS_TOTAL
                .with_label_values(&["rejected"])
                .inc();
            return false;
        }

        let inserted = self.cache.write().insert(address.to_string());
        let outcome = if inserted { "accepted" } else { "duplicate" };
        FALLBACK_REGISTRATIONS_TOTAL
            .with_label_values(&[outcome])
            .inc();
        self.accepted.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// A copy of the cached addresses in registration order.
    pub fn snapshot(&self) -> Vec<String> {
        self.cache.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    pub fn accepted_count(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}
