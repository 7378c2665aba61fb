// src/core/errors.rs

//! Defines the primary error type for the agent and the error type returned
//! by the consensus, gossip and client-proxy collaborators.

use crate::core::role::NodeRole;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// An error reported by an external collaborator (consensus, gossip).
///
/// The message is the collaborator's own, rendered verbatim. The optional
/// source keeps the underlying cause reachable through `Error::source`.
#[derive(Debug, Clone)]
pub struct CollaboratorError {
    message: String,
    recoverable: bool,
    source: Option<Arc<dyn StdError + Send + Sync>>,
}

impl CollaboratorError {
    /// Creates an unrecoverable error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            recoverable: false,
            source: None,
        }
    }

    /// Creates an error that upstream callers may retry.
    pub fn recoverable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            recoverable: true,
            source: None,
        }
    }

    /// Wraps an underlying error, keeping its message as the display text.
    pub fn from_source<E>(source: E, recoverable: bool) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: source.to_string(),
            recoverable,
            source: Some(Arc::new(source)),
        }
    }

    /// The error a collaborator returns when the surrounding transport
    /// cancelled the in-flight call.
    pub fn cancelled() -> Self {
        Self::new("request cancelled")
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_recoverable(&self) -> bool {
        self.recoverable
    }
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for CollaboratorError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn StdError + 'static))
    }
}

impl PartialEq for CollaboratorError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message && self.recoverable == other.recoverable
    }
}

/// The main error enum for every directory operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvoyError {
    /// The operation needs a role the local node does not currently have.
    #[error("{operation} requires the {required} role, local node role is {actual}")]
    RoleUnavailable {
        operation: &'static str,
        required: NodeRole,
        actual: NodeRole,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The consensus or gossip layer failed. Rendered as the collaborator's message.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    #[error("Internal Error: {0}")]
    Internal(String),
}

impl ConvoyError {
    /// A stable, machine-checkable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ConvoyError::RoleUnavailable { .. } => "role_unavailable",
            ConvoyError::InvalidRequest(_) => "invalid_request",
            ConvoyError::Collaborator(_) => "collaborator_failure",
            ConvoyError::MethodNotAllowed(_) => "method_not_allowed",
            ConvoyError::Internal(_) => "internal",
        }
    }

    /// The HTTP status code the agent's API responds with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ConvoyError::RoleUnavailable { .. } => 501,
            ConvoyError::InvalidRequest(_) => 400,
            ConvoyError::Collaborator(_) => 500,
            ConvoyError::MethodNotAllowed(_) => 405,
            ConvoyError::Internal(_) => 500,
        }
    }

    /// Returns true if a collaborator marked the failure as retryable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ConvoyError::Collaborator(e) if e.is_recoverable())
    }
}

impl From<serde_json::Error> for ConvoyError {
    fn from(e: serde_json::Error) -> Self {
        ConvoyError::Internal(format!("JSON serialization error: {e}"))
    }
}
