// src/core/mod.rs

//! The central module containing the core logic and data structures of Convoy.

pub mod cluster;
pub mod directory;
pub mod errors;
pub mod latency;
pub mod metrics;
pub mod role;
pub mod state;

pub use directory::Directory;
pub use errors::{CollaboratorError, ConvoyError};
pub use role::NodeRole;
