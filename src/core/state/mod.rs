// src/core/state/mod.rs

//! Shared agent state that is not owned by the directory itself.

mod stats;

pub use stats::StatsState;
