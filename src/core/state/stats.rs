// src/core/state/stats.rs

//! Contains state definitions and logic for agent statistics.

use crate::core::latency::{LatencySample, SampleRing};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Holds request counters and recent latency samples for the self descriptor.
#[derive(Debug)]
pub struct StatsState {
    started_at: Instant,
    /// The total number of directory requests served since startup.
    total_requests: AtomicU64,
    latencies: SampleRing<LatencySample>,
}

impl Default for StatsState {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsState {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            total_requests: AtomicU64::new(0),
            latencies: SampleRing::default(),
        }
    }

    /// Records one served request and its latency.
    pub fn record_request(&self, operation: &'static str, latency: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.latencies.push(LatencySample { operation, latency });
    }

    pub fn get_total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn recent_latencies(&self) -> Vec<LatencySample> {
        self.latencies.values()
    }

    /// The `requests` section of the self descriptor.
    pub fn request_section(&self) -> BTreeMap<String, String> {
        let samples = self.latencies.values();
        let mut section = BTreeMap::new();
        section.insert("total".to_string(), self.get_total_requests().to_string());
        section.insert("count".to_string(), samples.len().to_string());
        section.insert("window".to_string(), self.latencies.capacity().to_string());

        let last_us = self
            .latencies
            .peek()
            .map(|s| s.latency.as_micros())
            .unwrap_or(0);
        section.insert("last_us".to_string(), last_us.to_string());

        let mean_us = if samples.is_empty() {
            0
        } else {
            samples.iter().map(|s| s.latency.as_micros()).sum::<u128>() / samples.len() as u128
        };
        section.insert("mean_us".to_string(), mean_us.to_string());
        section
    }
}
