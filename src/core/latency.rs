// src/core/latency.rs

//! A fixed-capacity ring of telemetry samples, used to track the latency of
//! recent directory requests.

use crate::core::errors::ConvoyError;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::time::Duration;

/// The default number of samples kept by a ring.
pub const DEFAULT_RING_CAPACITY: usize = 60;

/// A circular buffer that overwrites its oldest sample once full.
#[derive(Debug)]
pub struct SampleRing<T> {
    capacity: usize,
    samples: RwLock<VecDeque<T>>,
}

impl<T: Clone> Default for SampleRing<T> {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_RING_CAPACITY,
            samples: RwLock::new(VecDeque::with_capacity(DEFAULT_RING_CAPACITY)),
        }
    }
}

impl<T: Clone> SampleRing<T> {
    /// Creates a ring with room for `capacity` samples. A zero capacity is rejected.
    pub fn new(capacity: usize) -> Result<Self, ConvoyError> {
        if capacity < 1 {
            return Err(ConvoyError::InvalidRequest(format!(
                "can not create a ring buffer with capacity: {capacity}"
            )));
        }
        Ok(Self {
            capacity,
            samples: RwLock::new(VecDeque::with_capacity(capacity)),
        })
    }

    pub fn push(&self, value: T) {
        let mut samples = self.samples.write();
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(value);
    }

    /// The most recently pushed sample.
    pub fn peek(&self) -> Option<T> {
        self.samples.read().back().cloned()
    }

    /// All samples, oldest first.
    pub fn values(&self) -> Vec<T> {
        self.samples.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A single request latency measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySample {
    pub operation: &'static str,
    pub latency: Duration,
}
