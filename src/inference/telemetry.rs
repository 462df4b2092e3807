//! Telemetry Ring
//!
//! Process-wide request counters and a bounded window of recent prediction
//! latencies. One mutex guards every counter and the window together, so a
//! snapshot never observes a half-applied update and the window can never
//! grow past its capacity under concurrent requests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Default number of latency samples retained
pub const DEFAULT_WINDOW: usize = 100;

/// Summary of the retained latency window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    /// Number of samples currently retained
    pub count: usize,
    /// Mean latency over the window (ms)
    pub avg_ms: f64,
    /// Minimum latency over the window (ms)
    pub min_ms: f64,
    /// Maximum latency over the window (ms)
    pub max_ms: f64,
    /// Requests seen since startup, successful or not
    pub total_requests: u64,
    /// Latency samples recorded since startup
    pub predictions_recorded: u64,
}

#[derive(Debug, Default)]
struct RingState {
    total_requests: u64,
    predictions_recorded: u64,
    latencies: VecDeque<f64>,
}

/// Shared latency window and request counters
#[derive(Debug)]
pub struct TelemetryRing {
    state: Mutex<RingState>,
    capacity: usize,
    started_at: Instant,
}

impl Default for TelemetryRing {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRing {
    /// Create an empty ring with the default window of 100 samples
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW)
    }

    /// Create an empty ring keeping at most `capacity` samples (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(RingState::default()),
            capacity,
            started_at: Instant::now(),
        }
    }

    // Every update leaves the state consistent, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, RingState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count an incoming request
    pub fn count_request(&self) {
        self.lock().total_requests += 1;
    }

    /// Record the latency of a completed prediction
    ///
    /// Evicts the oldest sample once the window is over capacity.
    pub fn record(&self, latency_ms: f64) {
        let mut state = self.lock();
        state.latencies.push_back(latency_ms);
        while state.latencies.len() > self.capacity {
            state.latencies.pop_front();
        }
        state.predictions_recorded += 1;
    }

    /// Statistics over the retained window; all zeros when empty
    pub fn snapshot(&self) -> TelemetrySnapshot {
        let state = self.lock();
        let mut snapshot = TelemetrySnapshot {
            total_requests: state.total_requests,
            predictions_recorded: state.predictions_recorded,
            ..TelemetrySnapshot::default()
        };

        if state.latencies.is_empty() {
            return snapshot;
        }

        let count = state.latencies.len();
        let sum: f64 = state.latencies.iter().sum();
        snapshot.count = count;
        snapshot.avg_ms = sum / count as f64;
        snapshot.min_ms = state.latencies.iter().copied().fold(f64::INFINITY, f64::min);
        snapshot.max_ms = state.latencies.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        snapshot
    }

    /// Retained samples, oldest first
    pub fn retained(&self) -> Vec<f64> {
        self.lock().latencies.iter().copied().collect()
    }

    pub fn total_requests(&self) -> u64 {
        self.lock().total_requests
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wall-clock time since the ring was created
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
