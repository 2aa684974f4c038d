//! # Executor Metrics
//!
//! Counters maintained by the worker loop and a serializable snapshot of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use super::ExecutorState;

/// Lock-free counters shared between the facade and its worker loops
#[derive(Debug, Default)]
pub struct ExecutionCounters {
    executed: AtomicU64,
    failed: AtomicU64,
    runs: AtomicU64,
}

impl ExecutionCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_executed(&self) {
        self.executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }
}

/// Point-in-time view of an executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorStats {
    pub executor_id: Uuid,
    pub state: ExecutorState,
    pub operations_per_minute: i32,
    pub time_to_wait_ms: u64,
    /// Number of loops started over the executor's lifetime
    pub runs: u64,
    pub executed: u64,
    pub failed: u64,
    pub collected_at: DateTime<Utc>,
}

impl ExecutorStats {
    pub fn total_operations(&self) -> u64 {
        self.executed + self.failed
    }

    /// Failed share of all operations (0.0 - 1.0)
    pub fn error_rate(&self) -> f64 {
        let total = self.total_operations();
        if total == 0 {
            0.0
        } else {
            self.failed as f64 / total as f64
        }
    }
}
