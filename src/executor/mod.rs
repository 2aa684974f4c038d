//! # Executor
//!
//! Rate-controlled periodic execution.
//!
//! - [`rate`]: target rate and the delay derived from it
//! - [`periodic`]: the cancellable background loop
//! - [`constant_rate`]: the caller-facing executor tying rate, loop and observers together
//! - [`metrics`]: execution counters and snapshots

pub mod constant_rate;
pub mod metrics;
pub mod periodic;
pub mod rate;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use constant_rate::ConstantRateExecutor;
pub use metrics::{ExecutionCounters, ExecutorStats};
pub use periodic::PeriodicExecutor;
pub use rate::{delay_for_rate, RateController, TimeToWait};

/// Lifecycle of a [`ConstantRateExecutor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorState {
    Idle,
    Running,
    Stopped,
}

impl ExecutorState {
    pub fn can_start(self) -> bool {
        matches!(self, ExecutorState::Idle | ExecutorState::Stopped)
    }
}

impl fmt::Display for ExecutorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorState::Idle => write!(f, "idle"),
            ExecutorState::Running => write!(f, "running"),
            ExecutorState::Stopped => write!(f, "stopped"),
        }
    }
}
