//! # Rate Control
//!
//! [`RateController`] owns the target rate and derives the delay between
//! executions as `60000 / rate` milliseconds. When a worker loop is attached,
//! every rate change is pushed into the loop's [`TimeToWait`] cell immediately;
//! the loop reads that cell at the top of each iteration.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::{MILLIS_PER_MINUTE, MIN_OPERATIONS_PER_MINUTE};

/// Delay shared between the controller (writer) and a worker loop (reader)
#[derive(Debug, Clone)]
pub struct TimeToWait {
    millis: Arc<AtomicU64>,
}

impl TimeToWait {
    pub fn new(delay: Duration) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(duration_to_millis(delay))),
        }
    }

    pub fn get(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::Acquire))
    }

    pub fn set(&self, delay: Duration) {
        self.millis.store(duration_to_millis(delay), Ordering::Release);
    }
}

fn duration_to_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

/// Delay for a rate, using integer division. Rates below the minimum are
/// treated as the minimum so the division is always defined.
pub fn delay_for_rate(operations_per_minute: i32) -> Duration {
    let rate = i64::from(operations_per_minute.max(MIN_OPERATIONS_PER_MINUTE));
    Duration::from_millis((MILLIS_PER_MINUTE / rate) as u64)
}

#[derive(Debug)]
struct RateState {
    operations_per_minute: i32,
    attached: Option<TimeToWait>,
}

#[derive(Debug)]
pub struct RateController {
    state: Mutex<RateState>,
}

impl RateController {
    /// Create a controller; an initial rate below 1 is clamped to 1
    pub fn new(operations_per_minute: i32) -> Self {
        Self {
            state: Mutex::new(RateState {
                operations_per_minute: clamp_rate(operations_per_minute),
                attached: None,
            }),
        }
    }

    pub fn current_rate(&self) -> i32 {
        self.state.lock().operations_per_minute
    }

    pub fn delay(&self) -> Duration {
        delay_for_rate(self.current_rate())
    }

    /// Set the rate and push the new delay to an attached loop.
    /// Returns the rate actually applied.
    pub fn set_rate(&self, operations_per_minute: i32) -> i32 {
        let mut state = self.state.lock();
        Self::apply(&mut state, operations_per_minute)
    }

    pub fn increment(&self) -> i32 {
        let mut state = self.state.lock();
        let next = state.operations_per_minute.saturating_add(1);
        Self::apply(&mut state, next)
    }

    pub fn decrement(&self) -> i32 {
        let mut state = self.state.lock();
        let next = state.operations_per_minute.saturating_sub(1);
        Self::apply(&mut state, next)
    }

    /// Bind a live loop's delay cell and seed it with the current delay
    pub fn attach(&self, time_to_wait: TimeToWait) {
        let mut state = self.state.lock();
        time_to_wait.set(delay_for_rate(state.operations_per_minute));
        state.attached = Some(time_to_wait);
    }

    pub fn detach(&self) {
        self.state.lock().attached = None;
    }

    #[cfg(test)]
    fn is_attached(&self) -> bool {
        self.state.lock().attached.is_some()
    }

    fn apply(state: &mut RateState, requested: i32) -> i32 {
        let rate = clamp_rate(requested);
        state.operations_per_minute = rate;

        let delay = delay_for_rate(rate);
        if let Some(time_to_wait) = &state.attached {
            time_to_wait.set(delay);
        }

        debug!(
            operations_per_minute = rate,
            delay_ms = delay.as_millis() as u64,
            attached = state.attached.is_some(),
            "Rate updated"
        );
        rate
    }
}

fn clamp_rate(requested: i32) -> i32 {
    if requested < MIN_OPERATIONS_PER_MINUTE {
        warn!(
            requested = requested,
            applied = MIN_OPERATIONS_PER_MINUTE,
            "Rate below minimum, clamping"
        );
        MIN_OPERATIONS_PER_MINUTE
    } else {
        requested
    }
}
