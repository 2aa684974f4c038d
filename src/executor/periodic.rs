//! # Periodic Executor
//!
//! A single background loop that waits the current delay, runs the operation,
//! and routes the outcome to the observers, until it is told to stop.
//!
//! The delay is re-read from a [`TimeToWait`] cell at the top of every
//! iteration, so a rate change applies to the next wait. Executions never
//! overlap: if an operation outlasts the delay, the next wait starts only after
//! it returns. Stopping is cooperative; an in-flight operation always completes,
//! while a pending wait is cut short.
//!
//! A `PeriodicExecutor` runs once. Starting again means building a new one.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::metrics::ExecutionCounters;
use super::rate::TimeToWait;
use crate::error::{PacerError, Result};
use crate::logging::log_error;
use crate::operation::{Operation, OperationContext, OperationError};
use crate::registry::ObserverRegistry;

/// Control state shared between the owner and the spawned loop
#[derive(Debug)]
struct LoopState {
    /// Control flag for the loop
    running: AtomicBool,
    /// Cuts a pending wait short on shutdown
    shutdown_notify: Notify,
    executor_id: Uuid,
}

/// Everything the spawned task owns
struct LoopWorker<O: Operation> {
    operation: Arc<O>,
    context: OperationContext,
    observers: Arc<ObserverRegistry<O::Response>>,
    counters: Arc<ExecutionCounters>,
    time_to_wait: TimeToWait,
    state: Arc<LoopState>,
}

impl<O: Operation> LoopWorker<O> {
    fn should_continue(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    async fn run(self) {
        info!(
            executor_id = %self.state.executor_id,
            operation = self.operation.name(),
            "Starting periodic loop"
        );

        let mut iteration: u64 = 0;
        while self.should_continue() {
            let wait = self.time_to_wait.get();
            if wait.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {},
                    _ = self.state.shutdown_notify.notified() => {
                        debug!("Shutdown notification received during wait");
                        break;
                    }
                }
            }

            if !self.should_continue() {
                break;
            }

            iteration += 1;
            self.execute_once(iteration).await;
        }

        info!(
            executor_id = %self.state.executor_id,
            iterations = iteration,
            "Periodic loop ended"
        );
    }

    async fn execute_once(&self, iteration: u64) {
        let context = self.context.for_iteration(iteration);
        let started = Instant::now();

        let outcome = AssertUnwindSafe(self.operation.execute(&context))
            .catch_unwind()
            .await;
        let elapsed = started.elapsed();

        let result = match outcome {
            Ok(result) => result,
            Err(panic) => {
                let err = OperationError::from_panic(panic);
                log_error(
                    "periodic_executor",
                    self.operation.name(),
                    &err.to_string(),
                    Some(format!("iteration {iteration}").as_str()),
                );
                Err(err)
            }
        };

        match result {
            Ok(response) => {
                self.counters.record_executed();
                self.observers.notify_executed(&response, elapsed);
            }
            Err(err) => {
                self.counters.record_failed();
                warn!(
                    executor_id = %self.state.executor_id,
                    iteration = iteration,
                    error = %err,
                    "Operation failed"
                );
                self.observers.notify_error(&err);
            }
        }
    }
}

pub struct PeriodicExecutor<O: Operation> {
    worker: Option<LoopWorker<O>>,
    time_to_wait: TimeToWait,
    state: Arc<LoopState>,
    handle: Option<JoinHandle<()>>,
}

impl<O: Operation> std::fmt::Debug for PeriodicExecutor<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicExecutor")
            .field("executor_id", &self.state.executor_id)
            .field("time_to_wait", &self.time_to_wait.get())
            .field("running", &self.is_running())
            .finish()
    }
}

impl<O: Operation> PeriodicExecutor<O> {
    pub fn new(
        operation: Arc<O>,
        context: OperationContext,
        observers: Arc<ObserverRegistry<O::Response>>,
        counters: Arc<ExecutionCounters>,
        time_to_wait: Duration,
    ) -> Self {
        let time_to_wait = TimeToWait::new(time_to_wait);
        let state = Arc::new(LoopState {
            running: AtomicBool::new(false),
            shutdown_notify: Notify::new(),
            executor_id: context.executor_id(),
        });

        let worker = LoopWorker {
            operation,
            context,
            observers,
            counters,
            time_to_wait: time_to_wait.clone(),
            state: state.clone(),
        };

        Self {
            worker: Some(worker),
            time_to_wait,
            state,
            handle: None,
        }
    }

    /// Handle to the delay cell read by the loop
    pub fn time_to_wait(&self) -> TimeToWait {
        self.time_to_wait.clone()
    }

    /// Delay for the next wait; the current one is not affected
    pub fn set_time_to_wait(&self, delay: Duration) {
        self.time_to_wait.set(delay);
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Spawn the loop on the current tokio runtime
    #[instrument(skip(self), fields(executor_id = %self.state.executor_id))]
    pub fn start(&mut self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| PacerError::RuntimeUnavailable(e.to_string()))?;

        let Some(worker) = self.worker.take() else {
            return Err(PacerError::AlreadyRunning);
        };

        self.state.running.store(true, Ordering::Release);
        self.handle = Some(runtime.spawn(worker.run()));
        Ok(())
    }

    /// Signal the loop and wait for it to exit. An in-flight operation is never
    /// cut short; if the loop is still busy after `warn_after` a warning is
    /// logged and the wait continues.
    pub async fn stop(mut self, warn_after: Duration) -> Result<()> {
        let Some(mut handle) = self.handle.take() else {
            return Err(PacerError::NotRunning);
        };

        debug!(executor_id = %self.state.executor_id, "Stopping periodic loop");

        self.signal_shutdown();

        let joined = match tokio::time::timeout(warn_after, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(
                    executor_id = %self.state.executor_id,
                    waited_ms = warn_after.as_millis() as u64,
                    "Periodic loop still finishing an operation, waiting for it"
                );
                handle.await
            }
        };

        match joined {
            Ok(()) => debug!("Periodic loop stopped gracefully"),
            Err(e) => warn!(error = %e, "Periodic loop ended abnormally"),
        }
        Ok(())
    }

    fn signal_shutdown(&self) {
        self.state.running.store(false, Ordering::Release);
        self.state.shutdown_notify.notify_one();
    }
}

impl<O: Operation> Drop for PeriodicExecutor<O> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.signal_shutdown();
        }
    }
}
