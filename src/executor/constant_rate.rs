//! # Constant Rate Executor
//!
//! Runs an [`Operation`] at a target number of operations per minute, lets the
//! rate be changed while running, and reports every outcome to the registered
//! observers.
//!
//! ## Lifecycle
//!
//! `Idle --start--> Running --stop--> Stopped --start--> Running ...`
//!
//! Each `start()` spawns a fresh [`PeriodicExecutor`]. `stop()` returns only
//! after that loop has exited, then delivers `on_finished` to every observer
//! exactly once for the run.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use pacer_core::config::ExecutorConfig;
//! use pacer_core::executor::ConstantRateExecutor;
//! use pacer_core::operation::{Operation, OperationContext, OperationError};
//! use std::sync::Arc;
//!
//! struct Ping;
//!
//! #[async_trait]
//! impl Operation for Ping {
//!     type Response = String;
//!
//!     async fn execute(&self, ctx: &OperationContext) -> Result<String, OperationError> {
//!         Ok(format!("pong #{}", ctx.iteration()))
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = ConstantRateExecutor::new(&ExecutorConfig::with_rate(120), Arc::new(Ping))?;
//! executor.start().await?;
//! executor.increment_operations_per_minute();
//! executor.stop().await?;
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::metrics::{ExecutionCounters, ExecutorStats};
use super::periodic::PeriodicExecutor;
use super::rate::RateController;
use super::ExecutorState;
use crate::config::{ExecutorConfig, ExtraParameters};
use crate::error::{PacerError, Result};
use crate::logging::log_executor_operation;
use crate::operation::{Operation, OperationContext, OperationError};
use crate::registry::{ExecutionObserver, ObserverRegistry};

pub struct ConstantRateExecutor<O: Operation> {
    id: Uuid,
    operation: Arc<O>,
    operation_type: Arc<str>,
    extra_parameters: Arc<ExtraParameters>,
    stop_timeout: Duration,
    rate: RateController,
    observers: Arc<ObserverRegistry<O::Response>>,
    counters: Arc<ExecutionCounters>,
    state: RwLock<ExecutorState>,
    /// Serializes start/stop; holds the loop of the current run
    worker: Mutex<Option<PeriodicExecutor<O>>>,
}

impl<O: Operation> std::fmt::Debug for ConstantRateExecutor<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstantRateExecutor")
            .field("id", &self.id)
            .field("operation", &self.operation.name())
            .field("operation_type", &self.operation_type)
            .field("state", &self.state())
            .field("operations_per_minute", &self.operations_per_minute())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<O: Operation> ConstantRateExecutor<O> {
    pub fn new(config: &ExecutorConfig, operation: Arc<O>) -> Result<Self> {
        Self::with_observers(config, operation, Vec::new())
    }

    pub fn with_observers(
        config: &ExecutorConfig,
        operation: Arc<O>,
        observers: Vec<Arc<dyn ExecutionObserver<O::Response>>>,
    ) -> Result<Self> {
        config.validate()?;

        let executor = Self {
            id: Uuid::new_v4(),
            operation,
            operation_type: Arc::from(config.operation_type.as_str()),
            extra_parameters: Arc::new(config.parsed_extra_parameters()),
            stop_timeout: config.stop_timeout(),
            rate: RateController::new(config.operations_per_minute),
            observers: Arc::new(ObserverRegistry::with_observers(observers)),
            counters: Arc::new(ExecutionCounters::new()),
            state: RwLock::new(ExecutorState::Idle),
            worker: Mutex::new(None),
        };

        debug!(
            executor_id = %executor.id,
            operations_per_minute = config.operations_per_minute,
            extra_parameters = executor.extra_parameters.len(),
            "Created constant rate executor"
        );
        Ok(executor)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Reserved setup hook; currently does nothing
    pub fn prepare(&self) -> Result<()> {
        debug!(executor_id = %self.id, "Prepare requested");
        Ok(())
    }

    #[instrument(skip(self), fields(executor_id = %self.id))]
    pub async fn start(&self) -> Result<()> {
        let mut worker = self.worker.lock().await;
        if worker.is_some() || !self.state().can_start() {
            return Err(PacerError::AlreadyRunning);
        }

        let context = OperationContext::new(
            self.id,
            self.operation_type.clone(),
            self.extra_parameters.clone(),
        );
        let mut periodic = PeriodicExecutor::new(
            self.operation.clone(),
            context,
            self.observers.clone(),
            self.counters.clone(),
            self.rate.delay(),
        );

        self.rate.attach(periodic.time_to_wait());
        if let Err(e) = periodic.start() {
            self.rate.detach();
            return Err(e);
        }

        self.counters.record_run();
        *worker = Some(periodic);
        *self.state.write() = ExecutorState::Running;

        log_executor_operation(
            "start",
            &self.id.to_string(),
            Some(self.operations_per_minute()),
            "running",
            None,
        );
        Ok(())
    }

    /// Stop the loop, wait for it to exit, then notify observers of shutdown
    #[instrument(skip(self), fields(executor_id = %self.id))]
    pub async fn stop(&self) -> Result<()> {
        let mut worker = self.worker.lock().await;
        let Some(periodic) = worker.take() else {
            return Err(PacerError::NotRunning);
        };

        self.rate.detach();
        periodic.stop(self.stop_timeout).await?;

        self.observers.notify_finished();
        *self.state.write() = ExecutorState::Stopped;

        log_executor_operation(
            "stop",
            &self.id.to_string(),
            Some(self.operations_per_minute()),
            "stopped",
            None,
        );
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.state() == ExecutorState::Running
    }

    pub fn state(&self) -> ExecutorState {
        *self.state.read()
    }

    /// Current target rate
    pub fn operations_per_minute(&self) -> i32 {
        self.rate.current_rate()
    }

    pub fn set_operations_per_minute(&self, operations_per_minute: i32) -> i32 {
        let rate = self.rate.set_rate(operations_per_minute);
        info!(executor_id = %self.id, operations_per_minute = rate, "Rate set");
        rate
    }

    pub fn increment_operations_per_minute(&self) -> i32 {
        let rate = self.rate.increment();
        info!(executor_id = %self.id, operations_per_minute = rate, "Rate incremented");
        rate
    }

    pub fn decrement_operations_per_minute(&self) -> i32 {
        let rate = self.rate.decrement();
        info!(executor_id = %self.id, operations_per_minute = rate, "Rate decremented");
        rate
    }

    /// Delay between executions at the current rate
    pub fn time_to_wait(&self) -> Duration {
        self.rate.delay()
    }

    /// Register an observer; safe before or during a run
    pub fn add_statistic(&self, observer: Arc<dyn ExecutionObserver<O::Response>>) {
        self.observers.add(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Report a successful execution to every observer
    pub fn notify_query_executed(&self, response: &O::Response, elapsed: Duration) {
        self.observers.notify_executed(response, elapsed);
    }

    /// Report a failed execution to every observer
    pub fn notify_error(&self, error: &OperationError) {
        self.observers.notify_error(error);
    }

    pub fn extra_parameters(&self) -> &ExtraParameters {
        &self.extra_parameters
    }

    pub fn operation_type(&self) -> &str {
        &self.operation_type
    }

    pub fn stats(&self) -> ExecutorStats {
        ExecutorStats {
            executor_id: self.id,
            state: self.state(),
            operations_per_minute: self.operations_per_minute(),
            time_to_wait_ms: self.time_to_wait().as_millis() as u64,
            runs: self.counters.runs(),
            executed: self.counters.executed(),
            failed: self.counters.failed(),
            collected_at: Utc::now(),
        }
    }
}
