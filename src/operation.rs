//! # Operation Capability
//!
//! The unit of work an executor repeats. The executor never interprets what an
//! operation does or returns; it only measures it and forwards the outcome to
//! the registered observers.
//!
//! Anything the operation needs to talk to (an HTTP client, a server
//! connection) is handed to it by the caller when it is constructed.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::ExtraParameters;

/// Failure reported by a single execution of an [`Operation`]
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Operation failed: {message}")]
    Failed { message: String },

    #[error("Operation panicked: {message}")]
    Panicked { message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OperationError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Panicked { message }
    }
}

/// Read-only view of the executor handed to each execution
#[derive(Debug, Clone)]
pub struct OperationContext {
    executor_id: Uuid,
    iteration: u64,
    operation_type: Arc<str>,
    extra_parameters: Arc<ExtraParameters>,
}

impl OperationContext {
    pub fn new(
        executor_id: Uuid,
        operation_type: Arc<str>,
        extra_parameters: Arc<ExtraParameters>,
    ) -> Self {
        Self {
            executor_id,
            iteration: 0,
            operation_type,
            extra_parameters,
        }
    }

    pub(crate) fn for_iteration(&self, iteration: u64) -> Self {
        Self {
            iteration,
            ..self.clone()
        }
    }

    pub fn executor_id(&self) -> Uuid {
        self.executor_id
    }

    /// 1-based count of executions within the current run
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn operation_type(&self) -> &str {
        &self.operation_type
    }

    pub fn extra_parameters(&self) -> &ExtraParameters {
        &self.extra_parameters
    }
}

/// A caller-supplied unit of work
#[async_trait]
pub trait Operation: Send + Sync + 'static {
    /// Opaque success payload forwarded to observers
    type Response: Send + Sync + 'static;

    async fn execute(&self, context: &OperationContext) -> Result<Self::Response, OperationError>;

    /// Name used in log output
    fn name(&self) -> &str {
        "operation"
    }
}
