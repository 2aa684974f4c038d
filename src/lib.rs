#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Pacer Core
//!
//! Rate-controlled periodic execution of a caller-supplied operation.
//!
//! ## Overview
//!
//! An executor repeats an [`Operation`](operation::Operation) at a target
//! number of operations per minute. The rate can be raised, lowered or set
//! while the executor is running and takes effect on the next wait. Every
//! outcome, success or failure, is fanned out to an ordered list of
//! statistics observers, and each run ends with a single shutdown notification.
//!
//! What the operation does (build a request, parse a response) is up to the
//! caller; this crate only paces it and reports on it.
//!
//! ## Module Organization
//!
//! - [`executor`] - Rate control, the background loop and the executor facade
//! - [`operation`] - The operation capability and its execution context
//! - [`registry`] - Execution observers and their registry
//! - [`config`] - Executor configuration, layered loading and extra parameters
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pacer_core::{ConfigLoader, ConstantRateExecutor};
//! # use async_trait::async_trait;
//! # use pacer_core::operation::{Operation, OperationContext, OperationError};
//! # use std::sync::Arc;
//! # struct Probe;
//! # #[async_trait]
//! # impl Operation for Probe {
//! #     type Response = ();
//! #     async fn execute(&self, _ctx: &OperationContext) -> Result<(), OperationError> { Ok(()) }
//! # }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! pacer_core::logging::init_structured_logging();
//!
//! let config = ConfigLoader::new().load()?;
//! let executor = ConstantRateExecutor::new(&config, Arc::new(Probe))?;
//!
//! executor.start().await?;
//! tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//! executor.stop().await?;
//!
//! println!("{:?}", executor.stats());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod executor;
pub mod logging;
pub mod operation;
pub mod registry;

pub use config::{ConfigLoader, ExecutorConfig, ExtraParameters};
pub use error::{PacerError, Result};
pub use executor::{
    ConstantRateExecutor, ExecutorState, ExecutorStats, PeriodicExecutor, RateController,
};
pub use operation::{Operation, OperationContext, OperationError};
pub use registry::{ExecutionObserver, ObserverRegistry, ObserverResult};
