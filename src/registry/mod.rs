//! # Registry
//!
//! Registration and notification of execution observers.

pub mod observer_registry;

pub use observer_registry::{ExecutionObserver, ObserverRegistry, ObserverResult};
