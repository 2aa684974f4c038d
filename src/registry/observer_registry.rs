//! # Observer Registry
//!
//! Ordered fan-out of execution outcomes to statistics observers.
//!
//! ## Overview
//!
//! Observers are notified in registration order. A failing observer, whether it
//! returns an error or panics, is logged and skipped; the remaining observers
//! are still notified. Notification iterates over a snapshot of the list, so an
//! `add()` racing a running worker never blocks it and takes effect from the
//! next notification.
//!
//! ## Usage
//!
//! ```rust
//! use pacer_core::registry::{ExecutionObserver, ObserverRegistry, ObserverResult};
//! use pacer_core::operation::OperationError;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::time::Duration;
//!
//! struct Counter(AtomicU64);
//!
//! impl ExecutionObserver<String> for Counter {
//!     fn on_executed(&self, _response: &String, _elapsed: Duration) -> ObserverResult {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     }
//!     fn on_error(&self, _error: &OperationError) -> ObserverResult { Ok(()) }
//!     fn on_finished(&self) -> ObserverResult { Ok(()) }
//! }
//!
//! let registry: ObserverRegistry<String> = ObserverRegistry::new();
//! let counter = Arc::new(Counter(AtomicU64::new(0)));
//! registry.add(counter.clone());
//! registry.notify_executed(&"ok".to_string(), Duration::from_millis(12));
//! assert_eq!(counter.0.load(Ordering::Relaxed), 1);
//! ```

use parking_lot::RwLock;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::logging::log_error;
use crate::operation::OperationError;

pub type ObserverResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Statistics collaborator notified of execution outcomes and shutdown
pub trait ExecutionObserver<R>: Send + Sync {
    /// A successful execution and the time it took
    fn on_executed(&self, response: &R, elapsed: Duration) -> ObserverResult;

    fn on_error(&self, error: &OperationError) -> ObserverResult;

    /// Called once per run after the worker has exited; finalize aggregates here
    fn on_finished(&self) -> ObserverResult;

    fn observer_name(&self) -> &str {
        "unnamed_observer"
    }
}

pub struct ObserverRegistry<R> {
    observers: RwLock<Vec<Arc<dyn ExecutionObserver<R>>>>,
}

impl<R> std::fmt::Debug for ObserverRegistry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}

impl<R> Default for ObserverRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ObserverRegistry<R> {
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn with_observers(observers: Vec<Arc<dyn ExecutionObserver<R>>>) -> Self {
        Self {
            observers: RwLock::new(observers),
        }
    }

    pub fn add(&self, observer: Arc<dyn ExecutionObserver<R>>) {
        debug!(observer = observer.observer_name(), "Registering observer");
        self.observers.write().push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    pub fn notify_executed(&self, response: &R, elapsed: Duration) {
        self.notify_each("executed", |observer| {
            observer.on_executed(response, elapsed)
        });
    }

    pub fn notify_error(&self, err: &OperationError) {
        self.notify_each("error", |observer| observer.on_error(err));
    }

    pub fn notify_finished(&self) {
        self.notify_each("finished", |observer| observer.on_finished());
    }

    fn snapshot(&self) -> Vec<Arc<dyn ExecutionObserver<R>>> {
        self.observers.read().clone()
    }

    fn notify_each<F>(&self, event: &str, notify: F)
    where
        F: Fn(&dyn ExecutionObserver<R>) -> ObserverResult,
    {
        for observer in self.snapshot() {
            match catch_unwind(AssertUnwindSafe(|| notify(observer.as_ref()))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    log_error(
                        "observer_registry",
                        event,
                        &e.to_string(),
                        Some(observer.observer_name()),
                    );
                }
                Err(_) => {
                    log_error(
                        "observer_registry",
                        event,
                        "observer panicked while handling notification",
                        Some(observer.observer_name()),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Recording {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl ExecutionObserver<u32> for Recording {
        fn on_executed(&self, response: &u32, _elapsed: Duration) -> ObserverResult {
            self.log.lock().push(format!("{}:executed:{response}", self.name));
            Ok(())
        }

        fn on_error(&self, _error: &OperationError) -> ObserverResult {
            self.log.lock().push(format!("{}:error", self.name));
            Ok(())
        }

        fn on_finished(&self) -> ObserverResult {
            self.log.lock().push(format!("{}:finished", self.name));
            Ok(())
        }

        fn observer_name(&self) -> &str {
            self.name
        }
    }

    struct Faulty {
        panic: bool,
    }

    impl ExecutionObserver<u32> for Faulty {
        fn on_executed(&self, _response: &u32, _elapsed: Duration) -> ObserverResult {
            if self.panic {
                panic!("observer exploded");
            }
            Err("observer rejected result".into())
        }

        fn on_error(&self, _error: &OperationError) -> ObserverResult {
            Err("observer rejected error".into())
        }

        fn on_finished(&self) -> ObserverResult {
            if self.panic {
                panic!("observer exploded on finish");
            }
            Ok(())
        }
    }

    fn recording(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<Recording> {
        Arc::new(Recording {
            name,
            log: log.clone(),
        })
    }

    #[test]
    fn test_notifications_follow_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry: ObserverRegistry<u32> = ObserverRegistry::new();
        registry.add(recording("first", &log));
        registry.add(recording("second", &log));

        registry.notify_executed(&7, Duration::from_millis(5));
        registry.notify_error(&OperationError::failed("timeout"));
        registry.notify_finished();

        assert_eq!(
            *log.lock(),
            vec![
                "first:executed:7",
                "second:executed:7",
                "first:error",
                "second:error",
                "first:finished",
                "second:finished",
            ]
        );
    }

    #[test]
    fn test_failing_observers_are_isolated() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ObserverRegistry::with_observers(vec![
            Arc::new(Faulty { panic: false }) as Arc<dyn ExecutionObserver<u32>>,
            Arc::new(Faulty { panic: true }) as Arc<dyn ExecutionObserver<u32>>,
            recording("survivor", &log) as Arc<dyn ExecutionObserver<u32>>,
        ]);

        registry.notify_executed(&1, Duration::ZERO);
        registry.notify_error(&OperationError::failed("boom"));
        registry.notify_finished();

        assert_eq!(
            *log.lock(),
            vec!["survivor:executed:1", "survivor:error", "survivor:finished"]
        );
    }

    #[test]
    fn test_len_and_empty() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry: ObserverRegistry<u32> = ObserverRegistry::default();
        assert!(registry.is_empty());

        registry.add(recording("only", &log));
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }
}
