#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use pacer_core::operation::{Operation, OperationContext, OperationError};
use pacer_core::registry::{ExecutionObserver, ObserverResult};

/// What a mock operation hands back on success
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub iteration: u64,
    pub operation_type: String,
}

/// Operation with scripted failures and an optional simulated duration
#[derive(Debug, Default)]
pub struct MockOperation {
    failing_iterations: HashSet<u64>,
    work: Duration,
    seen_parameters: Mutex<Vec<HashMap<String, String>>>,
}

impl MockOperation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, iterations: &[u64]) -> Self {
        self.failing_iterations = iterations.iter().copied().collect();
        self
    }

    pub fn taking(mut self, work: Duration) -> Self {
        self.work = work;
        self
    }

    pub fn seen_parameters(&self) -> Vec<HashMap<String, String>> {
        self.seen_parameters.lock().clone()
    }
}

#[async_trait]
impl Operation for MockOperation {
    type Response = MockResponse;

    async fn execute(&self, context: &OperationContext) -> Result<MockResponse, OperationError> {
        self.seen_parameters
            .lock()
            .push(context.extra_parameters().as_map().clone());

        if !self.work.is_zero() {
            tokio::time::sleep(self.work).await;
        }

        if self.failing_iterations.contains(&context.iteration()) {
            return Err(OperationError::failed(format!(
                "iteration {} rejected",
                context.iteration()
            )));
        }

        Ok(MockResponse {
            iteration: context.iteration(),
            operation_type: context.operation_type().to_string(),
        })
    }

    fn name(&self) -> &str {
        "mock_operation"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Executed { iteration: u64, elapsed: Duration },
    Error(String),
    Finished,
}

#[derive(Debug, Clone)]
pub struct ObservedEvent {
    pub observer: String,
    pub kind: EventKind,
    pub at: Instant,
}

/// Journal shared by several observers so cross-observer ordering is visible
pub type Journal = Arc<Mutex<Vec<ObservedEvent>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub struct RecordingObserver {
    name: String,
    journal: Journal,
}

impl RecordingObserver {
    pub fn new(name: &str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            journal: journal.clone(),
        })
    }

    fn record(&self, kind: EventKind) -> ObserverResult {
        self.journal.lock().push(ObservedEvent {
            observer: self.name.clone(),
            kind,
            at: Instant::now(),
        });
        Ok(())
    }
}

impl ExecutionObserver<MockResponse> for RecordingObserver {
    fn on_executed(&self, response: &MockResponse, elapsed: Duration) -> ObserverResult {
        self.record(EventKind::Executed {
            iteration: response.iteration,
            elapsed,
        })
    }

    fn on_error(&self, error: &OperationError) -> ObserverResult {
        self.record(EventKind::Error(error.to_string()))
    }

    fn on_finished(&self) -> ObserverResult {
        self.record(EventKind::Finished)
    }

    fn observer_name(&self) -> &str {
        &self.name
    }
}

/// Observer that always fails, to prove isolation
pub struct BrokenObserver;

impl ExecutionObserver<MockResponse> for BrokenObserver {
    fn on_executed(&self, _response: &MockResponse, _elapsed: Duration) -> ObserverResult {
        Err("cannot record result".into())
    }

    fn on_error(&self, _error: &OperationError) -> ObserverResult {
        panic!("cannot record error");
    }

    fn on_finished(&self) -> ObserverResult {
        Err("cannot finish".into())
    }

    fn observer_name(&self) -> &str {
        "broken"
    }
}

/// `observer:kind` labels, e.g. `a:ok:1`, `b:err`, `a:finished`
pub fn labels(journal: &Journal) -> Vec<String> {
    journal
        .lock()
        .iter()
        .map(|event| match &event.kind {
            EventKind::Executed { iteration, .. } => format!("{}:ok:{iteration}", event.observer),
            EventKind::Error(_) => format!("{}:err", event.observer),
            EventKind::Finished => format!("{}:finished", event.observer),
        })
        .collect()
}

pub fn execution_times(journal: &Journal, observer: &str) -> Vec<Instant> {
    journal
        .lock()
        .iter()
        .filter(|event| event.observer == observer)
        .filter(|event| matches!(event.kind, EventKind::Executed { .. } | EventKind::Error(_)))
        .map(|event| event.at)
        .collect()
}
