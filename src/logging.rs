//! # Structured Logging Module
//!
//! Environment-aware structured logging for the executor and its worker loops.
//! Console output by default, JSON lines when `PACER_LOG_FORMAT=json`.

use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::constants::environment;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = std::env::var("RUST_LOG")
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let json_output = use_json_format();
        let layer = if json_output {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // Use try_init to avoid panic if global subscriber already set
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            json = json_output,
            "STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var(environment::ENV_VAR)
        .or_else(|_| std::env::var(environment::FALLBACK_ENV_VAR))
        .unwrap_or_else(|_| environment::DEVELOPMENT.to_string())
}

/// Get log level based on environment
fn get_log_level(env: &str) -> String {
    match env {
        environment::TEST => "debug".to_string(),
        environment::DEVELOPMENT => "debug".to_string(),
        environment::PRODUCTION => "info".to_string(),
        _ => "debug".to_string(),
    }
}

fn use_json_format() -> bool {
    std::env::var(environment::LOG_FORMAT_VAR)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Log structured data for executor lifecycle and rate operations
pub fn log_executor_operation(
    operation: &str,
    executor_id: &str,
    operations_per_minute: Option<i32>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        executor_id = %executor_id,
        operations_per_minute = operations_per_minute,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "EXECUTOR_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
