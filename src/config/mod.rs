//! # Executor Configuration
//!
//! Construction inputs for a [`ConstantRateExecutor`](crate::executor::ConstantRateExecutor).
//! Values are layered by [`ConfigLoader`]: built-in defaults, an optional file,
//! then `PACER_*` environment variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pacer_core::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().with_file("config/pacer.toml").load()?;
//! let params = config.parsed_extra_parameters();
//! println!("{} ops/min, {} extra parameters", config.operations_per_minute, params.len());
//! # Ok(())
//! # }
//! ```

pub mod extra_parameters;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::defaults;
use crate::error::{PacerError, Result};

pub use extra_parameters::ExtraParameters;
pub use loader::ConfigLoader;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Initial target rate
    pub operations_per_minute: i32,

    /// Raw `key=value,key=value` string handed to the operation
    pub extra_parameters: String,

    /// Opaque label describing the kind of operation being executed
    pub operation_type: String,

    /// How long `stop()` waits for the worker before aborting it
    pub stop_timeout_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            operations_per_minute: defaults::OPERATIONS_PER_MINUTE,
            extra_parameters: defaults::EXTRA_PARAMETERS.to_string(),
            operation_type: defaults::OPERATION_TYPE.to_string(),
            stop_timeout_ms: defaults::STOP_TIMEOUT_MS,
        }
    }
}

impl ExecutorConfig {
    pub fn with_rate(operations_per_minute: i32) -> Self {
        Self {
            operations_per_minute,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.operations_per_minute <= 0 {
            return Err(PacerError::configuration(format!(
                "operations_per_minute must be positive, got {}",
                self.operations_per_minute
            )));
        }

        if self.operation_type.trim().is_empty() {
            return Err(PacerError::configuration("operation_type must not be empty"));
        }

        if self.stop_timeout_ms == 0 {
            return Err(PacerError::configuration("stop_timeout_ms must be greater than 0"));
        }

        Ok(())
    }

    pub fn parsed_extra_parameters(&self) -> ExtraParameters {
        ExtraParameters::parse(&self.extra_parameters)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExecutorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.operations_per_minute, 60);
        assert_eq!(config.operation_type, "standard");
        assert_eq!(config.stop_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_non_positive_rate() {
        assert!(ExecutorConfig::with_rate(0).validate().is_err());
        assert!(ExecutorConfig::with_rate(-5).validate().is_err());
        assert!(ExecutorConfig::with_rate(1).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_operation_type_and_zero_timeout() {
        let config = ExecutorConfig {
            operation_type: "  ".to_string(),
            ..ExecutorConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ExecutorConfig {
            stop_timeout_ms: 0,
            ..ExecutorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: ExecutorConfig =
            serde_json::from_str(r#"{"operations_per_minute": 120}"#).unwrap();
        assert_eq!(config.operations_per_minute, 120);
        assert_eq!(config.operation_type, "standard");
        assert_eq!(config.extra_parameters, "");
    }
}
