//! # System Constants
//!
//! Shared constants for rate arithmetic, configuration keys and defaults.

/// Milliseconds in one minute; the numerator of every delay computation.
pub const MILLIS_PER_MINUTE: i64 = 60_000;

/// Lowest rate the controller will accept. Anything below is clamped up to this.
pub const MIN_OPERATIONS_PER_MINUTE: i32 = 1;

pub mod defaults {
    pub const OPERATIONS_PER_MINUTE: i32 = 60;
    pub const OPERATION_TYPE: &str = "standard";
    pub const EXTRA_PARAMETERS: &str = "";
    pub const STOP_TIMEOUT_MS: u64 = 30_000;
}

/// Configuration keys, shared by serde field names and the layered loader
pub mod config_keys {
    pub const OPERATIONS_PER_MINUTE: &str = "operations_per_minute";
    pub const EXTRA_PARAMETERS: &str = "extra_parameters";
    pub const OPERATION_TYPE: &str = "operation_type";
    pub const STOP_TIMEOUT_MS: &str = "stop_timeout_ms";

    /// Prefix for environment overrides, e.g. `PACER_OPERATIONS_PER_MINUTE`
    pub const ENV_PREFIX: &str = "PACER";
}

/// Extra parameter string delimiters
pub mod extra_parameters {
    pub const PAIR_SEPARATOR: char = ',';
    pub const KEY_VALUE_SEPARATOR: char = '=';
}

pub mod environment {
    pub const ENV_VAR: &str = "PACER_ENV";
    pub const FALLBACK_ENV_VAR: &str = "APP_ENV";
    pub const LOG_FORMAT_VAR: &str = "PACER_LOG_FORMAT";

    pub const DEVELOPMENT: &str = "development";
    pub const TEST: &str = "test";
    pub const PRODUCTION: &str = "production";
}
