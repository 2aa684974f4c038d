//! Configuration Loader
//!
//! Layered configuration loading: built-in defaults, an optional file whose
//! format follows its extension (TOML, YAML, JSON), then environment variables
//! prefixed with `PACER_`. The merged result is validated before it is returned.

use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::ExecutorConfig;
use crate::constants::{config_keys, defaults};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_prefix: String,
    /// Replaces the process environment when set; used to keep tests hermetic
    env_source: Option<config::Map<String, String>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: config_keys::ENV_PREFIX.to_string(),
            env_source: None,
        }
    }

    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn with_env_source(mut self, source: config::Map<String, String>) -> Self {
        self.env_source = Some(source);
        self
    }

    pub fn load(&self) -> Result<ExecutorConfig> {
        let mut builder = Config::builder()
            .set_default(
                config_keys::OPERATIONS_PER_MINUTE,
                i64::from(defaults::OPERATIONS_PER_MINUTE),
            )?
            .set_default(config_keys::EXTRA_PARAMETERS, defaults::EXTRA_PARAMETERS)?
            .set_default(config_keys::OPERATION_TYPE, defaults::OPERATION_TYPE)?
            .set_default(
                config_keys::STOP_TIMEOUT_MS,
                defaults::STOP_TIMEOUT_MS as i64,
            )?;

        if let Some(path) = &self.file {
            debug!(path = %path.display(), "Loading executor configuration file");
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .try_parsing(true)
                .source(self.env_source.clone()),
        );

        let config: ExecutorConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            operations_per_minute = config.operations_per_minute,
            operation_type = %config.operation_type,
            stop_timeout_ms = config.stop_timeout_ms,
            "Executor configuration loaded"
        );

        Ok(config)
    }
}
