//! Sink configuration.
//!
//! Values are resolved in order: built-in defaults, table properties, then
//! environment overrides.

use std::collections::HashMap;

use strata_core::{Error, LogFormat, Result};

use crate::distribution::{DistributionMode, WRITE_DISTRIBUTION_MODE};

/// Environment override for the distribution mode.
pub const ENV_DISTRIBUTION_MODE: &str = "STRATA_DISTRIBUTION_MODE";
/// Environment override for the writer parallelism.
pub const ENV_WRITE_PARALLELISM: &str = "STRATA_WRITE_PARALLELISM";
/// Environment override for the log format.
pub const ENV_LOG_FORMAT: &str = "STRATA_LOG_FORMAT";

/// Resolved sink settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkConfig {
    /// How records are shuffled in front of the writers.
    pub distribution_mode: DistributionMode,
    /// Writer task count; `None` inherits the input parallelism.
    pub write_parallelism: Option<usize>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl SinkConfig {
    /// Resolves configuration from table properties and the process
    /// environment.
    ///
    /// Supported environment variables:
    /// - `STRATA_DISTRIBUTION_MODE` (none|hash|range)
    /// - `STRATA_WRITE_PARALLELISM` (positive integer)
    /// - `STRATA_LOG_FORMAT` (json|pretty)
    ///
    /// # Errors
    ///
    /// Returns an error if a property or variable is present but invalid.
    pub fn resolve(properties: &HashMap<String, String>) -> Result<Self> {
        Self::resolve_with(properties, |name| std::env::var(name).ok())
    }

    /// Resolves configuration using `lookup` in place of the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a property or looked-up value is invalid.
    pub fn resolve_with<F>(properties: &HashMap<String, String>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(mode) = non_empty(properties.get(WRITE_DISTRIBUTION_MODE).cloned()) {
            config.distribution_mode = mode.parse()?;
        }

        let env = |name: &str| non_empty(lookup(name));
        if let Some(mode) = env(ENV_DISTRIBUTION_MODE) {
            config.distribution_mode = mode
                .parse()
                .map_err(|_| invalid_choice(ENV_DISTRIBUTION_MODE, "none, hash, range", &mode))?;
        }
        if let Some(parallelism) = env(ENV_WRITE_PARALLELISM) {
            config.write_parallelism =
                Some(parse_parallelism(ENV_WRITE_PARALLELISM, &parallelism)?);
        }
        if let Some(format) = env(ENV_LOG_FORMAT) {
            config.log_format = format
                .parse()
                .map_err(|_| invalid_choice(ENV_LOG_FORMAT, "json, pretty", &format))?;
        }

        Ok(config)
    }

    /// Writer task count, falling back to `input_parallelism`.
    #[must_use]
    pub fn writer_parallelism(&self, input_parallelism: usize) -> usize {
        self.write_parallelism.unwrap_or(input_parallelism)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn invalid_choice(name: &str, choices: &str, value: &str) -> Error {
    Error::invalid_input(format!("{name} must be one of: {choices} (got {value})"))
}

fn parse_parallelism(name: &str, value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(0) => Err(Error::invalid_input(format!("{name} must be greater than 0"))),
        Ok(n) => Ok(n),
        Err(e) => Err(Error::invalid_input(format!("{name} must be a usize: {e}"))),
    }
}
