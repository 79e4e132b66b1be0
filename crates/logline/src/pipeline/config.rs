//! Config — PipelineConfig model and environment loading.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{OutputMode, Severity};
use crate::DEFAULT_ROOT_NAMESPACE;

/// Minimum severity, case-insensitive (`debug`, `INFO`, `Warning`, ...)
pub const LOGGING_LEVEL_ENV: &str = "LOGGING_LEVEL";
/// Package root used when abbreviating logger names in human mode
pub const LOGGING_ROOT_NAMESPACE_ENV: &str = "LOGGING_ROOT_NAMESPACE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid root namespace '{0}': expected dot-separated names without whitespace")]
    InvalidRootNamespace(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub min_severity: Severity,
    pub output_mode: OutputMode,
    pub root_namespace: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Info,
            output_mode: OutputMode::Json,
            root_namespace: DEFAULT_ROOT_NAMESPACE.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn new(output_mode: OutputMode) -> Self {
        Self {
            output_mode,
            ..Default::default()
        }
    }

    pub fn with_min_severity(mut self, min_severity: Severity) -> Self {
        self.min_severity = min_severity;
        self
    }

    pub fn with_root_namespace(mut self, root_namespace: impl Into<String>) -> Self {
        self.root_namespace = root_namespace.into();
        self
    }

    /// Load configuration for `output_mode` from environment variables
    ///
    /// Never fails: a missing or unrecognized `LOGGING_LEVEL` means INFO.
    pub fn from_env(output_mode: OutputMode) -> Self {
        Self::from_vars(
            output_mode,
            std::env::var(LOGGING_LEVEL_ENV).ok(),
            std::env::var(LOGGING_ROOT_NAMESPACE_ENV).ok(),
        )
    }

    /// Same as [`from_env`](Self::from_env) with the raw variable values passed in
    pub fn from_vars(
        output_mode: OutputMode,
        level: Option<String>,
        root_namespace: Option<String>,
    ) -> Self {
        let min_severity = match level.as_deref().map(str::trim) {
            None | Some("") => Severity::Info,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::debug!(value = raw, "Unrecognized LOGGING_LEVEL, using INFO");
                Severity::Info
            }),
        };

        let root_namespace = root_namespace
            .map(|s| s.trim().trim_matches('.').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ROOT_NAMESPACE.to_string());

        Self {
            min_severity,
            output_mode,
            root_namespace,
        }
    }

    /// Reject configurations the human renderer cannot abbreviate against.
    ///
    /// Environment loading never produces an invalid config; this guards
    /// values built by hand or deserialized from a file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ns = &self.root_namespace;
        let malformed = ns.is_empty()
            || ns.chars().any(char::is_whitespace)
            || ns.split('.').any(str::is_empty);
        if malformed {
            return Err(ConfigError::InvalidRootNamespace(ns.clone()));
        }
        Ok(())
    }
}
