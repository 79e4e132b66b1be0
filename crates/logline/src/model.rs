use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Field names shared by the normalizer and both renderers.
pub mod keys {
    pub const TIMESTAMP: &str = "timestamp";
    pub const LEVEL: &str = "level";
    pub const LOGGER: &str = "logger";
    pub const MESSAGE: &str = "message";
    pub const CONTEXT: &str = "context";
    pub const EXTRA: &str = "extra";
    pub const CORRELATION_ID: &str = "correlation_id";

    /// Keys owned by the pipeline. They live at the top level of a record
    /// and never inside `extra`.
    pub const FIXED_FIELDS: [&str; 5] = [TIMESTAMP, LEVEL, LOGGER, MESSAGE, CONTEXT];

    pub fn is_fixed_field(key: &str) -> bool {
        FIXED_FIELDS.contains(&key)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
    #[serde(alias = "fatal")]
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Lowercase name, as written into JSON records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    /// Uppercase name, as shown in human-readable lines.
    pub fn as_upper(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Lenient parse used for configuration: anything unrecognized is INFO.
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown severity: {0}")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" | "fatal" => Ok(Severity::Critical),
            _ => Err(UnknownSeverity(s.to_string())),
        }
    }
}

/// Which renderer terminates the pipeline.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// One self-contained JSON object per line (production)
    #[default]
    Json,
    /// `HH:MM:SS [LEVEL] logger: message [extra] [id:...]` (development/testing)
    HumanReadable,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Json => "json",
            OutputMode::HumanReadable => "human_readable",
        }
    }

    /// Maps the boolean "testing" flag used by callers that only care about
    /// machine vs human output.
    pub fn from_human_flag(human: bool) -> Self {
        if human {
            OutputMode::HumanReadable
        } else {
            OutputMode::Json
        }
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "machine" => Ok(OutputMode::Json),
            "human" | "human_readable" | "pretty" | "text" => Ok(OutputMode::HumanReadable),
            other => Err(format!("Unknown output mode: {}", other)),
        }
    }
}

/// A single log call before normalization.
#[derive(Debug, Clone)]
pub struct LogEvent {
    /// Human-supplied event text
    pub message: String,
    pub level: Severity,
    /// Name of the logger handle that emitted the event (e.g. "app.services.llm")
    pub logger: String,
    /// Caller-supplied fields, in insertion order
    pub fields: Map<String, Value>,
}

impl LogEvent {
    pub fn new(level: Severity, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level,
            logger: logger.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Renderer-agnostic shape of one log event.
///
/// Serializes as
/// `{"timestamp", "level", "logger", "context", "message", "extra"?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// ISO-8601 / RFC 3339 timestamp
    pub timestamp: String,
    pub level: Severity,
    pub logger: String,
    pub context: String,
    pub message: String,
    /// Every non-fixed field, plus the bound correlation id.
    /// Never `Some` with an empty map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, Value>>,
}

impl CanonicalRecord {
    pub fn extra_field(&self, key: &str) -> Option<&Value> {
        self.extra.as_ref().and_then(|extra| extra.get(key))
    }

    pub fn correlation_id(&self) -> Option<&Value> {
        self.extra_field(keys::CORRELATION_ID)
    }
}
