// Structured logging pipeline: ambient context, normalization, rendering.

use std::sync::OnceLock;

// Core data
pub mod model;
pub mod error;
pub mod context;

// Processing
pub mod normalize;
pub mod format;
pub mod render;

// Wiring
pub mod pipeline;
pub mod bridge;

pub use bridge::PipelineLayer;
pub use error::{LogError, LogResult};
pub use model::{CanonicalRecord, LogEvent, OutputMode, Severity};
pub use pipeline::{EventBuilder, LogPipeline, Logger, PipelineConfig, PipelineState};

/// `context` value when none is bound
pub const DEFAULT_CONTEXT: &str = "default";
/// Correlation id reported by `context::correlation_id()` when none is bound
pub const DEFAULT_CORRELATION_ID: &str = "unknown";
/// Longest extra-field value shown in human mode, ellipsis included
pub const MAX_VALUE_LENGTH: usize = 50;
/// Correlation id characters shown in human mode
pub const CORRELATION_ID_DISPLAY_LENGTH: usize = 8;
/// Logger name prefix stripped in human mode unless overridden
pub const DEFAULT_ROOT_NAMESPACE: &str = "app";

static GLOBAL: OnceLock<LogPipeline> = OnceLock::new();

/// Process-wide pipeline writing to stdout, created unconfigured on first use.
pub fn global() -> &'static LogPipeline {
    GLOBAL.get_or_init(LogPipeline::new)
}

/// Configure the process-wide pipeline; see [`LogPipeline::configure`].
pub fn configure(output_mode: OutputMode) -> PipelineConfig {
    global().configure(output_mode)
}

/// Configure from a "human output" flag as application entry points pass it.
pub fn configure_human(human: bool) -> PipelineConfig {
    configure(OutputMode::from_human_flag(human))
}

pub fn configure_with(config: PipelineConfig) {
    global().configure_with(config)
}

pub fn get_logger(name: impl Into<String>) -> Logger {
    global().get_logger(name)
}

/// Merge fields into the current ambient context; see [`context::bind`].
///
/// In async code, call it inside [`context::scope`]: within a tokio runtime
/// an unscoped bind is ignored.
pub fn bind<I, K, V>(fields: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    context::bind(fields)
}

pub fn clear() {
    context::clear()
}

/// Snapshot of every key bound in the current ambient context.
pub fn read_all() -> serde_json::Map<String, serde_json::Value> {
    context::read()
}

pub fn correlation_id() -> String {
    context::correlation_id()
}
