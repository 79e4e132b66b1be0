//! Manager — the configurable pipeline and its two-state lifecycle.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::config::PipelineConfig;
use super::logger::Logger;
use super::output::{LineWriter, StdoutWriter};
use super::stats::{DropReason, PipelineStats, StatsSnapshot};
use crate::context;
use crate::error::LogResult;
use crate::model::{LogEvent, OutputMode, Severity};
use crate::normalize::{normalize, now_iso};
use crate::render::{renderer_for, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No configuration call yet; events use `PipelineConfig::default()`
    Unconfigured,
    /// At least one configuration call. There is no way back.
    Configured,
}

/// One immutable pipeline generation. A reconfiguration swaps in a new one.
struct ActivePipeline {
    state: PipelineState,
    config: PipelineConfig,
    renderer: Box<dyn Renderer>,
}

impl ActivePipeline {
    fn build(state: PipelineState, config: PipelineConfig) -> Self {
        let renderer = renderer_for(&config);
        Self {
            state,
            config,
            renderer,
        }
    }
}

struct Shared {
    active: RwLock<Arc<ActivePipeline>>,
    writer: Arc<dyn LineWriter>,
    stats: PipelineStats,
}

/// Normalizer → renderer → writer, gated by a minimum severity.
///
/// Cheap to clone; clones share configuration, writer and statistics.
/// Loggers obtained from it read the active configuration on every call,
/// so a reconfiguration applies to all of them immediately.
#[derive(Clone)]
pub struct LogPipeline {
    shared: Arc<Shared>,
}

impl LogPipeline {
    /// Unconfigured pipeline writing to stdout
    pub fn new() -> Self {
        Self::with_writer(Arc::new(StdoutWriter))
    }

    pub fn with_writer(writer: Arc<dyn LineWriter>) -> Self {
        let active = ActivePipeline::build(PipelineState::Unconfigured, PipelineConfig::default());
        Self {
            shared: Arc::new(Shared {
                active: RwLock::new(Arc::new(active)),
                writer,
                stats: PipelineStats::new(),
            }),
        }
    }

    /// Configure for `output_mode`, reading the minimum severity from `LOGGING_LEVEL`.
    ///
    /// Replaces the previous configuration entirely. Returns what was applied.
    pub fn configure(&self, output_mode: OutputMode) -> PipelineConfig {
        let config = PipelineConfig::from_env(output_mode);
        self.configure_with(config.clone());
        config
    }

    /// Apply an explicit configuration without touching the environment
    pub fn configure_with(&self, config: PipelineConfig) {
        let min_severity = config.min_severity;
        let output_mode = config.output_mode;
        let next = Arc::new(ActivePipeline::build(PipelineState::Configured, config));
        {
            let mut active = self.shared.active.write();
            *active = next;
        }
        self.shared.stats.record_reconfigured();

        // Lock released first: a bridged tracing layer may route this event
        // back through this pipeline.
        tracing::debug!(
            min_severity = %min_severity,
            output_mode = output_mode.as_str(),
            "Log pipeline configured"
        );
    }

    pub fn state(&self) -> PipelineState {
        self.active().state
    }

    pub fn config(&self) -> PipelineConfig {
        self.active().config.clone()
    }

    /// Which renderer currently terminates the pipeline
    pub fn renderer_kind(&self) -> OutputMode {
        self.active().renderer.kind()
    }

    pub fn is_enabled(&self, level: Severity) -> bool {
        level >= self.active().config.min_severity
    }

    pub fn get_logger(&self, name: impl Into<String>) -> Logger {
        Logger::new(self.clone(), name)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    pub(crate) fn record_dropped(&self, reason: DropReason) {
        self.shared.stats.record_dropped(reason);
    }

    /// Run one event through the pipeline and write it out.
    pub fn dispatch(&self, event: LogEvent) -> LogResult<()> {
        let active = self.active();
        if event.level < active.config.min_severity {
            self.record_dropped(DropReason::Filtered);
            return Ok(());
        }

        let record = normalize(event, &context::read(), now_iso());

        let line = active.renderer.render(&record).map_err(|e| {
            self.record_dropped(DropReason::Render);
            e
        })?;

        self.shared.writer.write_line(&line).map_err(|e| {
            self.record_dropped(DropReason::Write);
            e
        })?;

        self.shared.stats.record_emitted();
        Ok(())
    }

    fn active(&self) -> Arc<ActivePipeline> {
        Arc::clone(&self.shared.active.read())
    }
}

impl Default for LogPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LogPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = self.active();
        f.debug_struct("LogPipeline")
            .field("state", &active.state)
            .field("config", &active.config)
            .field("renderer", &active.renderer.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::output::MemoryWriter;
    use serde_json::Value;

    fn pipeline() -> (LogPipeline, MemoryWriter) {
        let writer = MemoryWriter::new();
        (LogPipeline::with_writer(Arc::new(writer.clone())), writer)
    }

    // ── Lifecycle ────────────────────────────────────────────────

    #[test]
    fn test_starts_unconfigured_with_defaults() {
        let (pipeline, _) = pipeline();
        assert_eq!(pipeline.state(), PipelineState::Unconfigured);
        assert_eq!(pipeline.config(), PipelineConfig::default());
        assert_eq!(pipeline.renderer_kind(), OutputMode::Json);
    }

    #[test]
    fn test_configure_with_transitions_and_replaces() {
        let (pipeline, _) = pipeline();

        pipeline.configure_with(
            PipelineConfig::new(OutputMode::HumanReadable).with_min_severity(Severity::Debug),
        );
        assert_eq!(pipeline.state(), PipelineState::Configured);
        assert_eq!(pipeline.renderer_kind(), OutputMode::HumanReadable);
        assert!(pipeline.is_enabled(Severity::Debug));

        // Second call fully replaces the first; nothing carries over
        pipeline.configure_with(PipelineConfig::new(OutputMode::Json));
        assert_eq!(pipeline.state(), PipelineState::Configured);
        assert_eq!(pipeline.renderer_kind(), OutputMode::Json);
        assert!(!pipeline.is_enabled(Severity::Debug));
        assert_eq!(pipeline.stats().reconfigurations, 2);
    }

    // ── Dispatch ─────────────────────────────────────────────────

    #[test]
    fn test_unconfigured_pipeline_emits_json() {
        let (pipeline, writer) = pipeline();
        pipeline
            .dispatch(LogEvent::new(Severity::Info, "api", "hello"))
            .unwrap();

        let lines = writer.lines();
        assert_eq!(lines.len(), 1);
        let parsed: Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["message"], "hello");
        assert_eq!(parsed["level"], "info");
    }

    #[test]
    fn test_dispatch_filters_below_minimum() {
        let (pipeline, writer) = pipeline();
        pipeline.configure_with(
            PipelineConfig::new(OutputMode::Json).with_min_severity(Severity::Error),
        );

        pipeline.dispatch(LogEvent::new(Severity::Warning, "api", "dropped")).unwrap();
        pipeline.dispatch(LogEvent::new(Severity::Critical, "api", "kept")).unwrap();

        assert_eq!(writer.len(), 1);
        let stats = pipeline.stats();
        assert_eq!(stats.filtered, 1);
        assert_eq!(stats.emitted, 1);
    }

    #[test]
    fn test_clones_share_configuration() {
        let (pipeline, writer) = pipeline();
        let other = pipeline.clone();
        other.configure_with(PipelineConfig::new(OutputMode::HumanReadable));

        assert_eq!(pipeline.renderer_kind(), OutputMode::HumanReadable);
        pipeline.dispatch(LogEvent::new(Severity::Info, "api", "shared")).unwrap();
        assert!(writer.lines()[0].contains("[INFO] api: shared"));
    }

    #[test]
    fn test_write_failure_surfaces() {
        struct Broken;
        impl LineWriter for Broken {
            fn write_line(&self, _line: &str) -> std::io::Result<()> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
        }

        let pipeline = LogPipeline::with_writer(Arc::new(Broken));
        let err = pipeline
            .dispatch(LogEvent::new(Severity::Error, "api", "lost"))
            .unwrap_err();
        assert!(matches!(err, crate::error::LogError::Write(_)));
        assert_eq!(pipeline.stats().write_failures, 1);
    }

    #[test]
    fn test_debug_output_names_state() {
        let (pipeline, _) = pipeline();
        let shown = format!("{:?}", pipeline);
        assert!(shown.contains("Unconfigured"), "{}", shown);
    }
}
