use serde::Serialize;
use serde_json::{Map, Value};

use super::manager::LogPipeline;
use super::stats::DropReason;
use crate::error::{LogError, LogResult};
use crate::model::{LogEvent, Severity};

/// Named handle onto a pipeline.
///
/// Holds no configuration of its own: every call consults the pipeline,
/// so loggers created before a reconfiguration follow it.
#[derive(Debug, Clone)]
pub struct Logger {
    name: String,
    pipeline: LogPipeline,
}

impl Logger {
    pub(crate) fn new(pipeline: LogPipeline, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pipeline,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled_for(&self, level: Severity) -> bool {
        self.pipeline.is_enabled(level)
    }

    /// Start an event at `level`; nothing is written until `emit()`.
    pub fn log(&self, level: Severity, message: impl Into<String>) -> EventBuilder<'_> {
        EventBuilder {
            logger: self,
            level,
            message: message.into(),
            fields: Map::new(),
            error: None,
        }
    }

    pub fn debug(&self, message: impl Into<String>) -> EventBuilder<'_> {
        self.log(Severity::Debug, message)
    }

    pub fn info(&self, message: impl Into<String>) -> EventBuilder<'_> {
        self.log(Severity::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> EventBuilder<'_> {
        self.log(Severity::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> EventBuilder<'_> {
        self.log(Severity::Error, message)
    }

    pub fn critical(&self, message: impl Into<String>) -> EventBuilder<'_> {
        self.log(Severity::Critical, message)
    }
}

/// One pending event with its structured fields.
///
/// A field that fails to serialize is remembered and reported by `emit()`,
/// keeping the chain free of intermediate `Result`s.
#[must_use = "events are only written by `.emit()`"]
#[derive(Debug)]
pub struct EventBuilder<'a> {
    logger: &'a Logger,
    level: Severity,
    message: String,
    fields: Map<String, Value>,
    error: Option<LogError>,
}

impl EventBuilder<'_> {
    /// Attach one structured field. A repeated key keeps the last value.
    pub fn field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if self.error.is_some() {
            return self;
        }
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                self.fields.insert(key, value);
            }
            Err(source) => self.error = Some(LogError::Serialize { key, source }),
        }
        self
    }

    pub fn fields<I, K, V>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Serialize,
    {
        fields
            .into_iter()
            .fold(self, |builder, (key, value)| builder.field(key, value))
    }

    /// Normalize, render and write the event.
    ///
    /// Events below the minimum severity return `Ok(())` without output,
    /// even when one of their fields failed to serialize.
    pub fn emit(self) -> LogResult<()> {
        let pipeline = &self.logger.pipeline;
        if !pipeline.is_enabled(self.level) {
            pipeline.record_dropped(DropReason::Filtered);
            return Ok(());
        }
        if let Some(err) = self.error {
            pipeline.record_dropped(DropReason::Serialize);
            return Err(err);
        }

        pipeline.dispatch(LogEvent {
            message: self.message,
            level: self.level,
            logger: self.logger.name.clone(),
            fields: self.fields,
        })
    }
}
