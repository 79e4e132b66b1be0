//! Bridge — forwards `tracing` events into a [`LogPipeline`].
//!
//! Lets code that already logs through `tracing` macros share the same
//! context binding, normalization and rendering as direct `Logger` calls.

use std::fmt::Debug;

use serde_json::{Map, Number, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::model::{keys, LogEvent, Severity};
use crate::pipeline::{DropReason, LogPipeline};

/// `tracing_subscriber` layer that dispatches each event through a pipeline.
///
/// The event target becomes the logger name with `::` mapped to `.`,
/// the `message` field becomes the message and every other field lands in
/// `extra`. Filtered events and failures show up only in the pipeline stats.
#[derive(Debug, Clone)]
pub struct PipelineLayer {
    pipeline: LogPipeline,
}

impl PipelineLayer {
    pub fn new(pipeline: LogPipeline) -> Self {
        Self { pipeline }
    }
}

pub fn severity_for(level: &Level) -> Severity {
    match *level {
        Level::ERROR => Severity::Error,
        Level::WARN => Severity::Warning,
        Level::INFO => Severity::Info,
        _ => Severity::Debug,
    }
}

impl<S: Subscriber> Layer<S> for PipelineLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = severity_for(meta.level());
        if !self.pipeline.is_enabled(level) {
            self.pipeline.record_dropped(DropReason::Filtered);
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        // Render and write failures are counted by dispatch; a layer has
        // no caller to return them to
        let _ = self.pipeline.dispatch(LogEvent {
            message: visitor.message.unwrap_or_default(),
            level,
            logger: meta.target().replace("::", "."),
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == keys::MESSAGE {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON number form
        let value = Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.insert(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.insert(field, Value::String(format!("{:?}", value)));
    }
}
