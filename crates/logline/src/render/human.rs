use crate::format::{
    abbreviate_logger_name, display_value, displayable_extra, format_correlation_id,
    format_extra_fields, format_timestamp,
};
use crate::render::traits::*;
use crate::DEFAULT_ROOT_NAMESPACE;

/// Human-readable renderer (development/testing mode)
///
/// `HH:MM:SS [LEVEL] logger: message [key_info] [id:correlat]`
///
/// Empty components are dropped together with their separator, so a record
/// without extra fields or correlation id never shows `[]` or `[id:]`.
#[derive(Debug, Clone)]
pub struct HumanReadableRenderer {
    /// Package root stripped from logger names
    root_namespace: String,
}

impl HumanReadableRenderer {
    pub fn new(root_namespace: impl Into<String>) -> Self {
        Self {
            root_namespace: root_namespace.into(),
        }
    }

    pub fn root_namespace(&self) -> &str {
        &self.root_namespace
    }
}

impl Default for HumanReadableRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_NAMESPACE)
    }
}

impl Renderer for HumanReadableRenderer {
    fn render(&self, record: &CanonicalRecord) -> LogResult<String> {
        let time = format_timestamp(&record.timestamp);
        let logger = abbreviate_logger_name(&record.logger, &self.root_namespace);
        let message = single_line(&record.message);

        let mut parts = Vec::with_capacity(4);
        if !time.is_empty() {
            parts.push(time);
        }
        parts.push(format!("[{}]", record.level.as_upper()));
        // The colon separates logger from message; it goes when the message does
        match (logger.is_empty(), message.is_empty()) {
            (false, false) => parts.push(format!("{}: {}", logger, message)),
            (false, true) => parts.push(logger),
            (true, false) => parts.push(message),
            (true, true) => {}
        }
        let mut line = parts.join(" ");

        if let Some(extra) = &record.extra {
            line.push_str(&single_line(&format_extra_fields(&displayable_extra(extra))));
        }

        let correlation_id = record.correlation_id().map(display_value).unwrap_or_default();
        line.push_str(&single_line(&format_correlation_id(&correlation_id)));

        Ok(line)
    }

    fn kind(&self) -> OutputMode {
        OutputMode::HumanReadable
    }
}

/// Escape line breaks so one record stays one line.
fn single_line(text: &str) -> String {
    if text.contains(['\n', '\r']) {
        text.replace('\r', "\\r").replace('\n', "\\n")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;
    use serde_json::{json, Value};

    fn record(level: Severity, logger: &str, message: &str, extra: Option<Value>) -> CanonicalRecord {
        CanonicalRecord {
            timestamp: "2025-01-27T14:30:45.123456Z".to_string(),
            level,
            logger: logger.to_string(),
            context: "default".to_string(),
            message: message.to_string(),
            extra: extra.and_then(|v| v.as_object().cloned()),
        }
    }

    fn renderer() -> HumanReadableRenderer {
        HumanReadableRenderer::new("root")
    }

    #[test]
    fn test_human_renderer_complete_entry() {
        let rec = record(
            Severity::Warning,
            "root.services.llm.session",
            "LLM call completed",
            Some(json!({
                "duration_ms": 2500,
                "status_code": 200,
                "model": "gpt-4o-mini",
                "correlation_id": "complete-test-789",
            })),
        );
        let line = renderer().render(&rec).unwrap();

        assert_eq!(
            line,
            "14:30:45 [WARNING] llm.session: LLM call completed [HTTP 200, 2500ms, model=gpt-4o-mini] [id:complete]"
        );
    }

    #[test]
    fn test_human_renderer_empty_fields() {
        let rec = record(Severity::Error, "simple.logger", "Simple error message", None);
        let line = renderer().render(&rec).unwrap();

        assert_eq!(line, "14:30:45 [ERROR] simple.logger: Simple error message");
        assert!(!line.contains("[id:"));
        assert!(!line.contains("[]"));
    }

    #[test]
    fn test_human_renderer_correlation_only() {
        let rec = record(
            Severity::Info,
            "correlation.test",
            "Test correlation ID display",
            Some(json!({"correlation_id": "very-long-correlation-id-that-should-be-truncated-123456789"})),
        );
        let line = renderer().render(&rec).unwrap();

        assert!(line.ends_with("Test correlation ID display [id:very-lon]"), "{}", line);
        assert!(!line.contains("correlation_id="), "correlation id has its own suffix: {}", line);
    }

    #[test]
    fn test_human_renderer_drops_empty_components() {
        let mut rec = record(Severity::Debug, "", "", None);
        rec.timestamp = String::new();
        let line = renderer().render(&rec).unwrap();
        assert_eq!(line, "[DEBUG]");
    }

    #[test]
    fn test_human_renderer_empty_message_drops_colon() {
        let rec = record(Severity::Info, "api", "", None);
        let line = renderer().render(&rec).unwrap();
        assert_eq!(line, "14:30:45 [INFO] api");

        let rec = record(Severity::Info, "api", "", Some(json!({"status_code": 204})));
        let line = renderer().render(&rec).unwrap();
        assert_eq!(line, "14:30:45 [INFO] api [HTTP 204]");
    }

    #[test]
    fn test_human_renderer_unparsable_timestamp() {
        let mut rec = record(Severity::Info, "api", "hi", None);
        rec.timestamp = "not a timestamp".to_string();
        let line = renderer().render(&rec).unwrap();
        // fallback: text after the first space, first 8 chars
        assert_eq!(line, "a timest [INFO] api: hi");
    }

    #[test]
    fn test_human_renderer_escapes_newlines() {
        let rec = record(Severity::Info, "api", "first\nsecond", Some(json!({"note": "a\nb"})));
        let line = renderer().render(&rec).unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("first\\nsecond"));
        assert!(line.contains("note=a\\nb"));
    }

    #[test]
    fn test_human_output_is_not_json() {
        let rec = record(Severity::Info, "api", "x", Some(json!({"k": 1})));
        let line = renderer().render(&rec).unwrap();
        assert!(serde_json::from_str::<Value>(&line).is_err());
    }

    #[test]
    fn test_default_root_namespace() {
        let renderer = HumanReadableRenderer::default();
        assert_eq!(renderer.root_namespace(), crate::DEFAULT_ROOT_NAMESPACE);
        assert_eq!(renderer.kind(), OutputMode::HumanReadable);
    }
}
