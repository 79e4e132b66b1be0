//! Field normalizer — raw event + ambient context → canonical record.
//!
//! 1. `message` is the event text; a field named `message` never wins.
//! 2. `context` comes from the ambient context (default `"default"`).
//! 3. Remaining ambient keys are merged in unless the event already has them.
//! 4. Fixed keys are owned by the pipeline; every other key lands in `extra`.
//! 5. A bound, non-default `correlation_id` is written into `extra`,
//!    overriding a caller field of the same name.
//! 6. `extra` is dropped when empty.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::format::display_value;
use crate::model::{keys, CanonicalRecord, LogEvent};
use crate::{DEFAULT_CONTEXT, DEFAULT_CORRELATION_ID};

/// Current time as RFC 3339 UTC with microseconds, e.g. `2026-01-30T12:00:00.123456Z`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn normalize(event: LogEvent, ambient: &Map<String, Value>, timestamp: String) -> CanonicalRecord {
    let LogEvent {
        message,
        level,
        logger,
        mut fields,
    } = event;

    let context = ambient
        .get(keys::CONTEXT)
        .map(display_value)
        .unwrap_or_else(|| DEFAULT_CONTEXT.to_string());

    for (key, value) in ambient {
        if key == keys::CORRELATION_ID || fields.contains_key(key) {
            continue;
        }
        fields.insert(key.clone(), value.clone());
    }

    let mut extra: Map<String, Value> = fields
        .into_iter()
        .filter(|(key, _)| !keys::is_fixed_field(key))
        .collect();

    if let Some(correlation_id) = bound_correlation_id(ambient) {
        extra.insert(keys::CORRELATION_ID.to_string(), Value::String(correlation_id));
    }

    CanonicalRecord {
        timestamp,
        level,
        logger,
        context,
        message,
        extra: if extra.is_empty() { None } else { Some(extra) },
    }
}

fn bound_correlation_id(ambient: &Map<String, Value>) -> Option<String> {
    let value = ambient.get(keys::CORRELATION_ID)?;
    if value.is_null() {
        return None;
    }
    let id = display_value(value);
    if id.is_empty() || id == DEFAULT_CORRELATION_ID {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;
    use proptest::prelude::*;
    use serde_json::json;

    const TS: &str = "2026-01-30T12:00:00.000000Z";

    fn ambient(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn event(message: &str) -> LogEvent {
        LogEvent::new(Severity::Info, "api", message)
    }

    // ── Fixed fields ─────────────────────────────────────────────

    #[test]
    fn test_message_from_event_text() {
        let raw = event("API call").with_field("message", "shadow");
        let record = normalize(raw, &Map::new(), TS.to_string());
        assert_eq!(record.message, "API call");
        assert!(record.extra.is_none(), "fixed keys must not spill into extra");
    }

    #[test]
    fn test_caller_fixed_fields_superseded() {
        let raw = event("hello")
            .with_field("timestamp", "yesterday")
            .with_field("level", "critical")
            .with_field("logger", "spoofed")
            .with_field("context", "spoofed");
        let record = normalize(raw, &Map::new(), TS.to_string());

        assert_eq!(record.timestamp, TS);
        assert_eq!(record.level, Severity::Info);
        assert_eq!(record.logger, "api");
        assert_eq!(record.context, "default");
        assert!(record.extra.is_none());
    }

    #[test]
    fn test_context_from_ambient() {
        let record = normalize(event("x"), &ambient(json!({"context": "chat"})), TS.to_string());
        assert_eq!(record.context, "chat");
        assert!(record.extra.is_none(), "context is a fixed field, not extra");
    }

    // ── Extra partition ──────────────────────────────────────────

    #[test]
    fn test_custom_fields_moved_to_extra_in_order() {
        let raw = event("API call")
            .with_field("user_id", "user-123")
            .with_field("status_code", 200);
        let record = normalize(raw, &Map::new(), TS.to_string());

        let extra = record.extra.expect("extra should be present");
        assert_eq!(Value::Object(extra.clone()), json!({"user_id": "user-123", "status_code": 200}));
        let order: Vec<&str> = extra.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["user_id", "status_code"]);
    }

    #[test]
    fn test_ambient_fields_merged_event_wins() {
        let raw = event("x").with_field("user_id", "from-event");
        let ctx = ambient(json!({"user_id": "from-context", "tenant": "acme"}));
        let record = normalize(raw, &ctx, TS.to_string());

        assert_eq!(record.extra_field("user_id"), Some(&json!("from-event")));
        assert_eq!(record.extra_field("tenant"), Some(&json!("acme")));
    }

    // ── Correlation id ───────────────────────────────────────────

    #[test]
    fn test_correlation_id_injected_from_ambient() {
        let record = normalize(
            event("Processing request"),
            &ambient(json!({"correlation_id": "req-abc-123"})),
            TS.to_string(),
        );
        assert_eq!(record.correlation_id(), Some(&json!("req-abc-123")));
    }

    #[test]
    fn test_default_correlation_id_not_injected() {
        let record = normalize(
            event("x"),
            &ambient(json!({"correlation_id": "unknown"})),
            TS.to_string(),
        );
        assert!(record.extra.is_none());
    }

    #[test]
    fn test_ambient_correlation_id_overrides_field() {
        let raw = event("x").with_field("correlation_id", "from-field");
        let record = normalize(raw, &ambient(json!({"correlation_id": "from-context"})), TS.to_string());
        assert_eq!(record.correlation_id(), Some(&json!("from-context")));
    }

    #[test]
    fn test_field_correlation_id_kept_without_ambient() {
        let raw = event("x").with_field("correlation_id", "from-field");
        let record = normalize(raw, &Map::new(), TS.to_string());
        assert_eq!(record.correlation_id(), Some(&json!("from-field")));
    }

    #[test]
    fn test_now_iso_is_rfc3339() {
        let ts = now_iso();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok(), "{}", ts);
        assert!(ts.ends_with('Z'));
    }

    // ── Properties ───────────────────────────────────────────────

    fn field_key() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("timestamp".to_string()),
            Just("level".to_string()),
            Just("logger".to_string()),
            Just("message".to_string()),
            Just("context".to_string()),
            "[a-z_]{1,12}",
        ]
    }

    fn field_map() -> impl Strategy<Value = Vec<(String, i64)>> {
        prop::collection::vec((field_key(), any::<i64>()), 0..12)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_fixed_fields_never_in_extra(
            fields in field_map(),
            ctx in field_map(),
            correlation in prop::option::of("[a-z0-9-]{0,20}"),
        ) {
            let mut raw = event("msg");
            for (k, v) in fields {
                raw = raw.with_field(k, v);
            }
            let mut ambient: Map<String, Value> =
                ctx.into_iter().map(|(k, v)| (k, json!(v))).collect();
            if let Some(id) = &correlation {
                ambient.insert("correlation_id".to_string(), json!(id));
            }

            let record = normalize(raw, &ambient, TS.to_string());

            if let Some(extra) = &record.extra {
                prop_assert!(!extra.is_empty());
                for key in keys::FIXED_FIELDS {
                    prop_assert!(!extra.contains_key(key), "fixed key {} leaked into extra", key);
                }
            }
        }

        #[test]
        fn prop_extra_present_iff_non_fixed_or_correlation(
            fields in field_map(),
            correlation in prop::option::of("[a-z0-9-]{0,20}"),
        ) {
            let has_custom = fields.iter().any(|(k, _)| !keys::is_fixed_field(k));
            let has_correlation = correlation
                .as_deref()
                .map(|id| !id.is_empty() && id != "unknown")
                .unwrap_or(false);

            let mut raw = event("msg");
            for (k, v) in fields {
                raw = raw.with_field(k, v);
            }
            let mut ambient = Map::new();
            if let Some(id) = correlation {
                ambient.insert("correlation_id".to_string(), json!(id));
            }

            let record = normalize(raw, &ambient, TS.to_string());
            prop_assert_eq!(record.extra.is_some(), has_custom || has_correlation);
        }
    }
}
