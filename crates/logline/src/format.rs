//! Identifier and value formatters used by the human-readable renderer.
//!
//! Every function here is total: malformed input yields a fallback (usually
//! an empty string), never an error or a panic.

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};

use crate::model::keys;
use crate::{CORRELATION_ID_DISPLAY_LENGTH, MAX_VALUE_LENGTH};

const TIME_FORMAT: &str = "%H:%M:%S";

/// How a well-known extra field is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    /// `HTTP 200`
    HttpStatus,
    /// `150ms`
    Millis,
    /// `2048B`
    Bytes,
    /// `key=value`
    Plain,
}

/// Well-known extra fields, rendered first and in this order.
const PRIORITY_FIELDS: [(&str, Emphasis); 5] = [
    ("status_code", Emphasis::HttpStatus),
    ("duration_ms", Emphasis::Millis),
    ("response_size_bytes", Emphasis::Bytes),
    ("error", Emphasis::Plain),
    ("sql_query", Emphasis::Plain),
];

/// String form of a JSON value: strings without quotes, everything else as JSON text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// ISO-8601 timestamp → `HH:MM:SS`, in the timestamp's own offset.
///
/// Unparsable input falls back to the first 8 characters after the
/// date/time separator; input without a separator yields `""`.
pub fn format_timestamp(timestamp: &str) -> String {
    let timestamp = timestamp.trim();
    if timestamp.is_empty() {
        return String::new();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return dt.format(TIME_FORMAT).to_string();
    }
    if let Ok(naive) = timestamp.replacen(' ', "T", 1).parse::<NaiveDateTime>() {
        return naive.format(TIME_FORMAT).to_string();
    }

    timestamp
        .split_once('T')
        .or_else(|| timestamp.split_once(' '))
        .map(|(_, time)| time.chars().take(8).collect())
        .unwrap_or_default()
}

/// ` [id:<first 8 chars>]`, or `""` for an empty id.
pub fn format_correlation_id(correlation_id: &str) -> String {
    if correlation_id.is_empty() {
        return String::new();
    }
    let truncated: String = correlation_id
        .chars()
        .take(CORRELATION_ID_DISPLAY_LENGTH)
        .collect();
    format!(" [id:{}]", truncated)
}

/// Shorten loggers under `root`: drop the root, keep the last two segments.
///
/// `root.services.llm.session` → `llm.session`, `root.main` → `main`.
/// Names outside the root namespace are returned unchanged.
pub fn abbreviate_logger_name(logger_name: &str, root: &str) -> String {
    if root.is_empty() {
        return logger_name.to_string();
    }

    let rest = match logger_name
        .strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('.'))
    {
        Some(rest) => rest,
        None => return logger_name.to_string(),
    };

    let parts: Vec<&str> = rest.split('.').filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        [] => logger_name.to_string(),
        [only] => only.to_string(),
        [.., parent, last] => format!("{}.{}", parent, last),
    }
}

/// Cap `text` at [`MAX_VALUE_LENGTH`] characters, ending in `...` when cut.
pub fn truncate_text(text: &str) -> String {
    if text.chars().count() <= MAX_VALUE_LENGTH {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(MAX_VALUE_LENGTH - 3).collect();
    truncated.push_str("...");
    truncated
}

pub fn truncate_value(value: &Value) -> String {
    truncate_text(&display_value(value))
}

/// ` [HTTP 200, 150ms, user_id=user-123]`, or `""` for an empty map.
///
/// Priority fields come first with their unit suffix; the rest follow in
/// map order as `key=value`.
pub fn format_extra_fields(extra: &Map<String, Value>) -> String {
    if extra.is_empty() {
        return String::new();
    }

    let mut parts = Vec::with_capacity(extra.len());

    for (key, emphasis) in PRIORITY_FIELDS {
        if let Some(value) = extra.get(key) {
            let shown = truncate_value(value);
            parts.push(match emphasis {
                Emphasis::HttpStatus => format!("HTTP {}", shown),
                Emphasis::Millis => format!("{}ms", shown),
                Emphasis::Bytes => format!("{}B", shown),
                Emphasis::Plain => format!("{}={}", key, shown),
            });
        }
    }

    for (key, value) in extra {
        if is_priority_field(key) {
            continue;
        }
        parts.push(format!("{}={}", key, truncate_value(value)));
    }

    format!(" [{}]", parts.join(", "))
}

fn is_priority_field(key: &str) -> bool {
    PRIORITY_FIELDS.iter().any(|(k, _)| *k == key)
}

/// Extra fields shown in a human-readable line: everything except the
/// correlation id, which gets its own suffix.
pub fn displayable_extra(extra: &Map<String, Value>) -> Map<String, Value> {
    extra
        .iter()
        .filter(|(key, _)| key.as_str() != keys::CORRELATION_ID)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
