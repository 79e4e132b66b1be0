use crate::render::traits::*;

/// JSON renderer (machine mode)
///
/// Serializes the canonical record as a single-line JSON object:
/// `{"timestamp":..,"level":..,"logger":..,"context":..,"message":..,"extra":{..}}`
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for JsonRenderer {
    fn render(&self, record: &CanonicalRecord) -> LogResult<String> {
        Ok(serde_json::to_string(record)?)
    }

    fn kind(&self) -> OutputMode {
        OutputMode::Json
    }
}
