/// Output renderers
///
/// Both renderers consume the same `CanonicalRecord` and produce exactly
/// one line of text:
///
/// - `json.rs`: schema-stable JSON object (machine mode)
/// - `human.rs`: `HH:MM:SS [LEVEL] logger: message [extra] [id:...]`

pub mod traits;
pub mod json;
pub mod human;

pub use traits::Renderer;
pub use json::JsonRenderer;
pub use human::HumanReadableRenderer;

use crate::pipeline::PipelineConfig;
use crate::model::OutputMode;

/// Build the renderer selected by `config`
pub fn renderer_for(config: &PipelineConfig) -> Box<dyn Renderer> {
    match config.output_mode {
        OutputMode::Json => Box::new(JsonRenderer::new()),
        OutputMode::HumanReadable => {
            Box::new(HumanReadableRenderer::new(config.root_namespace.clone()))
        }
    }
}
