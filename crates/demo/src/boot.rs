use anyhow::{anyhow, Context, Result};
use logline::{LogPipeline, OutputMode, PipelineLayer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Output format selector (`json` or `human`)
pub const LOGGING_FORMAT_ENV: &str = "LOGGING_FORMAT";

/// Route `tracing` macros through `pipeline`.
///
/// `RUST_LOG` narrows what reaches the pipeline; the pipeline's own minimum
/// severity applies on top.
pub fn init_tracing(pipeline: LogPipeline) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,demo=debug,logline=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(PipelineLayer::new(pipeline))
        .init();
}

/// Read `LOGGING_FORMAT`; unset means JSON.
pub fn output_mode_from_env() -> Result<OutputMode> {
    match std::env::var(LOGGING_FORMAT_ENV) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .parse::<OutputMode>()
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("Invalid {}", LOGGING_FORMAT_ENV)),
        _ => Ok(OutputMode::Json),
    }
}
