pub mod config;
pub mod logger;
pub mod manager;
pub mod output;
pub mod stats;

pub use config::{ConfigError, PipelineConfig, LOGGING_LEVEL_ENV, LOGGING_ROOT_NAMESPACE_ENV};
pub use logger::{EventBuilder, Logger};
pub use manager::{LogPipeline, PipelineState};
pub use output::{LineWriter, MemoryWriter, StdoutWriter};
pub use stats::{DropReason, PipelineStats, StatsSnapshot};
