use thiserror::Error;

/// Failures a log call can surface to its caller.
///
/// Malformed metadata and bad configuration never show up here; they
/// degrade to defaults inside the pipeline.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Field '{key}' is not serializable: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Render failed: {0}")]
    Render(#[from] serde_json::Error),

    #[error("Write failed: {0}")]
    Write(#[from] std::io::Error),
}

pub type LogResult<T> = Result<T, LogError>;
