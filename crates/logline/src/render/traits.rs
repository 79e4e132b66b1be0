pub use crate::error::{LogError, LogResult};
pub use crate::model::{CanonicalRecord, OutputMode};

pub trait Renderer: Send + Sync {
    /// Turn a canonical record into one output line (no trailing newline)
    fn render(&self, record: &CanonicalRecord) -> LogResult<String>;
    fn kind(&self) -> OutputMode;
}
