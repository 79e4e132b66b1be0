//! Output — where rendered lines go.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Destination for rendered lines. One call writes one newline-terminated line.
pub trait LineWriter: Send + Sync {
    fn write_line(&self, line: &str) -> io::Result<()>;
}

/// Standard output. Holds the stdout lock for the whole line so concurrent
/// emitters never interleave inside a line.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutWriter;

impl LineWriter for StdoutWriter {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(line.as_bytes())?;
        handle.write_all(b"\n")?;
        handle.flush()
    }
}

/// In-memory capture of every written line.
///
/// Clones share the same buffer, so a test can keep one handle and give
/// another to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Drain the captured lines
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl LineWriter for MemoryWriter {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.lines.lock().push(line.to_string());
        Ok(())
    }
}
