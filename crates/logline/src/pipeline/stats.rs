use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

/// Why an event did not make it to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Below the configured minimum severity
    Filtered,
    /// A field could not be serialized
    Serialize,
    /// Renderer returned an error
    Render,
    /// The line writer failed
    Write,
}

/// Per-pipeline event counters.
///
/// All operations use `Ordering::Relaxed`: the counters are observability
/// data, and `snapshot()` reads are not atomic across fields.
#[derive(Debug, Default)]
pub struct PipelineStats {
    emitted: AtomicU64,
    filtered: AtomicU64,
    serialize_failures: AtomicU64,
    render_failures: AtomicU64,
    write_failures: AtomicU64,
    reconfigurations: AtomicU64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_emitted(&self) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dropped(&self, reason: DropReason) {
        let counter = match reason {
            DropReason::Filtered => &self.filtered,
            DropReason::Serialize => &self.serialize_failures,
            DropReason::Render => &self.render_failures,
            DropReason::Write => &self.write_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconfigured(&self) {
        self.reconfigurations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            emitted: self.emitted.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            serialize_failures: self.serialize_failures.load(Ordering::Relaxed),
            render_failures: self.render_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            reconfigurations: self.reconfigurations.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub emitted: u64,
    pub filtered: u64,
    pub serialize_failures: u64,
    pub render_failures: u64,
    pub write_failures: u64,
    pub reconfigurations: u64,
}

impl StatsSnapshot {
    pub fn failed(&self) -> u64 {
        self.serialize_failures + self.render_failures + self.write_failures
    }
}
