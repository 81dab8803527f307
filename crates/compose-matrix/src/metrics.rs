//! Global atomic counters for matrix runs.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton, shared by every runner in the process.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    sub_runs_executed: AtomicU64,
    skip_notices: AtomicU64,
    cancellations: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            sub_runs_executed: AtomicU64::new(0),
            skip_notices: AtomicU64::new(0),
            cancellations: AtomicU64::new(0),
        }
    }

    pub fn inc_sub_runs(&self) {
        self.sub_runs_executed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "sub_runs_executed", "counter incremented");
    }

    pub fn inc_skip_notices(&self) {
        self.skip_notices.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "skip_notices", "counter incremented");
    }

    pub fn inc_cancellations(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "cancellations", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            sub_runs_executed = self.sub_runs_executed(),
            skip_notices = self.skip_notices(),
            cancellations = self.cancellations(),
        );
    }

    pub fn sub_runs_executed(&self) -> u64 {
        self.sub_runs_executed.load(Ordering::Relaxed)
    }

    pub fn skip_notices(&self) -> u64 {
        self.skip_notices.load(Ordering::Relaxed)
    }

    pub fn cancellations(&self) -> u64 {
        self.cancellations.load(Ordering::Relaxed)
    }
}
