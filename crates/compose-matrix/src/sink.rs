//! Report notices and the sinks that accept them.
//!
//! A sink may refuse a notice (queue full, host shutting down). Refusal is
//! the caller's cue to cancel the run; sinks never retry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use uuid::Uuid;

/// A unique notice ID (UUID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoticeId(pub Uuid);

impl NoticeId {
    pub fn new() -> Self {
        NoticeId(Uuid::new_v4())
    }
}

impl std::fmt::Display for NoticeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for NoticeId {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to a sub-run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum NoticeKind {
    Passed,
    Failed { messages: Vec<String> },
    Skipped { reason: String },
}

/// One report event for a sub-run of a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportNotice {
    pub notice_id: NoticeId,
    pub scenario: String,
    pub sub_run: String,
    pub kind: NoticeKind,
    pub timestamp: DateTime<Utc>,
}

impl ReportNotice {
    pub fn new(scenario: &str, sub_run: &str, kind: NoticeKind) -> Self {
        Self {
            notice_id: NoticeId::new(),
            scenario: scenario.to_string(),
            sub_run: sub_run.to_string(),
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn skipped(scenario: &str, sub_run: &str, reason: &str) -> Self {
        Self::new(
            scenario,
            sub_run,
            NoticeKind::Skipped {
                reason: reason.to_string(),
            },
        )
    }

    pub fn is_skip(&self) -> bool {
        matches!(self.kind, NoticeKind::Skipped { .. })
    }
}

/// Destination for report notices, shared by concurrent runs.
pub trait ReportSink: Send + Sync {
    /// Queue a notice. Returns `false` if the sink refused it.
    fn queue_message(&self, notice: ReportNotice) -> bool;
}

/// In-memory sink with an optional capacity and a close switch.
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    notices: Mutex<Vec<ReportNotice>>,
    capacity: Option<usize>,
    closed: AtomicBool,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that refuses notices once `capacity` are held.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Refuse every notice from now on.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn notices(&self) -> Vec<ReportNotice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn skip_count(&self) -> usize {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.is_skip())
            .count()
    }

    pub fn len(&self) -> usize {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReportSink for MemoryReportSink {
    fn queue_message(&self, notice: ReportNotice) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        let mut notices = self.notices.lock().unwrap_or_else(PoisonError::into_inner);
        if self.capacity.is_some_and(|cap| notices.len() >= cap) {
            return false;
        }
        notices.push(notice);
        true
    }
}

/// Sink that forwards notices over a bounded tokio channel.
///
/// Refuses when the channel is full or the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelReportSink {
    tx: mpsc::Sender<ReportNotice>,
}

impl ChannelReportSink {
    pub fn new(tx: mpsc::Sender<ReportNotice>) -> Self {
        Self { tx }
    }

    /// Create a sink and its receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ReportNotice>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

impl ReportSink for ChannelReportSink {
    fn queue_message(&self, notice: ReportNotice) -> bool {
        self.tx.try_send(notice).is_ok()
    }
}
