//! Run outcomes and their aggregation.

use serde::{Deserialize, Serialize};

/// Summary of one or more executed sub-runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunOutcome {
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,

    /// Wall-clock time spent in the sub-runs, in milliseconds.
    pub duration_ms: u64,

    /// Diagnostic messages in the order they were produced.
    pub messages: Vec<String>,
}

impl RunOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single passing result.
    pub fn pass() -> Self {
        Self {
            passed: 1,
            ..Self::default()
        }
    }

    /// A single failing result carrying `message`.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            failed: 1,
            messages: vec![message.into()],
            ..Self::default()
        }
    }

    /// A single skipped result carrying `reason`.
    pub fn skip(reason: impl Into<String>) -> Self {
        Self {
            skipped: 1,
            messages: vec![reason.into()],
            ..Self::default()
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Fold `other` into `self`. Counts add; messages append after ours.
    pub fn aggregate(&mut self, other: RunOutcome) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.duration_ms += other.duration_ms;
        self.messages.extend(other.messages);
    }

    pub fn total(&self) -> u64 {
        self.passed + self.failed + self.skipped
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// At least one result and no failures.
    pub fn succeeded(&self) -> bool {
        self.failed == 0 && self.total() > 0
    }
}

impl std::iter::Sum for RunOutcome {
    fn sum<I: Iterator<Item = RunOutcome>>(iter: I) -> Self {
        iter.fold(RunOutcome::default(), OutcomeAggregator::merge)
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} skipped ({} ms)",
            self.passed, self.failed, self.skipped, self.duration_ms
        )
    }
}

/// Merges outcomes from independent sub-runs.
pub struct OutcomeAggregator;

impl OutcomeAggregator {
    /// Merge two outcomes. Associative; commutative on counts. Messages keep
    /// merge order (`a` first).
    pub fn merge(a: RunOutcome, b: RunOutcome) -> RunOutcome {
        let mut merged = a;
        merged.aggregate(b);
        merged
    }
}
