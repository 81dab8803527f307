//! Structured observability hooks for matrix runs.
//!
//! This module provides:
//! - Scenario-scoped tracing spans via [`matrix_span`]
//! - Emission functions for key lifecycle events: start, sub-run finish,
//!   V3 skip, cancellation, finish
//!
//! Events are emitted at `info!` level, except cancellation (`warn!`).

use compose_matrix_domain::RunOutcome;
use tracing::{info, warn};

/// Scenario-scoped span for one matrix run.
///
/// Attach it with `tracing::Instrument` so the run future stays `Send`:
///
/// ```ignore
/// runner_future.instrument(matrix_span("ExportTests.SingleExport", "3f2a9c01d4e5")).await
/// ```
pub fn matrix_span(scenario: &str, record_digest: &str) -> tracing::Span {
    tracing::info_span!(
        "compose_matrix.run",
        scenario = %scenario,
        record = %record_digest,
    )
}

/// Emit event: matrix run started.
pub fn emit_matrix_started(scenario: &str, flags: &str, part_count: usize) {
    info!(
        event = "matrix.started",
        scenario = %scenario,
        flags = %flags,
        parts = part_count,
    );
}

/// Emit event: one sub-run finished.
pub fn emit_sub_run_finished(scenario: &str, sub_run: &str, outcome: &RunOutcome) {
    info!(
        event = "matrix.sub_run_finished",
        scenario = %scenario,
        sub_run = %sub_run,
        passed = outcome.passed,
        failed = outcome.failed,
        skipped = outcome.skipped,
        duration_ms = outcome.duration_ms,
    );
}

/// Emit event: V3 engines not exercised for this scenario.
pub fn emit_v3_skipped(scenario: &str, reason: &str) {
    info!(event = "matrix.v3_skipped", scenario = %scenario, reason = %reason);
}

/// Emit event: the runner requested cancellation (warning level).
pub fn emit_cancellation_requested(scenario: &str, cause: &str) {
    warn!(event = "matrix.cancellation_requested", scenario = %scenario, cause = %cause);
}

/// Emit event: matrix run finished with the merged outcome.
pub fn emit_matrix_finished(scenario: &str, outcome: &RunOutcome, cancelled: bool) {
    info!(
        event = "matrix.finished",
        scenario = %scenario,
        passed = outcome.passed,
        failed = outcome.failed,
        skipped = outcome.skipped,
        duration_ms = outcome.duration_ms,
        cancelled = cancelled,
    );
}
