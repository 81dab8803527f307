//! Version matrix orchestration.
//!
//! One `run` drives a declared scenario through every engine its flags select,
//! strictly in sequence: V1, then V2, then the V3 branch (discovery followed
//! by one runtime sub-run per discovered configuration).

use crate::config::MatrixConfig;
use crate::engine::{EngineHarness, LegacyEngine, SubRunContext, V3Variant};
use crate::metrics::METRICS;
use crate::obs::{
    emit_cancellation_requested, emit_matrix_finished, emit_matrix_started, emit_sub_run_finished,
    emit_v3_skipped, matrix_span,
};
use crate::sink::{NoticeKind, ReportNotice, ReportSink};
use compose_matrix_domain::{
    ConfigurationSerializer, DiscoveryReport, EngineFlag, InvocationSpec, RunOutcome, TestScenario,
};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

/// Display name of the V3 discovery sub-run.
pub const V3_DISCOVERY_DISPLAY_NAME: &str = "V3 composition";

/// Display name of the per-configuration V3 runtime sub-run.
pub const V3_RUNTIME_DISPLAY_NAME: &str = "V3 engine (runtime)";

/// Sub-run name carried by the V3 skip notice.
const V3_SKIP_SUB_RUN: &str = "V3";

/// Runs one scenario against every selected composition engine version.
///
/// Holds no per-run state; one runner may serve concurrent scenarios sharing
/// the same sink and cancellation signal.
pub struct VersionMatrixRunner {
    harness: Arc<dyn EngineHarness>,
    sink: Arc<dyn ReportSink>,
    cancellation: CancellationToken,
    config: MatrixConfig,
}

impl VersionMatrixRunner {
    pub fn new(
        harness: Arc<dyn EngineHarness>,
        sink: Arc<dyn ReportSink>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            harness,
            sink,
            cancellation,
            config: MatrixConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MatrixConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Execute `spec` for `scenario` and return the merged outcome.
    ///
    /// Sub-run failures are captured in the outcome; only cancellation stops
    /// the remaining steps early.
    pub async fn run(&self, scenario: &TestScenario, spec: InvocationSpec) -> RunOutcome {
        let digest = match ConfigurationSerializer::serialize(&spec).digest() {
            Ok(digest) => digest,
            Err(e) => {
                warn!(scenario = %scenario.name, error = %e, "Failed to digest invocation record");
                String::from("unknown")
            }
        };
        let short = &digest[..12.min(digest.len())];

        self.run_matrix(scenario, spec)
            .instrument(matrix_span(&scenario.name, short))
            .await
    }

    async fn run_matrix(&self, scenario: &TestScenario, mut spec: InvocationSpec) -> RunOutcome {
        if spec.resolve_candidates(&scenario.enclosing_type) {
            debug!(
                enclosing = %scenario.enclosing_type.name,
                parts = spec.parts().len(),
                "Discovered implicit parts"
            );
        }

        emit_matrix_started(&scenario.name, &spec.flags.to_string(), spec.parts().len());

        let mut summary = RunOutcome::new();

        for engine in [LegacyEngine::V1, LegacyEngine::V2] {
            let flag = match engine {
                LegacyEngine::V1 => EngineFlag::V1,
                LegacyEngine::V2 => EngineFlag::V2,
            };
            if !spec.flags.contains(flag) {
                continue;
            }
            if !self.may_proceed(engine.name(), &mut summary) {
                return self.finish(scenario, summary);
            }

            let ctx = self.context(scenario, &spec, engine.name());
            let started = Instant::now();
            let result = self.harness.run_legacy(ctx, engine).await;
            let outcome = self.complete_sub_run(scenario, engine.name(), result, started);
            summary.aggregate(outcome);
        }

        self.run_v3(scenario, &spec, &mut summary).await;
        self.finish(scenario, summary)
    }

    async fn run_v3(&self, scenario: &TestScenario, spec: &InvocationSpec, summary: &mut RunOutcome) {
        if !spec.flags.targets_v3() {
            if spec.no_compat_goal() {
                debug!("Scenario has no V3 compatibility goal");
                return;
            }

            if !self.may_proceed(V3_SKIP_SUB_RUN, summary) {
                return;
            }

            // Notice only; the skip is not a sub-run and is not counted.
            let reason = self.config.v3_skip_reason.as_str();
            emit_v3_skipped(&scenario.name, reason);
            METRICS.inc_skip_notices();

            let notice = ReportNotice::skipped(&scenario.name, V3_SKIP_SUB_RUN, reason);
            if !self.sink.queue_message(notice) {
                self.request_cancellation(&scenario.name, "report sink refused V3 skip notice");
            }
            return;
        }

        if !self.may_proceed(V3_DISCOVERY_DISPLAY_NAME, summary) {
            return;
        }

        let ctx = self.context(scenario, spec, V3_DISCOVERY_DISPLAY_NAME);
        let started = Instant::now();
        let report = match self.harness.discover(ctx).await {
            Ok(report) => report,
            Err(e) => DiscoveryReport::failed(vec![format!("{e:#}")]),
        };
        let verdict = judge_discovery(&report, spec.invalid_configuration_expected);
        let discovery_passed = !verdict.has_failures();
        let outcome =
            self.complete_sub_run(scenario, V3_DISCOVERY_DISPLAY_NAME, Ok(verdict), started);
        summary.aggregate(outcome);

        let allow_errors = spec.flags.contains(EngineFlag::V3AllowConfigWithErrors);
        if !discovery_passed || (spec.invalid_configuration_expected && !allow_errors) {
            debug!(
                discovery_passed,
                invalid_expected = spec.invalid_configuration_expected,
                "Skipping V3 configuration runs"
            );
            return;
        }

        info!(configurations = report.configurations.len(), "Running V3 configurations");

        for configuration in &report.configurations {
            if !spec.flags.contains(EngineFlag::V3SkipCodeGen) {
                // Placeholder: the codegen variant is disabled. Nothing is
                // scheduled and nothing is counted until it is re-enabled.
                debug!(
                    configuration = %configuration.name,
                    variant = V3Variant::CodeGen.display_name(),
                    "Codegen variant not scheduled"
                );
            }

            if !self.may_proceed(V3_RUNTIME_DISPLAY_NAME, summary) {
                return;
            }

            let ctx = self.context(scenario, spec, V3_RUNTIME_DISPLAY_NAME);
            let started = Instant::now();
            let result = self
                .harness
                .run_configuration(ctx, configuration, V3Variant::Runtime)
                .await;
            let outcome = self.complete_sub_run(scenario, V3_RUNTIME_DISPLAY_NAME, result, started);
            summary.aggregate(outcome);
        }
    }

    fn context<'a>(
        &'a self,
        scenario: &'a TestScenario,
        spec: &'a InvocationSpec,
        display_name: &'a str,
    ) -> SubRunContext<'a> {
        SubRunContext {
            scenario: &scenario.name,
            display_name,
            parts: spec.parts(),
            assemblies: spec.assemblies(),
            flags: &spec.flags,
            invalid_configuration_expected: spec.invalid_configuration_expected,
            cancellation: &self.cancellation,
        }
    }

    /// Check the cancellation signal before a step. Records why the step did
    /// not run when it is tripped.
    fn may_proceed(&self, step: &str, summary: &mut RunOutcome) -> bool {
        if self.cancellation.is_cancelled() {
            info!(step = %step, "Run cancelled; skipping remaining steps");
            summary.messages.push(format!("cancelled before {step}"));
            return false;
        }
        true
    }

    /// Turn a harness result into an outcome, then log and report it.
    fn complete_sub_run(
        &self,
        scenario: &TestScenario,
        display_name: &str,
        result: anyhow::Result<RunOutcome>,
        started: Instant,
    ) -> RunOutcome {
        let mut outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(sub_run = %display_name, error = %e, "Sub-run execution error");
                RunOutcome::fail(format!("{display_name}: execution error: {e:#}"))
            }
        };
        if outcome.duration_ms == 0 {
            outcome.duration_ms = started.elapsed().as_millis() as u64;
        }

        METRICS.inc_sub_runs();
        emit_sub_run_finished(&scenario.name, display_name, &outcome);

        if self.config.report_sub_runs {
            let kind = if outcome.has_failures() {
                NoticeKind::Failed {
                    messages: outcome.messages.clone(),
                }
            } else {
                NoticeKind::Passed
            };
            if !self
                .sink
                .queue_message(ReportNotice::new(&scenario.name, display_name, kind))
            {
                self.request_cancellation(&scenario.name, "report sink refused sub-run notice");
            }
        }

        outcome
    }

    fn request_cancellation(&self, scenario: &str, cause: &str) {
        METRICS.inc_cancellations();
        emit_cancellation_requested(scenario, cause);
        self.cancellation.cancel();
    }

    fn finish(&self, scenario: &TestScenario, summary: RunOutcome) -> RunOutcome {
        emit_matrix_finished(&scenario.name, &summary, self.cancellation.is_cancelled());
        summary
    }
}

/// Verdict of the V3 discovery phase.
///
/// An invalid configuration passes only when the scenario expected it; a
/// valid one passes only when it did not.
fn judge_discovery(report: &DiscoveryReport, invalid_expected: bool) -> RunOutcome {
    match (report.is_invalid(), invalid_expected) {
        (true, false) => {
            let mut outcome = RunOutcome::fail(format!(
                "{V3_DISCOVERY_DISPLAY_NAME}: configuration is invalid"
            ));
            outcome.messages.extend(report.errors.iter().cloned());
            for configuration in &report.configurations {
                outcome.messages.extend(
                    configuration
                        .errors
                        .iter()
                        .map(|e| format!("{}: {e}", configuration.name)),
                );
            }
            outcome
        }
        (false, true) => RunOutcome::fail(format!(
            "{V3_DISCOVERY_DISPLAY_NAME}: expected an invalid configuration but discovery succeeded"
        )),
        _ => RunOutcome::pass(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compose_matrix_domain::ResolvedConfiguration;

    #[test]
    fn test_judge_unexpected_failure() {
        let report = DiscoveryReport::failed(vec!["cycle between A and B".to_string()]);
        let verdict = judge_discovery(&report, false);
        assert_eq!(verdict.failed, 1);
        assert!(verdict.messages.iter().any(|m| m.contains("cycle")));
    }

    #[test]
    fn test_judge_expected_failure_passes() {
        let report = DiscoveryReport::failed(vec!["missing export".to_string()]);
        let verdict = judge_discovery(&report, true);
        assert_eq!(verdict, RunOutcome::pass());
    }

    #[test]
    fn test_judge_unexpected_success_fails() {
        let report = DiscoveryReport::succeeded(vec![ResolvedConfiguration::new("c", vec![])]);
        let verdict = judge_discovery(&report, true);
        assert_eq!(verdict.failed, 1);
    }

    #[test]
    fn test_judge_success_passes() {
        let report = DiscoveryReport::succeeded(vec![]);
        assert_eq!(judge_discovery(&report, false), RunOutcome::pass());
    }

    #[test]
    fn test_judge_lists_configuration_errors() {
        let mut config = ResolvedConfiguration::new("default", vec!["Importer".to_string()]);
        config.errors.push("no export for IService".to_string());
        let verdict = judge_discovery(&DiscoveryReport::succeeded(vec![config]), false);
        assert!(verdict
            .messages
            .iter()
            .any(|m| m == "default: no export for IService"));
    }
}
