//! compose-matrix - version matrix test orchestration
//!
//! Provides a runner that:
//! - Resolves a scenario's candidate parts (explicit or discovered)
//! - Drives V1, V2 and V3 engine sub-runs through an `EngineHarness`
//! - Reports pass/fail/skip notices to a shared `ReportSink`
//! - Merges every sub-run into one `RunOutcome`

pub mod config;
pub mod engine;
pub mod fakes;
pub mod metrics;
pub mod obs;
pub mod runner;
pub mod sink;
pub mod telemetry;

// Re-export key types
pub use compose_matrix_domain as domain;
pub use config::MatrixConfig;
pub use engine::{EngineHarness, LegacyEngine, SubRunContext, V3Variant};
pub use metrics::METRICS;
pub use obs::{
    emit_cancellation_requested, emit_matrix_finished, emit_matrix_started, emit_sub_run_finished,
    emit_v3_skipped, matrix_span,
};
pub use runner::{VersionMatrixRunner, V3_DISCOVERY_DISPLAY_NAME, V3_RUNTIME_DISPLAY_NAME};
pub use sink::{ChannelReportSink, MemoryReportSink, NoticeId, NoticeKind, ReportNotice, ReportSink};
pub use telemetry::{init_from_config, init_tracing};

/// compose-matrix version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
