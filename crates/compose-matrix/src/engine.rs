//! Engine harness seam.
//!
//! The composition engines themselves live outside this crate. The runner
//! reaches them only through [`EngineHarness`], one call per sub-run.

use async_trait::async_trait;
use compose_matrix_domain::{
    ComponentType, DiscoveryReport, EngineFlags, ResolvedConfiguration, RunOutcome,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Pre-V3 engine generations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LegacyEngine {
    V1,
    V2,
}

impl LegacyEngine {
    /// Display name of the sub-run.
    pub fn name(&self) -> &'static str {
        match self {
            LegacyEngine::V1 => "V1",
            LegacyEngine::V2 => "V2",
        }
    }
}

/// How a V3 configuration is exercised.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum V3Variant {
    /// Interpret the configuration at runtime.
    Runtime,

    /// Compile the configuration to code first. Never scheduled at present.
    CodeGen,
}

impl V3Variant {
    pub fn display_name(&self) -> &'static str {
        match self {
            V3Variant::Runtime => "V3 engine (runtime)",
            V3Variant::CodeGen => "V3 engine (codegen)",
        }
    }
}

/// Everything a harness needs to execute one sub-run.
#[derive(Debug, Clone, Copy)]
pub struct SubRunContext<'a> {
    /// Scenario display name.
    pub scenario: &'a str,

    /// Sub-run display name (e.g. `V2`, `V3 composition`).
    pub display_name: &'a str,

    pub parts: &'a [ComponentType],
    pub assemblies: &'a [String],
    pub flags: &'a EngineFlags,
    pub invalid_configuration_expected: bool,

    /// Shared cancellation signal. Long sub-runs should poll it.
    pub cancellation: &'a CancellationToken,
}

/// Executes scenario sub-runs against concrete composition engines.
///
/// Errors are reported as failed outcomes by the runner; they never abort
/// the matrix.
#[async_trait]
pub trait EngineHarness: Send + Sync {
    /// Run the scenario on a V1 or V2 engine.
    async fn run_legacy(
        &self,
        ctx: SubRunContext<'_>,
        engine: LegacyEngine,
    ) -> anyhow::Result<RunOutcome>;

    /// Build V3 configurations from the context's parts and assemblies.
    async fn discover(&self, ctx: SubRunContext<'_>) -> anyhow::Result<DiscoveryReport>;

    /// Run the scenario against one discovered configuration.
    async fn run_configuration(
        &self,
        ctx: SubRunContext<'_>,
        configuration: &ResolvedConfiguration,
        variant: V3Variant,
    ) -> anyhow::Result<RunOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(LegacyEngine::V1.name(), "V1");
        assert_eq!(LegacyEngine::V2.name(), "V2");
        assert_eq!(V3Variant::Runtime.display_name(), "V3 engine (runtime)");
        assert_eq!(V3Variant::CodeGen.display_name(), "V3 engine (codegen)");
    }
}
