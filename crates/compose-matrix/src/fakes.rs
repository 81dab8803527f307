//! In-memory fakes for the engine harness (testing only)
//!
//! `ScriptedHarness` returns preconfigured outcomes and records every call,
//! so tests can assert which sub-runs executed and in what order.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use compose_matrix_domain::{DiscoveryReport, ResolvedConfiguration, RunOutcome};

use crate::engine::{EngineHarness, LegacyEngine, SubRunContext, V3Variant};

/// One recorded harness call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessCall {
    /// Sub-run display name as passed by the runner.
    pub display_name: String,

    /// Configuration name for V3 configuration runs.
    pub configuration: Option<String>,

    /// Names of the parts the sub-run received.
    pub parts: Vec<String>,
}

#[derive(Debug, Clone)]
enum Scripted<T> {
    Ok(T),
    Err(String),
}

impl<T: Clone> Scripted<T> {
    fn get(&self) -> anyhow::Result<T> {
        match self {
            Scripted::Ok(value) => Ok(value.clone()),
            Scripted::Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}

/// Harness returning scripted results.
///
/// Unscripted legacy and configuration runs pass; unscripted discovery
/// succeeds with a single valid configuration named `default`.
#[derive(Debug)]
pub struct ScriptedHarness {
    legacy: HashMap<LegacyEngine, Scripted<RunOutcome>>,
    discovery: Scripted<DiscoveryReport>,
    configurations: HashMap<String, Scripted<RunOutcome>>,
    cancel_after: Option<String>,
    calls: Mutex<Vec<HarnessCall>>,
}

impl Default for ScriptedHarness {
    fn default() -> Self {
        Self {
            legacy: HashMap::new(),
            discovery: Scripted::Ok(DiscoveryReport::succeeded(vec![
                ResolvedConfiguration::new("default", Vec::new()),
            ])),
            configurations: HashMap::new(),
            cancel_after: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedHarness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_legacy(mut self, engine: LegacyEngine, outcome: RunOutcome) -> Self {
        self.legacy.insert(engine, Scripted::Ok(outcome));
        self
    }

    pub fn with_legacy_error(mut self, engine: LegacyEngine, message: impl Into<String>) -> Self {
        self.legacy.insert(engine, Scripted::Err(message.into()));
        self
    }

    pub fn with_discovery(mut self, report: DiscoveryReport) -> Self {
        self.discovery = Scripted::Ok(report);
        self
    }

    pub fn with_discovery_error(mut self, message: impl Into<String>) -> Self {
        self.discovery = Scripted::Err(message.into());
        self
    }

    pub fn with_configuration_outcome(
        mut self,
        configuration: impl Into<String>,
        outcome: RunOutcome,
    ) -> Self {
        self.configurations
            .insert(configuration.into(), Scripted::Ok(outcome));
        self
    }

    pub fn with_configuration_error(
        mut self,
        configuration: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.configurations
            .insert(configuration.into(), Scripted::Err(message.into()));
        self
    }

    /// Trip the shared cancellation signal after the named sub-run executes.
    pub fn cancel_after(mut self, display_name: impl Into<String>) -> Self {
        self.cancel_after = Some(display_name.into());
        self
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<HarnessCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Display names of every call so far, in order.
    pub fn call_names(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.display_name).collect()
    }

    fn record(&self, ctx: &SubRunContext<'_>, configuration: Option<&str>) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(HarnessCall {
                display_name: ctx.display_name.to_string(),
                configuration: configuration.map(str::to_string),
                parts: ctx.parts.iter().map(|p| p.name.clone()).collect(),
            });

        if self.cancel_after.as_deref() == Some(ctx.display_name) {
            ctx.cancellation.cancel();
        }
    }
}

#[async_trait]
impl EngineHarness for ScriptedHarness {
    async fn run_legacy(
        &self,
        ctx: SubRunContext<'_>,
        engine: LegacyEngine,
    ) -> anyhow::Result<RunOutcome> {
        self.record(&ctx, None);
        match self.legacy.get(&engine) {
            Some(scripted) => scripted.get(),
            None => Ok(RunOutcome::pass()),
        }
    }

    async fn discover(&self, ctx: SubRunContext<'_>) -> anyhow::Result<DiscoveryReport> {
        self.record(&ctx, None);
        self.discovery.get()
    }

    async fn run_configuration(
        &self,
        ctx: SubRunContext<'_>,
        configuration: &ResolvedConfiguration,
        _variant: V3Variant,
    ) -> anyhow::Result<RunOutcome> {
        self.record(&ctx, Some(&configuration.name));
        match self.configurations.get(&configuration.name) {
            Some(scripted) => scripted.get(),
            None => Ok(RunOutcome::pass()),
        }
    }
}
