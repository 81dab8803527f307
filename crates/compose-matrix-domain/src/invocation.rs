//! Invocation specification and discovery results.

use crate::component::{ComponentType, DiscoveryProbe};
use crate::flags::{EngineFlag, EngineFlags};
use serde::{Deserialize, Serialize};

/// Decision state for one declared scenario.
///
/// Built once per scenario from its declaration, optionally persisted and
/// restored, and consumed by exactly one matrix run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvocationSpec {
    /// Explicit candidate parts. `None` opts out of this discovery source.
    pub candidate_types: Option<Vec<ComponentType>>,

    /// Assemblies to scan for parts. `None` opts out of this discovery source.
    pub assembly_refs: Option<Vec<String>>,

    /// Engine selection and sub-option flags.
    pub flags: EngineFlags,

    /// The scenario declares that its configuration is invalid.
    pub invalid_configuration_expected: bool,
}

impl InvocationSpec {
    /// Create a spec with only flags set; parts fall back to discovery.
    pub fn new(flags: EngineFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    pub fn with_parts(mut self, parts: Vec<ComponentType>) -> Self {
        self.candidate_types = Some(parts);
        self
    }

    pub fn with_assemblies(mut self, assemblies: Vec<String>) -> Self {
        self.assembly_refs = Some(assemblies);
        self
    }

    pub fn expecting_invalid_configuration(mut self) -> Self {
        self.invalid_configuration_expected = true;
        self
    }

    pub fn no_compat_goal(&self) -> bool {
        self.flags.contains(EngineFlag::NoCompatGoal)
    }

    /// Whether neither explicit discovery source is set.
    pub fn needs_implicit_parts(&self) -> bool {
        self.candidate_types.is_none() && self.assembly_refs.is_none()
    }

    /// Fill in candidate parts from `enclosing` when no explicit source was given.
    ///
    /// Returns `true` when the fallback was applied.
    pub fn resolve_candidates(&mut self, enclosing: &ComponentType) -> bool {
        if !self.needs_implicit_parts() {
            return false;
        }
        self.candidate_types = Some(DiscoveryProbe::discover_parts(enclosing));
        true
    }

    /// Candidate parts, or an empty slice when unset.
    pub fn parts(&self) -> &[ComponentType] {
        self.candidate_types.as_deref().unwrap_or(&[])
    }

    /// Assembly references, or an empty slice when unset.
    pub fn assemblies(&self) -> &[String] {
        self.assembly_refs.as_deref().unwrap_or(&[])
    }
}

/// A declared test scenario: its display name and the type that encloses it.
///
/// The enclosing type is the root for implicit part discovery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestScenario {
    pub name: String,
    pub enclosing_type: ComponentType,
}

impl TestScenario {
    pub fn new(name: impl Into<String>, enclosing_type: ComponentType) -> Self {
        Self {
            name: name.into(),
            enclosing_type,
        }
    }
}

/// One configuration built by the V3 discovery phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    /// Configuration label, unique within one discovery.
    pub name: String,

    /// Names of the parts composed into this configuration.
    pub parts: Vec<String>,

    /// Composition errors carried by the configuration (empty when valid).
    pub errors: Vec<String>,
}

impl ResolvedConfiguration {
    pub fn new(name: impl Into<String>, parts: Vec<String>) -> Self {
        Self {
            name: name.into(),
            parts,
            errors: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// What a V3 discovery attempt produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub configurations: Vec<ResolvedConfiguration>,

    /// Discovery-level errors. Non-empty means the configuration is invalid.
    pub errors: Vec<String>,
}

impl DiscoveryReport {
    pub fn succeeded(configurations: Vec<ResolvedConfiguration>) -> Self {
        Self {
            configurations,
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            configurations: Vec::new(),
            errors,
        }
    }

    /// Whether discovery reported an invalid configuration.
    pub fn is_invalid(&self) -> bool {
        !self.errors.is_empty() || self.configurations.iter().any(|c| !c.is_valid())
    }
}
