//! Composition engine selection flags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single engine selection or sub-option flag.
///
/// Flags combine freely; a scenario may target several engine versions at once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EngineFlag {
    /// First-generation engine.
    V1,

    /// Second-generation engine.
    V2,

    /// Third-generation engine, variant A.
    V3VariantA,

    /// Third-generation engine, variant B.
    V3VariantB,

    /// Do not schedule the V3 code-generation variant.
    V3SkipCodeGen,

    /// Run V3 configurations even when discovery reported errors.
    V3AllowConfigWithErrors,

    /// The scenario has no V3 compatibility goal; do not report a V3 skip.
    NoCompatGoal,
}

impl EngineFlag {
    /// Every flag, in declaration order.
    pub const ALL: [EngineFlag; 7] = [
        EngineFlag::V1,
        EngineFlag::V2,
        EngineFlag::V3VariantA,
        EngineFlag::V3VariantB,
        EngineFlag::V3SkipCodeGen,
        EngineFlag::V3AllowConfigWithErrors,
        EngineFlag::NoCompatGoal,
    ];

    /// Flags that select the V3 engine in some form.
    pub const V3_MASK: [EngineFlag; 4] = [
        EngineFlag::V3VariantA,
        EngineFlag::V3VariantB,
        EngineFlag::V3SkipCodeGen,
        EngineFlag::V3AllowConfigWithErrors,
    ];

    /// Get the flag name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            EngineFlag::V1 => "v1",
            EngineFlag::V2 => "v2",
            EngineFlag::V3VariantA => "v3_variant_a",
            EngineFlag::V3VariantB => "v3_variant_b",
            EngineFlag::V3SkipCodeGen => "v3_skip_code_gen",
            EngineFlag::V3AllowConfigWithErrors => "v3_allow_config_with_errors",
            EngineFlag::NoCompatGoal => "no_compat_goal",
        }
    }

    /// Whether this flag belongs to the V3 mask.
    pub fn is_v3(&self) -> bool {
        Self::V3_MASK.contains(self)
    }
}

impl std::fmt::Display for EngineFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of engine flags.
///
/// Serialized as a sorted list of flag names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineFlags(BTreeSet<EngineFlag>);

impl EngineFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flag (builder style).
    pub fn with(mut self, flag: EngineFlag) -> Self {
        self.0.insert(flag);
        self
    }

    pub fn insert(&mut self, flag: EngineFlag) -> bool {
        self.0.insert(flag)
    }

    pub fn remove(&mut self, flag: EngineFlag) -> bool {
        self.0.remove(&flag)
    }

    pub fn contains(&self, flag: EngineFlag) -> bool {
        self.0.contains(&flag)
    }

    /// The subset of these flags that fall in the V3 mask.
    pub fn v3_mask(&self) -> EngineFlags {
        self.0.iter().copied().filter(EngineFlag::is_v3).collect()
    }

    /// Whether any V3 engine is selected.
    pub fn targets_v3(&self) -> bool {
        self.0.iter().any(EngineFlag::is_v3)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = EngineFlag> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<EngineFlag> for EngineFlags {
    fn from_iter<I: IntoIterator<Item = EngineFlag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[EngineFlag; N]> for EngineFlags {
    fn from(flags: [EngineFlag; N]) -> Self {
        flags.into_iter().collect()
    }
}

impl std::fmt::Display for EngineFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.0.iter().map(EngineFlag::name).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
