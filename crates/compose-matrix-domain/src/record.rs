//! Flat persisted form of an invocation specification.
//!
//! An `InvocationSpec` crosses process boundaries as an `InvocationRecord`:
//! five named fields, optional fields written as explicit `null`. Readers
//! distinguish `null` (source opted out) from a missing key (corrupt record).

use crate::component::ComponentType;
use crate::error::{DomainError, Result};
use crate::flags::{EngineFlag, EngineFlags};
use crate::invocation::InvocationSpec;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

/// Persisted invocation record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InvocationRecord {
    pub parts: Option<Vec<ComponentType>>,
    pub assemblies: Option<Vec<String>>,

    /// Engine flags other than `NoCompatGoal`.
    pub composition_versions: EngineFlags,

    pub no_compat_goal: bool,
    pub invalid_configuration: bool,
}

impl InvocationRecord {
    /// Field names, in serialization order. All are required on read.
    pub const FIELDS: [&'static str; 5] = [
        "parts",
        "assemblies",
        "composition_versions",
        "no_compat_goal",
        "invalid_configuration",
    ];

    /// Canonical JSON encoding.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a record, requiring every field to be present.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value
            .as_object()
            .ok_or_else(|| DomainError::InvalidRecordField {
                field: "<root>".to_string(),
                reason: "expected a JSON object".to_string(),
            })?;

        for field in Self::FIELDS {
            if !object.contains_key(field) {
                return Err(DomainError::MissingRecordField(field.to_string()));
            }
        }

        let record: InvocationRecord = serde_json::from_value(value)?;
        if record.composition_versions.contains(EngineFlag::NoCompatGoal) {
            return Err(DomainError::InvalidRecordField {
                field: "composition_versions".to_string(),
                reason: "no_compat_goal is carried in its own field".to_string(),
            });
        }
        Ok(record)
    }

    /// SHA-256 of the canonical JSON encoding.
    pub fn digest(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(self.to_json()?.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Converts invocation specs to and from persisted records.
pub struct ConfigurationSerializer;

impl ConfigurationSerializer {
    pub fn serialize(spec: &InvocationSpec) -> InvocationRecord {
        let mut composition_versions = spec.flags.clone();
        let no_compat_goal = composition_versions.remove(EngineFlag::NoCompatGoal);

        InvocationRecord {
            parts: spec.candidate_types.clone(),
            assemblies: spec.assembly_refs.clone(),
            composition_versions,
            no_compat_goal,
            invalid_configuration: spec.invalid_configuration_expected,
        }
    }

    pub fn deserialize(record: InvocationRecord) -> InvocationSpec {
        let mut flags = record.composition_versions;
        if record.no_compat_goal {
            flags.insert(EngineFlag::NoCompatGoal);
        }

        InvocationSpec {
            candidate_types: record.parts,
            assembly_refs: record.assemblies,
            flags,
            invalid_configuration_expected: record.invalid_configuration,
        }
    }

    pub fn to_json(spec: &InvocationSpec) -> Result<String> {
        Self::serialize(spec).to_json()
    }

    pub fn from_json(json: &str) -> Result<InvocationSpec> {
        InvocationRecord::from_json(json).map(Self::deserialize)
    }

    /// Write the record for `spec` to `path`.
    pub fn persist(spec: &InvocationSpec, path: &Path) -> Result<()> {
        let json = Self::to_json(spec)?;
        std::fs::write(path, json.as_bytes())?;
        debug!(path = %path.display(), bytes = json.len(), "Persisted invocation record");
        Ok(())
    }

    /// Read a record written by [`ConfigurationSerializer::persist`].
    pub fn restore(path: &Path) -> Result<InvocationSpec> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
