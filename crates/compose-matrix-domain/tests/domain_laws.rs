//! Algebraic laws for outcome merging and invocation record round trips.

use compose_matrix_domain::{
    ComponentType, ConfigurationSerializer, EngineFlag, EngineFlags, InvocationSpec,
    OutcomeAggregator, RunOutcome,
};
use proptest::prelude::*;

fn outcome_strategy() -> impl Strategy<Value = RunOutcome> {
    (
        0u64..1_000,
        0u64..1_000,
        0u64..1_000,
        0u64..100_000,
        prop::collection::vec("[a-z ]{0,12}", 0..4),
    )
        .prop_map(|(passed, failed, skipped, duration_ms, messages)| RunOutcome {
            passed,
            failed,
            skipped,
            duration_ms,
            messages,
        })
}

fn component_strategy() -> impl Strategy<Value = ComponentType> {
    let leaf = ("[A-Z][a-zA-Z]{0,8}", any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(name, is_abstract, is_sealed, is_interface)| ComponentType {
            name,
            is_abstract,
            is_sealed,
            is_interface,
            nested: Vec::new(),
        },
    );
    leaf.prop_recursive(3, 12, 3, |inner| {
        ("[A-Z][a-zA-Z]{0,8}", prop::collection::vec(inner, 0..3)).prop_map(|(name, nested)| {
            ComponentType {
                nested,
                ..ComponentType::class(name)
            }
        })
    })
}

fn flags_strategy() -> impl Strategy<Value = EngineFlags> {
    prop::collection::vec(prop::sample::select(EngineFlag::ALL.to_vec()), 0..7)
        .prop_map(|flags| flags.into_iter().collect())
}

fn spec_strategy() -> impl Strategy<Value = InvocationSpec> {
    (
        prop::option::of(prop::collection::vec(component_strategy(), 0..4)),
        prop::option::of(prop::collection::vec("[A-Za-z.]{1,16}", 0..4)),
        flags_strategy(),
        any::<bool>(),
    )
        .prop_map(|(candidate_types, assembly_refs, flags, invalid)| InvocationSpec {
            candidate_types,
            assembly_refs,
            flags,
            invalid_configuration_expected: invalid,
        })
}

proptest! {
    #[test]
    fn prop_merge_is_associative(a in outcome_strategy(), b in outcome_strategy(), c in outcome_strategy()) {
        let left = OutcomeAggregator::merge(OutcomeAggregator::merge(a.clone(), b.clone()), c.clone());
        let right = OutcomeAggregator::merge(a, OutcomeAggregator::merge(b, c));
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_merge_counts_commute(a in outcome_strategy(), b in outcome_strategy()) {
        let ab = OutcomeAggregator::merge(a.clone(), b.clone());
        let ba = OutcomeAggregator::merge(b, a);
        prop_assert_eq!(ab.passed, ba.passed);
        prop_assert_eq!(ab.failed, ba.failed);
        prop_assert_eq!(ab.skipped, ba.skipped);
        prop_assert_eq!(ab.duration_ms, ba.duration_ms);
    }

    #[test]
    fn prop_record_round_trip(spec in spec_strategy()) {
        let restored = ConfigurationSerializer::deserialize(ConfigurationSerializer::serialize(&spec));
        prop_assert_eq!(restored, spec);
    }

    #[test]
    fn prop_json_round_trip(spec in spec_strategy()) {
        let json = ConfigurationSerializer::to_json(&spec).unwrap();
        let restored = ConfigurationSerializer::from_json(&json).unwrap();
        prop_assert_eq!(ConfigurationSerializer::to_json(&restored).unwrap(), json);
        prop_assert_eq!(restored, spec);
    }
}

#[test]
fn test_round_trip_with_absent_sources() {
    let spec = InvocationSpec::default();
    let json = ConfigurationSerializer::to_json(&spec).expect("serialize failed");
    let restored = ConfigurationSerializer::from_json(&json).expect("deserialize failed");
    assert_eq!(restored, spec);
    assert!(restored.candidate_types.is_none());
    assert!(restored.assembly_refs.is_none());
}

#[test]
fn test_persist_and_restore_through_file() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let path = dir.path().join("invocation.json");

    let spec = InvocationSpec::new(EngineFlags::from([
        EngineFlag::V2,
        EngineFlag::V3VariantB,
        EngineFlag::V3SkipCodeGen,
    ]))
    .with_parts(vec![ComponentType::class("Exporter")])
    .expecting_invalid_configuration();

    ConfigurationSerializer::persist(&spec, &path).expect("persist failed");
    let restored = ConfigurationSerializer::restore(&path).expect("restore failed");
    assert_eq!(restored, spec);
}

#[test]
fn test_restore_missing_file_errors() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let result = ConfigurationSerializer::restore(&dir.path().join("absent.json"));
    assert!(result.is_err());
}
