//! compose-matrix domain model
//!
//! Plain data and pure logic shared by the matrix runner:
//! - EngineFlags: which composition engine versions a scenario targets
//! - ComponentType + DiscoveryProbe: the candidate part tree and its walk
//! - InvocationSpec: the decision state for one declared scenario
//! - RunOutcome: mergeable pass/fail/skip summary
//! - InvocationRecord: flat persisted form of an InvocationSpec
//! - Metadata views: typed accessors over string-keyed metadata dictionaries
//!
//! Nothing here performs I/O; orchestration lives in `compose-matrix`.

pub mod component;
pub mod error;
pub mod flags;
pub mod invocation;
pub mod metadata;
pub mod outcome;
pub mod record;

pub use component::{ComponentType, DiscoveryProbe, NestedTypes};
pub use error::{DomainError, MetadataViewError, Result};
pub use flags::{EngineFlag, EngineFlags};
pub use invocation::{DiscoveryReport, InvocationSpec, ResolvedConfiguration, TestScenario};
pub use metadata::{
    DeclaredType, DispatchTableProvider, MetadataDictionary, MetadataProxy, MetadataViewProvider,
    MetadataViewShape, ShapeMember,
};
pub use outcome::{OutcomeAggregator, RunOutcome};
pub use record::{ConfigurationSerializer, InvocationRecord};

/// compose-matrix domain version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
