//! # component-manifest
//!
//! Deterministic ownership resolution for component collections.
//!
//! The engine answers one question:
//!
//! > After installing a collection into a theme, **which collection owns each file**?
//!
//! ## Core Contract
//!
//! 1. Given the previous manifest and the dependency graphs of the consumer and
//!    the source collection, compute the new ownership map
//! 2. Report conflicts and overrides as structured warnings, never as failures
//! 3. Persist the manifest atomically with sorted keys
//!
//! ## Architecture
//!
//! ```text
//! GraphProvider → duplicate check → ManifestResolver → OwnershipStore
//!                                          ↓
//!                                 CopyPlan → CleanPlan → Reconciler
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same manifest + same graphs + same options → byte-identical manifest
//! - Resolving an already resolved manifest adds no new warnings
//! - Traversal order never changes the resulting map

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod policy;
pub mod graph;
pub mod selection;
pub mod resolver;
pub mod store;
pub mod canonical;
pub mod reconcile;
pub mod workflow;
pub mod telemetry;

// Re-exports
pub use types::{
    CollectionRecord, ManifestState, Node, NodeKey, NodeKind, OwnershipMap, Partition,
    ResolutionWarning, WarningKind,
};
pub use policy::{CollectionInfo, ComponentSelector, ResolutionOptions};
pub use graph::{
    find_duplicates, ConsumerKind, DuplicateNodesError, GraphProvider, InMemoryGraphProvider,
    NodeIndex,
};
pub use selection::{select_components, SelectedNodes};
pub use resolver::{resolve_manifest, ManifestResolver, Resolution, ResolveError};
pub use store::{InMemoryOwnershipStore, JsonFileStore, OwnershipStore, StoreError};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};
pub use reconcile::{
    plan_clean, plan_copy, CleanAction, CleanPlan, CopyEntry, CopyPlan, PlanError, Reconciler,
};
pub use workflow::{InstallCycle, InstallError, InstallOutcome, MapOutcome};
pub use telemetry::{init_tracing, LogFormat};

/// File name of the manifest inside a consumer repository.
pub const MANIFEST_FILE_NAME: &str = "component.manifest.json";

/// Owner tag a theme records for its own files.
pub const THEME_OWNER: &str = "@theme";

/// Owner tag a consuming collection records for its own files.
pub const COLLECTION_OWNER: &str = "@collection";
