//! Install cycle: map, copy, clean.
//!
//! Stages run strictly in order. The first error aborts the cycle and no
//! later stage runs. A failed map stage never writes the manifest.

use std::path::{Path, PathBuf};

use crate::canonical::canonical_hash;
use crate::graph::{find_duplicates, ConsumerKind, DuplicateNodesError, GraphProvider};
use crate::policy::{CollectionInfo, ResolutionOptions};
use crate::reconcile::{plan_clean, plan_copy, CleanPlan, CopyPlan, PlanError, Reconciler};
use crate::resolver::{resolve_manifest, ResolveError};
use crate::store::{OwnershipStore, StoreError};
use crate::types::{CollectionRecord, ManifestState, Node, ResolutionWarning};

/// Error type for install cycles.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// The source collection has no name to record ownership under.
    #[error("Collection name is required. Set it in the package metadata or COLLECTION_NAME.")]
    MissingCollectionName,
    /// The destination is neither a theme nor a collection.
    #[error("{} does not appear to be a theme repository or component collection.", .0.display())]
    UnknownConsumer(PathBuf),
    /// The graph provider failed.
    #[error("Graph provider error: {0}")]
    Graph(String),
    /// The source collection contains clashing file names.
    #[error(transparent)]
    DuplicateNodes(#[from] DuplicateNodesError),
    /// Resolution was rejected.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// The manifest could not be loaded or stored.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Copy planning was rejected.
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// Applying a plan failed.
    #[error("Reconcile error: {0}")]
    Reconcile(String),
}

impl InstallError {
    /// Create a graph error from any provider error.
    pub fn from_graph<E: std::error::Error>(e: E) -> Self {
        Self::Graph(e.to_string())
    }

    /// Create a reconcile error from any reconciler error.
    pub fn from_reconcile<E: std::error::Error>(e: E) -> Self {
        Self::Reconcile(e.to_string())
    }
}

/// Result of the map stage.
#[derive(Debug, Clone)]
pub struct MapOutcome {
    /// The persisted manifest.
    pub state: ManifestState,
    /// Conflicts and overrides, in traversal order.
    pub warnings: Vec<ResolutionWarning>,
    /// What the consumer was detected as.
    pub consumer_kind: ConsumerKind,
    /// Whether the manifest differs from the one loaded.
    pub changed: bool,
    /// Source graph the manifest was resolved against.
    pub source_nodes: Vec<Node>,
}

/// Result of a full install cycle.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    /// Map stage result.
    pub map: MapOutcome,
    /// Files handed to the reconciler for copying.
    pub copy: CopyPlan,
    /// Files handed to the reconciler for removal.
    pub clean: CleanPlan,
}

/// One install of a collection into a consumer.
pub struct InstallCycle<'a, G: GraphProvider, S: OwnershipStore> {
    provider: &'a G,
    store: &'a S,
    options: ResolutionOptions,
}

impl<'a, G: GraphProvider, S: OwnershipStore> InstallCycle<'a, G, S> {
    /// Create a cycle over a graph provider and the consumer's manifest store.
    pub fn new(provider: &'a G, store: &'a S, options: ResolutionOptions) -> Self {
        Self {
            provider,
            store,
            options,
        }
    }

    /// Resolution options in effect.
    pub fn options(&self) -> &ResolutionOptions {
        &self.options
    }

    /// Resolve and persist the manifest.
    pub fn map(
        &self,
        consumer_root: &Path,
        source_root: &Path,
        collection: &CollectionInfo,
    ) -> Result<MapOutcome, InstallError> {
        let source_owner = collection
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(InstallError::MissingCollectionName)?;

        let consumer_kind = self.consumer_kind(consumer_root)?;

        let source_nodes = self
            .provider
            .collection_nodes(source_root)
            .map_err(InstallError::from_graph)?;
        find_duplicates(&source_nodes)?;

        let consumer_nodes = self
            .provider
            .consumer_nodes(consumer_root, consumer_kind)
            .map_err(InstallError::from_graph)?;

        let previous = self.store.load()?;

        let resolution = resolve_manifest(
            &previous.files,
            &consumer_nodes,
            consumer_kind.owner_tag(),
            &source_nodes,
            source_owner,
            &self.options,
        )?;
        resolution.log_warnings();

        let mut state = ManifestState {
            collections: previous.collections.clone(),
            files: resolution.files,
        };
        state.record_collection(
            source_owner,
            CollectionRecord {
                commit: collection.commit.clone(),
                version: collection.version.clone(),
            },
        );

        let changed = canonical_hash(&previous).map_err(StoreError::Serialize)?
            != canonical_hash(&state).map_err(StoreError::Serialize)?;

        self.store.persist(&state)?;

        tracing::info!(
            collection = %source_owner,
            consumer = %consumer_kind,
            files = state.files.len(),
            warnings = resolution.warnings.len(),
            changed,
            "Mapped component files"
        );

        Ok(MapOutcome {
            state,
            warnings: resolution.warnings,
            consumer_kind,
            changed,
            source_nodes,
        })
    }

    /// Run map, copy and clean in sequence.
    pub fn install<R: Reconciler>(
        &self,
        consumer_root: &Path,
        source_root: &Path,
        collection: &CollectionInfo,
        reconciler: &mut R,
    ) -> Result<InstallOutcome, InstallError> {
        let map = self.map(consumer_root, source_root, collection)?;

        let source_owner = collection
            .name
            .as_deref()
            .ok_or(InstallError::MissingCollectionName)?;

        let copy = plan_copy(
            &map.state,
            &map.source_nodes,
            source_owner,
            collection.version.as_deref(),
        )?;
        reconciler.copy(&copy).map_err(InstallError::from_reconcile)?;
        tracing::debug!(files = copy.entries.len(), "Copied component files");

        // Rescan: the consumer now contains the copied files
        let consumer_nodes = self
            .provider
            .consumer_nodes(consumer_root, map.consumer_kind)
            .map_err(InstallError::from_graph)?;
        let clean = plan_clean(&map.state.files, &consumer_nodes);
        reconciler.clean(&clean).map_err(InstallError::from_reconcile)?;
        tracing::debug!(files = clean.actions.len(), "Cleaned component files");

        Ok(InstallOutcome { map, copy, clean })
    }

    fn consumer_kind(&self, consumer_root: &Path) -> Result<ConsumerKind, InstallError> {
        self.provider
            .consumer_kind(consumer_root)
            .map_err(InstallError::from_graph)?
            .ok_or_else(|| InstallError::UnknownConsumer(consumer_root.to_path_buf()))
    }
}
