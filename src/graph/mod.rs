//! Graph providers: where node lists come from.
//!
//! Scanning a repository into nodes happens outside this crate. Providers must
//! hand back fully materialized lists; partial graphs are not supported.

pub mod index;
pub mod memory;

use std::path::Path;

use crate::{COLLECTION_OWNER, THEME_OWNER};
use crate::types::Node;

/// What kind of repository a consumer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerKind {
    /// A theme repository.
    Theme,
    /// A component collection that re-exports components.
    Collection,
}

impl ConsumerKind {
    /// Implicit owner tag the consumer records for its own files.
    pub fn owner_tag(&self) -> &'static str {
        match self {
            Self::Theme => THEME_OWNER,
            Self::Collection => COLLECTION_OWNER,
        }
    }
}

impl std::fmt::Display for ConsumerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Theme => write!(f, "theme"),
            Self::Collection => write!(f, "collection"),
        }
    }
}

/// Trait for dependency graph sources.
///
/// Implementations must return nodes in a stable order for a given root.
pub trait GraphProvider {
    /// Error type for provider operations.
    type Error: std::error::Error + Send + Sync;

    /// Classify a repository root, or `None` if it is neither a theme nor a collection.
    fn consumer_kind(&self, root: &Path) -> Result<Option<ConsumerKind>, Self::Error>;

    /// Nodes of a theme repository.
    fn theme_nodes(&self, root: &Path) -> Result<Vec<Node>, Self::Error>;

    /// Nodes of a component collection.
    fn collection_nodes(&self, root: &Path) -> Result<Vec<Node>, Self::Error>;

    /// Nodes of a consumer, using the flavor that matches its kind.
    fn consumer_nodes(&self, root: &Path, kind: ConsumerKind) -> Result<Vec<Node>, Self::Error> {
        match kind {
            ConsumerKind::Theme => self.theme_nodes(root),
            ConsumerKind::Collection => self.collection_nodes(root),
        }
    }
}

pub use index::{find_duplicates, DuplicateNodesError, NodeIndex};
pub use memory::InMemoryGraphProvider;
