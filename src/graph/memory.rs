//! In-memory graph provider for testing.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::Node;
use super::{ConsumerKind, GraphProvider};

/// Error type for the in-memory provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// No repository registered at this root.
    #[error("Repository not found: {}", .0.display())]
    RepositoryNotFound(PathBuf),
}

#[derive(Debug, Clone)]
struct Repository {
    kind: ConsumerKind,
    nodes: Vec<Node>,
}

/// In-memory graph provider for testing.
///
/// Repositories are registered by root path. Uses BTreeMap for deterministic
/// iteration order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraphProvider {
    repositories: BTreeMap<PathBuf, Repository>,
}

impl InMemoryGraphProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a theme repository.
    pub fn add_theme(&mut self, root: impl Into<PathBuf>, nodes: Vec<Node>) {
        self.repositories.insert(
            root.into(),
            Repository {
                kind: ConsumerKind::Theme,
                nodes,
            },
        );
    }

    /// Register a component collection.
    pub fn add_collection(&mut self, root: impl Into<PathBuf>, nodes: Vec<Node>) {
        self.repositories.insert(
            root.into(),
            Repository {
                kind: ConsumerKind::Collection,
                nodes,
            },
        );
    }

    /// Number of registered repositories.
    pub fn num_repositories(&self) -> usize {
        self.repositories.len()
    }

    fn nodes(&self, root: &Path) -> Result<Vec<Node>, InMemoryError> {
        self.repositories
            .get(root)
            .map(|repo| repo.nodes.clone())
            .ok_or_else(|| InMemoryError::RepositoryNotFound(root.to_path_buf()))
    }
}

impl GraphProvider for InMemoryGraphProvider {
    type Error = InMemoryError;

    fn consumer_kind(&self, root: &Path) -> Result<Option<ConsumerKind>, Self::Error> {
        Ok(self.repositories.get(root).map(|repo| repo.kind))
    }

    fn theme_nodes(&self, root: &Path) -> Result<Vec<Node>, Self::Error> {
        self.nodes(root)
    }

    fn collection_nodes(&self, root: &Path) -> Result<Vec<Node>, Self::Error> {
        self.nodes(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_nodes() {
        let mut provider = InMemoryGraphProvider::new();
        provider.add_theme("/theme", vec![Node::entry("index", "templates/index.liquid")]);
        provider.add_collection("/kit", vec![Node::component("hero", "components/hero")]);

        assert_eq!(
            provider.consumer_kind(Path::new("/theme")).unwrap(),
            Some(ConsumerKind::Theme)
        );
        assert_eq!(
            provider.consumer_kind(Path::new("/kit")).unwrap(),
            Some(ConsumerKind::Collection)
        );
        assert_eq!(provider.consumer_kind(Path::new("/nope")).unwrap(), None);

        let nodes = provider
            .consumer_nodes(Path::new("/theme"), ConsumerKind::Theme)
            .unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "index");
    }

    #[test]
    fn test_missing_repository() {
        let provider = InMemoryGraphProvider::new();
        let err = provider.collection_nodes(Path::new("/missing")).unwrap_err();
        assert!(err.to_string().contains("/missing"));
    }

    #[test]
    fn test_owner_tags() {
        assert_eq!(ConsumerKind::Theme.owner_tag(), "@theme");
        assert_eq!(ConsumerKind::Collection.owner_tag(), "@collection");
    }
}
