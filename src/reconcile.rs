//! Copy and clean plans derived from a resolved manifest.
//!
//! Plans are data. A [`Reconciler`] performs the file operations; copy always
//! runs before clean.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::graph::NodeIndex;
use crate::types::{ManifestState, Node, NodeKey, NodeKind, OwnershipMap};

/// Error type for planning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The manifest has no record of the collection being copied.
    #[error("Collection {0} is not recorded in the manifest. Generate the manifest first.")]
    CollectionNotRecorded(String),
    /// The manifest was generated for a different version of the collection.
    #[error("Version mismatch: Expected {expected} but found {found}. Regenerate the manifest.")]
    VersionMismatch {
        /// Version being installed.
        expected: String,
        /// Version recorded in the manifest.
        found: String,
    },
}

/// One source file to place into the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyEntry {
    /// Partition and name of the file.
    pub key: NodeKey,
    /// Kind of the source node. Components carry their setup and test folders.
    pub kind: NodeKind,
    /// Location in the source collection.
    pub location: PathBuf,
}

/// Files the source collection must provide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyPlan {
    /// Owner name the entries were selected by.
    pub collection: String,
    /// Entries in canonical order (snippets, then assets).
    pub entries: Vec<CopyEntry>,
}

/// One consumer file no longer backed by the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CleanAction {
    /// Remove a snippet or asset file.
    RemoveFile {
        /// Partition and name.
        key: NodeKey,
        /// Location in the consumer.
        location: PathBuf,
    },
    /// Remove a component together with its directory.
    RemoveComponent {
        /// Partition and name.
        key: NodeKey,
        /// Location of the component template in the consumer.
        location: PathBuf,
    },
}

impl CleanAction {
    /// Key of the file being removed.
    pub fn key(&self) -> &NodeKey {
        match self {
            Self::RemoveFile { key, .. } | Self::RemoveComponent { key, .. } => key,
        }
    }
}

/// Consumer files to remove.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanPlan {
    /// Removals in consumer node order.
    pub actions: Vec<CleanAction>,
}

impl CleanPlan {
    /// Whether nothing needs removing.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Plan the files `collection` must copy into the consumer.
///
/// `version` is the version being installed; it must match the one recorded
/// in the manifest when both are known.
pub fn plan_copy(
    state: &ManifestState,
    source_nodes: &[Node],
    collection: &str,
    version: Option<&str>,
) -> Result<CopyPlan, PlanError> {
    let record = state
        .collection(collection)
        .ok_or_else(|| PlanError::CollectionNotRecorded(collection.to_string()))?;

    if let (Some(expected), Some(found)) = (version, record.version.as_deref()) {
        if expected != found {
            return Err(PlanError::VersionMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
    }

    let source = NodeIndex::new(source_nodes);
    let entries = state
        .files
        .owned_by(collection)
        .filter_map(|key| {
            source.get(&key).map(|node| CopyEntry {
                kind: node.kind,
                location: node.location.clone(),
                key,
            })
        })
        .collect();

    Ok(CopyPlan {
        collection: collection.to_string(),
        entries,
    })
}

/// Plan removal of consumer files the manifest no longer lists.
///
/// Entry nodes are never removed.
pub fn plan_clean(files: &OwnershipMap, consumer_nodes: &[Node]) -> CleanPlan {
    let actions = consumer_nodes
        .iter()
        .filter(|node| node.kind != NodeKind::Entry)
        .filter(|node| !files.contains(&node.key()))
        .map(|node| {
            let key = node.key();
            let location = node.location.clone();
            match node.kind {
                NodeKind::Component => CleanAction::RemoveComponent { key, location },
                _ => CleanAction::RemoveFile { key, location },
            }
        })
        .collect();

    CleanPlan { actions }
}

/// Applies plans to the file system.
pub trait Reconciler {
    /// Error type for file operations.
    type Error: std::error::Error + Send + Sync;

    /// Copy the planned source files into the consumer.
    fn copy(&mut self, plan: &CopyPlan) -> Result<(), Self::Error>;

    /// Remove the planned consumer files.
    fn clean(&mut self, plan: &CleanPlan) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CollectionRecord, Partition};

    fn state() -> ManifestState {
        let mut state = ManifestState::new();
        state.record_collection(
            "ui-kit",
            CollectionRecord {
                commit: None,
                version: Some("1.0.0".to_string()),
            },
        );
        state.files.assign(Partition::Snippets, "hero", "ui-kit");
        state.files.assign(Partition::Snippets, "custom", "@theme");
        state.files.assign(Partition::Assets, "hero.css", "ui-kit");
        state.files.assign(Partition::Assets, "gone.css", "ui-kit");
        state
    }

    fn source() -> Vec<Node> {
        vec![
            Node::component("hero", "kit/components/hero/hero.liquid"),
            Node::asset("hero.css", "kit/components/hero/assets/hero.css"),
            Node::snippet("custom", "kit/snippets/custom.liquid"),
        ]
    }

    #[test]
    fn test_copy_plan_only_owned_and_present() {
        let plan = plan_copy(&state(), &source(), "ui-kit", Some("1.0.0")).unwrap();

        let keys: Vec<String> = plan.entries.iter().map(|e| e.key.to_string()).collect();
        assert_eq!(keys, vec!["snippets/hero", "assets/hero.css"]);
        assert_eq!(plan.entries[0].kind, NodeKind::Component);
    }

    #[test]
    fn test_copy_plan_version_mismatch() {
        let err = plan_copy(&state(), &source(), "ui-kit", Some("2.0.0")).unwrap_err();
        assert_eq!(
            err,
            PlanError::VersionMismatch {
                expected: "2.0.0".to_string(),
                found: "1.0.0".to_string(),
            }
        );
    }

    #[test]
    fn test_copy_plan_requires_record() {
        let err = plan_copy(&state(), &source(), "other-kit", None).unwrap_err();
        assert!(matches!(err, PlanError::CollectionNotRecorded(name) if name == "other-kit"));
    }

    #[test]
    fn test_clean_plan() {
        let consumer = vec![
            Node::entry("index", "templates/index.liquid"),
            Node::snippet("custom", "snippets/custom.liquid"),
            Node::snippet("stale", "snippets/stale.liquid"),
            Node::asset("hero.css", "assets/hero.css"),
            Node::asset("stale.css", "assets/stale.css"),
            Node::component("old", "components/old/old.liquid"),
        ];
        let plan = plan_clean(&state().files, &consumer);

        assert_eq!(
            plan.actions,
            vec![
                CleanAction::RemoveFile {
                    key: NodeKey::snippet("stale"),
                    location: PathBuf::from("snippets/stale.liquid"),
                },
                CleanAction::RemoveFile {
                    key: NodeKey::asset("stale.css"),
                    location: PathBuf::from("assets/stale.css"),
                },
                CleanAction::RemoveComponent {
                    key: NodeKey::snippet("old"),
                    location: PathBuf::from("components/old/old.liquid"),
                },
            ]
        );
    }
}
