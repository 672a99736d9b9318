//! Ownership map and persisted manifest state.
//!
//! ## Determinism Guarantees
//!
//! - All maps are `BTreeMap`, so serialized keys are always sorted
//! - Struct fields are declared in alphabetical order to match the sorted
//!   layout of manifests written by earlier tooling

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::node::{NodeKey, Partition};

/// Mapping `partition → name → owner`.
///
/// Every name has exactly one owner. Absence means no collection currently
/// claims the name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipMap {
    /// Owners of asset files.
    #[serde(default)]
    pub assets: BTreeMap<String, String>,
    /// Owners of snippet files.
    #[serde(default)]
    pub snippets: BTreeMap<String, String>,
}

impl OwnershipMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries of one partition.
    pub fn partition(&self, partition: Partition) -> &BTreeMap<String, String> {
        match partition {
            Partition::Snippets => &self.snippets,
            Partition::Assets => &self.assets,
        }
    }

    fn partition_mut(&mut self, partition: Partition) -> &mut BTreeMap<String, String> {
        match partition {
            Partition::Snippets => &mut self.snippets,
            Partition::Assets => &mut self.assets,
        }
    }

    /// Owner of a name, if any.
    pub fn owner(&self, partition: Partition, name: &str) -> Option<&str> {
        self.partition(partition).get(name).map(String::as_str)
    }

    /// Owner of a key, if any.
    pub fn owner_of(&self, key: &NodeKey) -> Option<&str> {
        self.owner(key.partition, &key.name)
    }

    /// Whether the name has an owner.
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.partition(key.partition).contains_key(&key.name)
    }

    /// Assign an owner, returning the previous one.
    pub fn assign(
        &mut self,
        partition: Partition,
        name: impl Into<String>,
        owner: impl Into<String>,
    ) -> Option<String> {
        self.partition_mut(partition).insert(name.into(), owner.into())
    }

    /// Iterate all entries in canonical order (snippets, then assets).
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &str)> + '_ {
        [Partition::Snippets, Partition::Assets]
            .into_iter()
            .flat_map(move |p| {
                self.partition(p)
                    .iter()
                    .map(move |(name, owner)| (NodeKey::new(p, name.clone()), owner.as_str()))
            })
    }

    /// Keys owned by `owner`, in canonical order.
    pub fn owned_by<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = NodeKey> + 'a {
        self.iter()
            .filter(move |(_, o)| *o == owner)
            .map(|(key, _)| key)
    }

    /// Total number of entries across both partitions.
    pub fn len(&self) -> usize {
        self.snippets.len() + self.assets.len()
    }

    /// Whether both partitions are empty.
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty() && self.assets.is_empty()
    }
}

/// Installed collection metadata recorded in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRecord {
    /// Last commit of the collection's repository, `null` outside version control.
    #[serde(default)]
    pub commit: Option<String>,
    /// Package version of the collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The persisted manifest document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestState {
    /// Known collections by name.
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionRecord>,
    /// File ownership.
    #[serde(default)]
    pub files: OwnershipMap,
}

impl ManifestState {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or refresh) a collection's metadata.
    pub fn record_collection(&mut self, name: impl Into<String>, record: CollectionRecord) {
        self.collections.insert(name.into(), record);
    }

    /// Metadata of a collection, if recorded.
    pub fn collection(&self, name: &str) -> Option<&CollectionRecord> {
        self.collections.get(name)
    }
}
