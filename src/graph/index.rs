//! Keyed lookup over a node list and duplicate detection.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::types::{Node, NodeKey, Partition};

/// Two or more nodes share a partition and name.
///
/// Rendered as an aggregated, human-readable listing of every clash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", render_duplicates(.duplicates))]
pub struct DuplicateNodesError {
    /// Locations of every node per duplicated key, in input order.
    pub duplicates: BTreeMap<NodeKey, Vec<PathBuf>>,
}

fn render_duplicates(duplicates: &BTreeMap<NodeKey, Vec<PathBuf>>) -> String {
    let mut lines = Vec::new();
    for (key, locations) in duplicates {
        lines.push(format!("Found duplicate files for {}:", key));
        for location in locations {
            lines.push(format!("  - {}", location.display()));
        }
    }
    lines.join("\n")
}

/// Fail if any two nodes share a partition and name.
pub fn find_duplicates(nodes: &[Node]) -> Result<(), DuplicateNodesError> {
    let mut seen: BTreeMap<NodeKey, Vec<PathBuf>> = BTreeMap::new();
    for node in nodes {
        seen.entry(node.key()).or_default().push(node.location.clone());
    }

    let duplicates: BTreeMap<_, _> = seen
        .into_iter()
        .filter(|(_, locations)| locations.len() > 1)
        .collect();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(DuplicateNodesError { duplicates })
    }
}

/// Borrowed lookup table over a node list.
///
/// Uses BTreeMap for deterministic iteration. When a key appears more than
/// once the first node wins.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex<'a> {
    nodes: &'a [Node],
    by_key: BTreeMap<NodeKey, &'a Node>,
}

impl<'a> NodeIndex<'a> {
    /// Index a node list.
    pub fn new(nodes: &'a [Node]) -> Self {
        let mut by_key = BTreeMap::new();
        for node in nodes {
            by_key.entry(node.key()).or_insert(node);
        }
        Self { nodes, by_key }
    }

    /// Look up a node by key.
    pub fn get(&self, key: &NodeKey) -> Option<&'a Node> {
        self.by_key.get(key).copied()
    }

    /// Look up a node by partition and name.
    pub fn find(&self, partition: Partition, name: &str) -> Option<&'a Node> {
        self.get(&NodeKey::new(partition, name))
    }

    /// Whether a node exists for the key.
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// The underlying nodes in input order.
    pub fn nodes(&self) -> &'a [Node] {
        self.nodes
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
