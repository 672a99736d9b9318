//! Manifest resolution engine.
//!
//! Computes the new ownership map from the previous one and the dependency
//! graphs of the consumer and the source collection. Pure: no I/O, inputs are
//! only borrowed.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::graph::NodeIndex;
use crate::policy::ResolutionOptions;
use crate::selection::{select_components, SelectedNodes};
use crate::types::{Node, NodeKey, NodeKind, OwnershipMap, Partition, ResolutionWarning};

/// Error type for resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A named selector matched no component in the source.
    #[error("No components found matching selector: {selector}")]
    SelectorNoMatch {
        /// The selector as given.
        selector: String,
    },
}

/// Output of one resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The new ownership map.
    pub files: OwnershipMap,
    /// Conflicts and overrides, in traversal order.
    pub warnings: Vec<ResolutionWarning>,
}

impl Resolution {
    /// Log every warning as a structured event.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warning.log();
        }
    }
}

/// Accumulator threaded through the passes of one resolution.
///
/// `files` is only ever written; decisions read `old`.
struct ResolutionPass<'r> {
    old: &'r OwnershipMap,
    selected: Option<&'r SelectedNodes>,
    files: OwnershipMap,
    warnings: Vec<ResolutionWarning>,
    visited: BTreeSet<NodeKey>,
    /// Names the conflict pass gave to the consumer.
    consumer_claimed: BTreeSet<NodeKey>,
}

/// Manifest resolver.
///
/// ## Algorithm
///
/// 1. Selection closure: restrict claimable source nodes to the selector
/// 2. Conflict pass: consumer files with no recorded owner
/// 3. Asset carry-forward: assets owned by third collections stay put
/// 4. Ownership closure: walk from consumer roots (components, entry refs)
///    breadth-first, deciding each name once
/// 5. Consumer carry-forward: consumer-owned entries no root reached
///
/// Each name's outcome depends only on the old map and the two graphs, so
/// the resulting map does not depend on traversal order.
pub struct ManifestResolver<'a> {
    consumer: NodeIndex<'a>,
    consumer_owner: &'a str,
    source: NodeIndex<'a>,
    source_owner: &'a str,
    options: &'a ResolutionOptions,
}

impl<'a> ManifestResolver<'a> {
    /// Create a resolver over the consumer and source graphs.
    ///
    /// # Arguments
    /// * `consumer_nodes` - Full node list of the repository being installed into
    /// * `consumer_owner` - Owner tag the consumer records for its own files
    /// * `source_nodes` - Full node list of the collection being installed
    /// * `source_owner` - Name of the collection being installed
    /// * `options` - Selector and conflict/override policy
    pub fn new(
        consumer_nodes: &'a [Node],
        consumer_owner: &'a str,
        source_nodes: &'a [Node],
        source_owner: &'a str,
        options: &'a ResolutionOptions,
    ) -> Self {
        Self {
            consumer: NodeIndex::new(consumer_nodes),
            consumer_owner,
            source: NodeIndex::new(source_nodes),
            source_owner,
            options,
        }
    }

    /// Resolve a new ownership map from the previous one.
    pub fn resolve(&self, old: &OwnershipMap) -> Result<Resolution, ResolveError> {
        let selected = select_components(&self.options.selector(), &self.source)?;

        let mut pass = ResolutionPass {
            old,
            selected: selected.as_ref(),
            files: OwnershipMap::new(),
            warnings: Vec::new(),
            visited: BTreeSet::new(),
            consumer_claimed: BTreeSet::new(),
        };

        self.conflict_pass(&mut pass);
        self.carry_forward_assets(&mut pass);
        self.ownership_closure(&mut pass);
        self.carry_forward_consumer_files(&mut pass);

        tracing::debug!(
            source = %self.source_owner,
            consumer = %self.consumer_owner,
            snippets = pass.files.snippets.len(),
            assets = pass.files.assets.len(),
            warnings = pass.warnings.len(),
            "Resolved manifest"
        );

        Ok(Resolution {
            files: pass.files,
            warnings: pass.warnings,
        })
    }

    /// Consumer files unknown to the old manifest.
    fn conflict_pass(&self, pass: &mut ResolutionPass<'_>) {
        for node in self.consumer.nodes() {
            if node.kind == NodeKind::Entry {
                continue;
            }
            let key = node.key();
            if pass.old.contains(&key) || pass.files.contains(&key) {
                continue;
            }

            if self.source.contains(&key) {
                if self.options.ignore_conflicts {
                    // Left for the closure, where the source may claim it
                    continue;
                }
                pass.files.assign(key.partition, key.name.clone(), self.consumer_owner);
                pass.warnings.push(ResolutionWarning::conflict(
                    &key,
                    self.consumer_owner,
                    self.source_owner,
                ));
            } else {
                pass.files.assign(key.partition, key.name.clone(), self.consumer_owner);
            }
            pass.consumer_claimed.insert(key);
        }
    }

    /// Keep assets owned by collections other than the source.
    fn carry_forward_assets(&self, pass: &mut ResolutionPass<'_>) {
        let old = pass.old;
        for node in self.consumer.nodes() {
            if node.kind != NodeKind::Asset {
                continue;
            }
            if let Some(owner) = old.owner(Partition::Assets, &node.name) {
                if owner != self.source_owner {
                    pass.files.assign(Partition::Assets, node.name.clone(), owner);
                }
            }
        }
    }

    /// Walk from every consumer root, one breadth-first sweep per root.
    fn ownership_closure(&self, pass: &mut ResolutionPass<'_>) {
        for root in self.roots() {
            let mut queue = VecDeque::from([root]);
            while let Some(key) = queue.pop_front() {
                queue.extend(self.visit(pass, &key));
            }
        }
    }

    /// Closure roots in consumer order.
    fn roots(&self) -> Vec<NodeKey> {
        let mut roots = Vec::new();
        for node in self.consumer.nodes() {
            match node.kind {
                NodeKind::Component => roots.push(NodeKey::snippet(node.name.as_str())),
                NodeKind::Entry => {
                    roots.extend(node.snippet_refs.iter().map(|name| NodeKey::snippet(name.as_str())))
                }
                NodeKind::Snippet | NodeKind::Asset => {}
            }
        }
        roots
    }

    /// Keep consumer-owned entries that no root reached.
    fn carry_forward_consumer_files(&self, pass: &mut ResolutionPass<'_>) {
        let old = pass.old;
        for node in self.consumer.nodes() {
            if node.kind == NodeKind::Entry {
                continue;
            }
            let key = node.key();
            if pass.files.contains(&key) {
                continue;
            }
            if old.owner_of(&key) == Some(self.consumer_owner) {
                pass.files.assign(key.partition, key.name, self.consumer_owner);
            }
        }
    }

    /// Decide ownership of one name and return the keys to walk next.
    fn visit(&self, pass: &mut ResolutionPass<'_>, key: &NodeKey) -> Vec<NodeKey> {
        if pass.files.contains(key) {
            // Consumer files from the conflict pass still lead to their refs
            if pass.consumer_claimed.contains(key) && pass.visited.insert(key.clone()) {
                return self.consumer_snippet_refs(key);
            }
            return Vec::new();
        }
        if !pass.visited.insert(key.clone()) {
            return Vec::new();
        }

        let old = pass.old;
        match old.owner_of(key) {
            Some(old_owner) if old_owner != self.source_owner => {
                self.keep_or_override(pass, key, old_owner)
            }
            _ => self.claim(pass, key),
        }
    }

    /// Name already owned by someone other than the source.
    fn keep_or_override(
        &self,
        pass: &mut ResolutionPass<'_>,
        key: &NodeKey,
        old_owner: &str,
    ) -> Vec<NodeKey> {
        // No longer present in the consumer: the entry lapses
        let Some(consumer_node) = self.consumer.get(key) else {
            return Vec::new();
        };

        let walked = match self.source.get(key) {
            Some(source_node) if self.options.ignore_overrides => {
                pass.files.assign(key.partition, key.name.clone(), self.source_owner);
                source_node
            }
            Some(_) => {
                pass.files.assign(key.partition, key.name.clone(), old_owner);
                let warning = if old_owner == self.consumer_owner {
                    ResolutionWarning::conflict(key, old_owner, self.source_owner)
                } else {
                    ResolutionWarning::override_kept(key, old_owner, self.source_owner)
                };
                pass.warnings.push(warning);
                consumer_node
            }
            None => {
                pass.files.assign(key.partition, key.name.clone(), old_owner);
                consumer_node
            }
        };

        match key.partition {
            Partition::Snippets => walked
                .snippet_refs
                .iter()
                .map(|name| NodeKey::snippet(name.as_str()))
                .collect(),
            Partition::Assets => Vec::new(),
        }
    }

    fn consumer_snippet_refs(&self, key: &NodeKey) -> Vec<NodeKey> {
        match (key.partition, self.consumer.get(key)) {
            (Partition::Snippets, Some(node)) => node
                .snippet_refs
                .iter()
                .map(|name| NodeKey::snippet(name.as_str()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Name unowned or already owned by the source.
    fn claim(&self, pass: &mut ResolutionPass<'_>, key: &NodeKey) -> Vec<NodeKey> {
        if let Some(selected) = pass.selected {
            if !selected.contains(key) {
                return Vec::new();
            }
        }

        // Dangling references may resolve against the consumer's own files
        let Some(node) = self.source.get(key) else {
            return Vec::new();
        };

        pass.files.assign(key.partition, key.name.clone(), self.source_owner);

        let mut next: Vec<NodeKey> = node
            .asset_refs
            .iter()
            .map(|name| NodeKey::asset(name.as_str()))
            .collect();
        if key.partition == Partition::Snippets {
            next.extend(node.snippet_refs.iter().map(|name| NodeKey::snippet(name.as_str())));
        }
        next
    }
}

/// Resolve a new ownership map in one call.
///
/// See [`ManifestResolver`] for the algorithm.
pub fn resolve_manifest(
    old: &OwnershipMap,
    consumer_nodes: &[Node],
    consumer_owner: &str,
    source_nodes: &[Node],
    source_owner: &str,
    options: &ResolutionOptions,
) -> Result<Resolution, ResolveError> {
    ManifestResolver::new(consumer_nodes, consumer_owner, source_nodes, source_owner, options)
        .resolve(old)
}
