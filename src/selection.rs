//! Selection closure: which source nodes a component selector makes eligible.
//!
//! Membership is partition-qualified. A snippet named `card` being selected
//! does not make an asset named `card` eligible.

use std::collections::BTreeSet;

use crate::graph::NodeIndex;
use crate::policy::ComponentSelector;
use crate::resolver::ResolveError;
use crate::types::{Node, NodeKey, NodeKind, Partition};

/// Extension component templates carry on disk.
const TEMPLATE_EXTENSION: &str = ".liquid";

/// Source nodes eligible to be newly claimed under a selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedNodes {
    keys: BTreeSet<NodeKey>,
}

impl SelectedNodes {
    /// Whether a key is part of the selection.
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.keys.contains(key)
    }

    /// Selected keys in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeKey> {
        self.keys.iter()
    }

    /// Number of selected nodes.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Compute the selection closure.
///
/// Returns `Ok(None)` when the selector selects everything. A named selector
/// that matches no component in the source is an error.
pub fn select_components(
    selector: &ComponentSelector,
    source: &NodeIndex<'_>,
) -> Result<Option<SelectedNodes>, ResolveError> {
    let names = match selector {
        ComponentSelector::All => return Ok(None),
        ComponentSelector::Named(names) => names,
    };

    let roots: Vec<&Node> = names
        .iter()
        .filter_map(|name| find_component(source, name))
        .collect();

    let selected = closure(roots, source);
    if selected.is_empty() {
        return Err(ResolveError::SelectorNoMatch {
            selector: selector.to_string(),
        });
    }

    tracing::debug!(
        selector = %selector,
        selected = selected.len(),
        "Computed selection closure"
    );

    Ok(Some(selected))
}

/// Find a component by bare name or by its template file name.
fn find_component<'a>(source: &NodeIndex<'a>, name: &str) -> Option<&'a Node> {
    let file_name = format!("{}{}", name, TEMPLATE_EXTENSION);
    for candidate in [name, file_name.as_str()] {
        if let Some(node) = source.find(Partition::Snippets, candidate) {
            if node.kind == NodeKind::Component {
                return Some(node);
            }
        }
    }
    None
}

/// Every node reachable from `roots` through snippet and asset references.
fn closure(roots: Vec<&Node>, source: &NodeIndex<'_>) -> SelectedNodes {
    let mut keys: BTreeSet<NodeKey> = BTreeSet::new();
    let mut stack = roots;

    while let Some(node) = stack.pop() {
        if !keys.insert(node.key()) {
            continue;
        }
        for key in node.ref_keys() {
            if keys.contains(&key) {
                continue;
            }
            // Dangling references are skipped
            if let Some(child) = source.get(&key) {
                stack.push(child);
            }
        }
    }

    SelectedNodes { keys }
}
