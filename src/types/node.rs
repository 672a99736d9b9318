//! Node types for the component dependency graph.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Ownership namespace a node lives in.
///
/// Snippets and assets are resolved independently: the same name may exist in
/// both partitions without colliding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    /// Liquid snippets, including components and entry points.
    Snippets,
    /// Stylesheets, scripts and other static files.
    Assets,
}

impl Partition {
    /// Parse a partition from its folder name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "snippets" => Some(Self::Snippets),
            "assets" => Some(Self::Assets),
            _ => None,
        }
    }

    /// Folder name used in manifests and warning messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snippets => "snippets",
            Self::Assets => "assets",
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What role a node plays in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A reusable component; its own name is an ownership root.
    Component,
    /// A template, section or layout that pulls in snippets but is never owned.
    Entry,
    /// A snippet file.
    Snippet,
    /// A static asset file.
    Asset,
}

impl NodeKind {
    /// Partition that nodes of this kind are recorded under.
    pub fn partition(&self) -> Partition {
        match self {
            Self::Asset => Partition::Assets,
            Self::Component | Self::Entry | Self::Snippet => Partition::Snippets,
        }
    }

    /// Whether the consumer's node of this kind is a closure root.
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Component | Self::Entry)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Component => write!(f, "component"),
            Self::Entry => write!(f, "entry"),
            Self::Snippet => write!(f, "snippet"),
            Self::Asset => write!(f, "asset"),
        }
    }
}

/// Identity of a node: its partition and name.
///
/// Implements `Ord` for deterministic ordering: (partition, name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    /// Ownership namespace.
    pub partition: Partition,
    /// Name, unique within the partition.
    pub name: String,
}

impl NodeKey {
    /// Create a new key.
    pub fn new(partition: Partition, name: impl Into<String>) -> Self {
        Self {
            partition,
            name: name.into(),
        }
    }

    /// Key in the snippets partition.
    pub fn snippet(name: impl Into<String>) -> Self {
        Self::new(Partition::Snippets, name)
    }

    /// Key in the assets partition.
    pub fn asset(name: impl Into<String>) -> Self {
        Self::new(Partition::Assets, name)
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.partition, self.name)
    }
}

/// One file-like unit in a repository's dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Name, unique within the partition.
    pub name: String,
    /// Role in the graph.
    pub kind: NodeKind,
    /// Partition the node is owned under.
    pub partition: Partition,
    /// Where the file lives. Opaque to the resolver.
    pub location: PathBuf,
    /// Snippet names this node renders, in source order.
    #[serde(default)]
    pub snippet_refs: Vec<String>,
    /// Asset names this node pulls in, in source order.
    #[serde(default)]
    pub asset_refs: Vec<String>,
}

impl Node {
    /// Create a node with no references. The partition follows from the kind.
    pub fn new(name: impl Into<String>, kind: NodeKind, location: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind,
            partition: kind.partition(),
            location: location.into(),
            snippet_refs: Vec::new(),
            asset_refs: Vec::new(),
        }
    }

    /// Shorthand for a component node.
    pub fn component(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self::new(name, NodeKind::Component, location)
    }

    /// Shorthand for an entry node.
    pub fn entry(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self::new(name, NodeKind::Entry, location)
    }

    /// Shorthand for a snippet node.
    pub fn snippet(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self::new(name, NodeKind::Snippet, location)
    }

    /// Shorthand for an asset node.
    pub fn asset(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self::new(name, NodeKind::Asset, location)
    }

    /// Set the snippet references.
    pub fn with_snippets<I, T>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.snippet_refs = refs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the asset references.
    pub fn with_assets<I, T>(mut self, refs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.asset_refs = refs.into_iter().map(Into::into).collect();
        self
    }

    /// Identity of this node.
    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.partition, self.name.clone())
    }

    /// Keys of everything this node references, snippets first.
    pub fn ref_keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.snippet_refs
            .iter()
            .map(|name| NodeKey::snippet(name.as_str()))
            .chain(self.asset_refs.iter().map(|name| NodeKey::asset(name.as_str())))
    }
}
