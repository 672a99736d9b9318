//! Core types for the manifest engine.

pub mod node;
pub mod ownership;
pub mod warning;

pub use node::{Node, NodeKey, NodeKind, Partition};
pub use ownership::{CollectionRecord, ManifestState, OwnershipMap};
pub use warning::{ResolutionWarning, WarningKind};
