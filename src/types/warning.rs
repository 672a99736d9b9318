//! Structured warnings produced during resolution.
//!
//! Conflicts and overrides never fail a resolution. They are returned to the
//! caller as an ordered list so it can decide how to surface them.
//!
//! | Kind | Trigger | Default outcome |
//! |------|---------|-----------------|
//! | Conflict | File exists in consumer and source with no recorded owner | Consumer keeps it |
//! | Override | File owned by another collection is also offered by the source | Previous owner keeps it |

use serde::{Deserialize, Serialize};

use super::node::{NodeKey, Partition};

/// Kind of ownership warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A file in the consumer shadows a file of the source collection.
    Conflict,
    /// A file owned by another collection is also offered by the source.
    Override,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict => write!(f, "conflict"),
            Self::Override => write!(f, "override"),
        }
    }
}

/// A single ownership warning.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResolutionWarning {
    /// What kind of warning this is.
    pub kind: WarningKind,
    /// Partition of the contested file.
    pub partition: Partition,
    /// Name of the contested file.
    pub name: String,
    /// Owner that keeps the file.
    pub retained_by: String,
    /// Collection that offered the file and lost.
    pub offered_by: String,
}

impl ResolutionWarning {
    /// A conflict where `retained_by` keeps a file also offered by `offered_by`.
    pub fn conflict(key: &NodeKey, retained_by: &str, offered_by: &str) -> Self {
        Self {
            kind: WarningKind::Conflict,
            partition: key.partition,
            name: key.name.clone(),
            retained_by: retained_by.to_string(),
            offered_by: offered_by.to_string(),
        }
    }

    /// An override where `retained_by` keeps a file also offered by `offered_by`.
    pub fn override_kept(key: &NodeKey, retained_by: &str, offered_by: &str) -> Self {
        Self {
            kind: WarningKind::Override,
            partition: key.partition,
            name: key.name.clone(),
            retained_by: retained_by.to_string(),
            offered_by: offered_by.to_string(),
        }
    }

    /// Key of the contested file.
    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.partition, self.name.clone())
    }

    /// Emit this warning as a structured log event.
    pub fn log(&self) {
        tracing::warn!(
            kind = %self.kind,
            partition = %self.partition,
            name = %self.name,
            retained_by = %self.retained_by,
            offered_by = %self.offered_by,
            "{}",
            self
        );
    }
}

impl std::fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            WarningKind::Conflict => write!(
                f,
                "Conflict Warning: Pre-existing file {}/{} without mapping conflicts with file in {}. Keeping the file from {}.",
                self.partition, self.name, self.offered_by, self.retained_by
            ),
            WarningKind::Override => write!(
                f,
                "Override Warning: {}/{} is being overridden by the collection {}. Keeping the file from {}.",
                self.partition, self.name, self.offered_by, self.retained_by
            ),
        }
    }
}
