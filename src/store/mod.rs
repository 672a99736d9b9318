//! Manifest storage backends.

pub mod file;
pub mod memory;

use std::path::PathBuf;

use crate::types::ManifestState;

/// Error type for manifest storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Manifest exists but could not be read.
    #[error("cannot read manifest {}: {source}", .path.display())]
    Read {
        /// Manifest location.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Manifest is not valid JSON.
    #[error("cannot parse manifest {}: {source}", .path.display())]
    Parse {
        /// Manifest location.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
    /// Manifest could not be serialized.
    #[error("cannot serialize manifest: {0}")]
    Serialize(#[source] serde_json::Error),
    /// Manifest could not be written.
    #[error("cannot write manifest {}: {source}", .path.display())]
    Write {
        /// Manifest location.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Backend-specific failure.
    #[error("store error: {0}")]
    Backend(String),
}

/// Trait for manifest storage backends.
///
/// `persist` must be all-or-nothing: after a failed call the previously
/// stored manifest is still intact.
pub trait OwnershipStore {
    /// Load the manifest, or an empty one if none has been stored yet.
    fn load(&self) -> Result<ManifestState, StoreError>;

    /// Replace the stored manifest.
    fn persist(&self, state: &ManifestState) -> Result<(), StoreError>;
}

pub use file::JsonFileStore;
pub use memory::InMemoryOwnershipStore;
