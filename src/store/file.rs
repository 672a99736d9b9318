//! JSON manifest file in the consumer repository.
//!
//! - Missing file loads as an empty manifest
//! - Missing or `null` sections load as empty
//! - Non-string owners and malformed collection records are dropped
//! - Writes are atomic (write to temp file, sync, then rename)

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::canonical::to_canonical_bytes;
use crate::types::{CollectionRecord, ManifestState, OwnershipMap};
use crate::MANIFEST_FILE_NAME;
use super::{OwnershipStore, StoreError};

/// Manifest document as found on disk, before normalization.
#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    #[serde(default)]
    collections: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    files: Option<RawFiles>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFiles {
    #[serde(default)]
    assets: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    snippets: Option<BTreeMap<String, serde_json::Value>>,
}

fn owners(raw: Option<BTreeMap<String, serde_json::Value>>) -> BTreeMap<String, String> {
    raw.unwrap_or_default()
        .into_iter()
        .filter_map(|(name, owner)| match owner {
            serde_json::Value::String(owner) => Some((name, owner)),
            _ => None,
        })
        .collect()
}

fn collections(raw: Option<BTreeMap<String, serde_json::Value>>) -> BTreeMap<String, CollectionRecord> {
    raw.unwrap_or_default()
        .into_iter()
        .filter_map(|(name, record)| match serde_json::from_value(record) {
            Ok(record) => Some((name, record)),
            Err(e) => {
                tracing::warn!(collection = %name, error = %e, "Dropping malformed collection record");
                None
            }
        })
        .collect()
}

impl From<RawManifest> for ManifestState {
    fn from(raw: RawManifest) -> Self {
        let files = raw.files.unwrap_or_default();
        Self {
            collections: collections(raw.collections),
            files: OwnershipMap {
                assets: owners(files.assets),
                snippets: owners(files.snippets),
            },
        }
    }
}

/// Manifest stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the conventional manifest location inside a consumer root.
    pub fn for_consumer(root: &Path) -> Self {
        Self::new(root.join(MANIFEST_FILE_NAME))
    }

    /// Manifest file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a manifest has been written yet.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| MANIFEST_FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }

    fn write_temp(&self, temp_path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .map_err(|e| self.write_err(e))?;

        file.write_all(bytes).map_err(|e| self.write_err(e))?;
        file.sync_all().map_err(|e| self.write_err(e))?;
        Ok(())
    }
}

impl OwnershipStore for JsonFileStore {
    fn load(&self) -> Result<ManifestState, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No manifest found, starting empty");
            return Ok(ManifestState::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        let raw: RawManifest =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        Ok(raw.into())
    }

    fn persist(&self, state: &ManifestState) -> Result<(), StoreError> {
        let bytes = to_canonical_bytes(state).map_err(StoreError::Serialize)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = self.write_temp(&temp_path, &bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.write_err(e));
        }

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Persisted manifest");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Partition;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::for_consumer(dir.path());

        assert!(!store.exists());
        assert_eq!(store.load().unwrap(), ManifestState::default());
    }

    #[test]
    fn test_tolerant_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::for_consumer(dir.path());
        fs::write(
            store.path(),
            r#"{"collections":null,"files":{"snippets":{"a":"@theme","b":7},"assets":null}}"#,
        )
        .unwrap();

        let state = store.load().unwrap();
        assert!(state.collections.is_empty());
        assert_eq!(state.files.owner(Partition::Snippets, "a"), Some("@theme"));
        assert_eq!(state.files.owner(Partition::Snippets, "b"), None);
        assert!(state.files.assets.is_empty());
    }

    #[test]
    fn test_malformed_collection_record_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::for_consumer(dir.path());
        fs::write(
            store.path(),
            r#"{"collections":{"ui-kit":{"commit":null,"version":"1.0.0"},"old-kit":7,"bad-kit":{"version":3}},"files":{"snippets":{"hero":"ui-kit"}}}"#,
        )
        .unwrap();

        let state = store.load().unwrap();
        assert_eq!(state.collections.len(), 1);
        assert_eq!(
            state.collection("ui-kit").unwrap().version.as_deref(),
            Some("1.0.0")
        );
        assert_eq!(state.files.owner(Partition::Snippets, "hero"), Some("ui-kit"));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::for_consumer(dir.path());
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn test_persist_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::for_consumer(dir.path());

        let mut state = ManifestState::new();
        state.files.assign(Partition::Snippets, "hero", "ui-kit");
        store.persist(&state).unwrap();

        assert_eq!(store.load().unwrap(), state);
        assert!(!store.temp_path().exists());
    }
}
