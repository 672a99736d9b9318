//! In-memory manifest store for testing.

use parking_lot::Mutex;

use crate::types::ManifestState;
use super::{OwnershipStore, StoreError};

/// In-memory manifest store for testing.
///
/// Counts writes and can be told to fail the next persist.
#[derive(Debug, Default)]
pub struct InMemoryOwnershipStore {
    state: Mutex<Option<ManifestState>>,
    writes: Mutex<usize>,
    fail_next_persist: Mutex<bool>,
}

impl InMemoryOwnershipStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding an existing manifest.
    pub fn with_state(state: ManifestState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            ..Self::default()
        }
    }

    /// The stored manifest, if any was stored.
    pub fn snapshot(&self) -> Option<ManifestState> {
        self.state.lock().clone()
    }

    /// Number of successful persists.
    pub fn num_writes(&self) -> usize {
        *self.writes.lock()
    }

    /// Make the next `persist` call fail without touching the stored state.
    pub fn fail_next_persist(&self) {
        *self.fail_next_persist.lock() = true;
    }
}

impl OwnershipStore for InMemoryOwnershipStore {
    fn load(&self) -> Result<ManifestState, StoreError> {
        Ok(self.state.lock().clone().unwrap_or_default())
    }

    fn persist(&self, state: &ManifestState) -> Result<(), StoreError> {
        {
            let mut fail = self.fail_next_persist.lock();
            if *fail {
                *fail = false;
                return Err(StoreError::Backend("injected persist failure".to_string()));
            }
        }

        *self.state.lock() = Some(state.clone());
        *self.writes.lock() += 1;
        Ok(())
    }
}
