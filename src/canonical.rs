//! Canonical serialization for manifests.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: struct fields serialize in declaration order
//! - Sorted map keys: every map in the manifest is a `BTreeMap`
//! - Stable layout: two-space indented JSON, no trailing newline
//!
//! Identical manifests therefore produce byte-identical files and identical
//! fingerprints.

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Serialize a value to the canonical on-disk JSON layout.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(value)
}

/// Compute the canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<u64, serde_json::Error> {
    let bytes = to_canonical_bytes(value)?;
    Ok(xxh64(&bytes, 0))
}

/// Compute the canonical hash and return it as hex.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(format!("{:016x}", canonical_hash(value)?))
}
