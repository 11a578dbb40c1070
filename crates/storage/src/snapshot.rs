// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic zstd-compressed snapshots of [`MaterializedState`], so recovery
//! after a restart doesn't always mean replaying the WAL from the start of
//! time. Snapshots are versioned (`v`/`seq` envelope) and run through
//! [`crate::migration::MigrationRegistry`] on load.

use crate::migration::{MigrationError, MigrationRegistry};
use crate::state::MaterializedState;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// The current on-disk snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("zstd error: {0}")]
    Zstd(String),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
}

/// Write `state` (folded through `processed_seq` WAL entries) to `path` as a
/// zstd-compressed JSON envelope.
pub fn save(path: &Path, state: &MaterializedState, processed_seq: u64) -> Result<(), SnapshotError> {
    let envelope = json!({
        "v": SNAPSHOT_VERSION,
        "seq": processed_seq,
        "state": state,
    });
    let raw = serde_json::to_vec(&envelope)?;
    let compressed = zstd::encode_all(&raw[..], 0).map_err(|e| SnapshotError::Zstd(e.to_string()))?;
    let tmp = path.with_extension("tmp");
    std::fs::File::create(&tmp)?.write_all(&compressed)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Load and migrate a snapshot, returning the materialized state and the
/// WAL sequence it was taken at.
pub fn load(path: &Path, registry: &MigrationRegistry) -> Result<(MaterializedState, u64), SnapshotError> {
    let compressed = std::fs::read(path)?;
    let raw = zstd::decode_all(&compressed[..]).map_err(|e| SnapshotError::Zstd(e.to_string()))?;
    let envelope: serde_json::Value = serde_json::from_slice(&raw)?;
    let migrated = registry.migrate_to(envelope, SNAPSHOT_VERSION)?;

    let seq = migrated.get("seq").and_then(serde_json::Value::as_u64).unwrap_or(0);
    let state: MaterializedState = serde_json::from_value(
        migrated.get("state").cloned().unwrap_or(serde_json::Value::Null),
    )?;
    Ok((state, seq))
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
