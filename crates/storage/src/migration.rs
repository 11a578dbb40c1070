// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot schema migration: a registry of single-version-step migrations
//! applied in sequence to bring an on-disk snapshot up to the running
//! binary's current version.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("snapshot version {0} is newer than the current version {1}")]
    TooNew(u32, u32),
    #[error("no migration path from version {0} to {1}")]
    NoPath(u32, u32),
}

/// A single version-to-version schema transformation, applied in place to
/// the snapshot's JSON representation.
pub trait Migration {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError>;
}

/// Ordered set of registered migrations. `migrate_to` walks them in
/// registration order, applying each whose `source_version` matches the
/// snapshot's current `v` field until `target_version` is reached.
#[derive(Default)]
pub struct MigrationRegistry {
    pub migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        MigrationRegistry { migrations: Vec::new() }
    }

    pub fn migrate_to(&self, mut snapshot: Value, target: u32) -> Result<Value, MigrationError> {
        let mut current = snapshot
            .get("v")
            .and_then(Value::as_u64)
            .map(|v| v as u32)
            .unwrap_or(0);

        if current > target {
            return Err(MigrationError::TooNew(current, target));
        }

        while current < target {
            let step = self
                .migrations
                .iter()
                .find(|m| m.source_version() == current)
                .ok_or(MigrationError::NoPath(current, target))?;
            step.migrate(&mut snapshot)?;
            if let Some(obj) = snapshot.as_object_mut() {
                obj.insert("v".into(), step.target_version().into());
            }
            current = step.target_version();
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
