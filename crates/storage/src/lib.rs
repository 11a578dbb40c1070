// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-storage: event-sourced persistence for the array job subsystem.
//!
//! Durable state is a write-ahead log of [`event::Event`]s
//! ([`wal::Wal`]), periodically folded into a [`state::MaterializedState`]
//! and checkpointed to a versioned, zstd-compressed [`snapshot`]. This is
//! not a SQL or key-value store: recovery means replaying the WAL tail
//! after the last snapshot, not querying a database.

pub mod event;
pub mod migration;
pub mod snapshot;
pub mod state;
pub mod wal;

pub use event::{Event, WireAttrMode};
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use snapshot::{load, save, SnapshotError, SNAPSHOT_VERSION};
pub use state::MaterializedState;
pub use wal::{Wal, WalEntry, WalError};
