// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The typed events persisted to the write-ahead log. Each is a fact about
//! something that happened to a job or its array tracker; [`crate::state::MaterializedState`]
//! folds a stream of these back into the live job table.

use oj_core::JobId;
use serde::{Deserialize, Serialize};

/// Wire-safe mirror of [`oj_core::AttrMode`] (which does not derive
/// `Serialize`/`Deserialize` since it never crosses a persistence boundary
/// inside `oj-core` itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireAttrMode {
    New,
    Alter,
    Recov,
}

impl From<WireAttrMode> for oj_core::AttrMode {
    fn from(mode: WireAttrMode) -> Self {
        match mode {
            WireAttrMode::New => oj_core::AttrMode::New,
            WireAttrMode::Alter => oj_core::AttrMode::Alter,
            WireAttrMode::Recov => oj_core::AttrMode::Recov,
        }
    }
}

/// Facts the daemon persists about the array job subsystem. Control events
/// (`Shutdown`) carry no domain state and are skipped by
/// [`crate::state::MaterializedState::apply_event`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// A job (ordinary or array parent) entered the table.
    JobSubmitted { id: JobId, owner: String, queue: String, ctime: i64 },

    /// `array_indices_submitted` was written under `mode`, installing or
    /// replacing the parent's tracker.
    ArrayInstalled { parent_id: JobId, text: String, mode: WireAttrMode, max_array_size: u64 },

    /// A parent's `queued_list` was rebuilt from a persisted
    /// `array_indices_remaining` value during recovery.
    ArrayIndicesRecovered { parent_id: JobId, text: String },

    /// A freshly materialized subjob, produced by the subjob factory.
    SubjobMaterialized { parent_id: JobId, subjob: oj_core::Job },

    /// A subjob (or ordinary job) transitioned state. `child_exit_status`/
    /// `child_stageout_status` carry the values `update_sj_parent` needs to
    /// join into the parent's own attributes, when the transition leaves
    /// `Queued` for good.
    SubjobStateChanged {
        parent_id: JobId,
        subjob_id: JobId,
        old_state: oj_core::JobState,
        new_state: oj_core::JobState,
        child_exit_status: Option<i64>,
        child_stageout_status: Option<i64>,
    },

    /// An ordinary (non-array) job's state changed.
    JobStateChanged { id: JobId, state: oj_core::JobState },

    /// A job left the table entirely (post-doneness purge, or qdel).
    JobDeleted { id: JobId },

    /// A parent finished draining; end-of-job side effects ran.
    ArrayDoneness { parent_id: JobId, endtime: i64 },

    /// A credential renewal was scheduled for `job_id`, to fire at
    /// `run_at`. Informational only — not folded into job state.
    CredRenewScheduled { job_id: JobId, run_at: i64 },

    /// Orderly daemon shutdown. Replayed but never folded into state; the
    /// engine loop is responsible for recognizing and skipping it.
    Shutdown,
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
