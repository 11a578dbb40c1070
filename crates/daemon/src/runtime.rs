// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single-threaded job table service: submit/run/rerun/signal/delete
//! plus status queries and the credential-renewal sweep, all backed by
//! `oj-storage`'s event-sourced persistence. This is the "thin request
//! dispatcher standing in for the batch-request listener" from
//! SPEC_FULL.md §2 — no network listener or wire codec, since those are
//! explicitly external collaborators (spec.md §1).
//!
//! All mutation here runs to completion with no `.await` in the middle,
//! mirroring spec.md §5's "array tracker is never observed mid-transition":
//! every public method is a synchronous, straight-line sequence of
//! validate -> persist -> fold.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use oj_core::{
    array_job, create_subjob, create_subjob_id, get_subjob_and_state, ArrayError, AttrId, Clock, Job,
    JobId, JobState, SubjobHost, SystemClock, TrackerFlags,
};
use oj_storage::{Event, MigrationRegistry, WireAttrMode};
use thiserror::Error;

use crate::config::ServerConfig;
use crate::effects::TracingEndOfJobEffects;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Array(#[from] ArrayError),
    #[error(transparent)]
    Wal(#[from] oj_storage::WalError),
    #[error(transparent)]
    Snapshot(#[from] oj_storage::SnapshotError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("job not found: {0}")]
    NotFound(String),
    #[error("job already exists: {0}")]
    AlreadyExists(JobId),
}

/// Per-state breakdown of an array parent's tracker, shaped for display.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ArrayStatusView {
    pub total: u64,
    pub queued: u64,
    pub running: u64,
    pub held: u64,
    pub exiting: u64,
    pub expired: u64,
    pub remaining: String,
    pub state_count: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct JobStatusView {
    pub id: String,
    pub state: String,
    pub owner: String,
    pub exit_status: Option<i64>,
    pub array: Option<ArrayStatusView>,
}

/// Validates a subjob id isn't already materialized before
/// [`oj_core::create_subjob`] commits to building it — the original's
/// `svr_enquejob` failure path, simplified to a duplicate check since this
/// crate has no scheduler to refuse capacity.
struct DupCheckHost<'a> {
    existing: &'a HashMap<String, Job>,
}

impl SubjobHost for DupCheckHost<'_> {
    fn enqueue(&mut self, subjob: &Job) -> Result<(), ArrayError> {
        if self.existing.contains_key(subjob.id.as_str()) {
            return Err(ArrayError::Ivalreq(format!("{} already exists", subjob.id)));
        }
        Ok(())
    }
}

/// Owns the live job table and the WAL/snapshot pair that persist it.
/// `C` is the clock, swappable for a [`oj_core::FakeClock`] in tests.
pub struct Runtime<C: Clock = SystemClock> {
    state: oj_storage::MaterializedState,
    wal: oj_storage::Wal,
    config: ServerConfig,
    clock: C,
    effects: TracingEndOfJobEffects,
    snapshot_path: PathBuf,
}

impl Runtime<SystemClock> {
    pub fn open(base_dir: &Path, config: ServerConfig) -> Result<Self, DaemonError> {
        Self::open_with_clock(base_dir, config, SystemClock)
    }
}

impl<C: Clock> Runtime<C> {
    /// Open (or create) the job table rooted at `base_dir`: load the latest
    /// snapshot if one exists, then replay every WAL entry written after it.
    pub fn open_with_clock(base_dir: &Path, config: ServerConfig, clock: C) -> Result<Self, DaemonError> {
        std::fs::create_dir_all(base_dir)?;
        let snapshot_path = base_dir.join("snapshot.zst");
        let wal_path = base_dir.join("wal.jsonl");

        let registry = MigrationRegistry::new();
        let (mut state, processed_seq) = if snapshot_path.exists() {
            oj_storage::load(&snapshot_path, &registry)?
        } else {
            (oj_storage::MaterializedState::new(), 0)
        };

        let mut wal = oj_storage::Wal::open(&wal_path, processed_seq)?;
        while let Some(entry) = wal.next_unprocessed()? {
            state.apply_event(&entry.event);
            wal.mark_processed(entry.seq);
        }

        Ok(Runtime { state, wal, config, clock, effects: TracingEndOfJobEffects, snapshot_path })
    }

    fn now_epoch(&self) -> i64 {
        (self.clock.epoch_ms() / 1000) as i64
    }

    /// Append `event` to the WAL, flush immediately (a single CLI invocation
    /// has no later opportunity to flush a buffered tail), and fold it into
    /// the live state.
    fn persist(&mut self, event: Event) -> Result<(), DaemonError> {
        self.wal.append(&event)?;
        self.wal.flush()?;
        self.state.apply_event(&event);
        Ok(())
    }

    pub fn get_job(&self, id: &str) -> Option<&Job> {
        self.state.get_job(id)
    }

    /// `submit`: create a job, and if `array_indices` is given, install its
    /// array tracker (spec.md §4.4). Validated against a scratch clone
    /// before the installing event is persisted, so a `BadAttrValue`/
    /// `MaxArraySize` never gets silently swallowed the way
    /// `MaterializedState::apply_event`'s replay path must (it only logs).
    pub fn submit_job(
        &mut self,
        id: &str,
        owner: &str,
        queue: &str,
        array_indices: Option<&str>,
    ) -> Result<JobId, DaemonError> {
        let jid = JobId::new(id);
        if self.state.jobs.contains_key(jid.as_str()) {
            return Err(DaemonError::AlreadyExists(jid));
        }

        let ctime = self.now_epoch();

        // Validate the array range on a throwaway job before persisting
        // anything, so a rejected submission leaves no trace in the table.
        if let Some(text) = array_indices {
            let mut scratch = Job::new(jid.clone(), owner, queue, ctime);
            array_job::install_tracker(&mut scratch, text, oj_core::AttrMode::New, self.config.max_array_size)?;
        }

        self.persist(Event::JobSubmitted {
            id: jid.clone(),
            owner: owner.to_string(),
            queue: queue.to_string(),
            ctime,
        })?;
        self.transition(jid.as_str(), JobState::Queued, None, None)?;

        if let Some(text) = array_indices {
            self.persist(Event::ArrayInstalled {
                parent_id: jid.clone(),
                text: text.to_string(),
                mode: WireAttrMode::New,
                max_array_size: self.config.max_array_size,
            })?;
        }
        Ok(jid)
    }

    /// `modify`: replace an array parent's submitted range (spec.md §4.4
    /// ALTER). Rejected with `ModifyWhileRunning` once the parent has left
    /// `Queued`, exactly as `install_tracker` enforces.
    pub fn alter_array(&mut self, parent_id: &str, array_indices: &str) -> Result<(), DaemonError> {
        let mut scratch = self
            .state
            .jobs
            .get(parent_id)
            .cloned()
            .ok_or_else(|| DaemonError::NotFound(parent_id.to_string()))?;
        array_job::install_tracker(&mut scratch, array_indices, oj_core::AttrMode::Alter, self.config.max_array_size)?;
        self.persist(Event::ArrayInstalled {
            parent_id: JobId::new(parent_id),
            text: array_indices.to_string(),
            mode: WireAttrMode::Alter,
            max_array_size: self.config.max_array_size,
        })
    }

    /// `run`: materialize subjob `index` of array parent `parent_id` and
    /// drive it straight to `Running`, matching spec.md §3's "credited to
    /// Queued→…→Running via the normal transition path."
    pub fn run_subjob(&mut self, parent_id: &str, index: u64) -> Result<JobId, DaemonError> {
        let parent = self
            .state
            .jobs
            .get(parent_id)
            .cloned()
            .ok_or_else(|| DaemonError::NotFound(parent_id.to_string()))?;
        let new_jid = create_subjob_id(&parent.id, index)
            .ok_or_else(|| DaemonError::Array(ArrayError::Ivalreq(format!("{parent_id} has no index bracket"))))?;

        let mut host = DupCheckHost { existing: &self.state.jobs };
        let subjob = create_subjob(&parent, &new_jid, &mut host, &self.clock, self.config.eligible_time_enable)?;

        self.persist(Event::SubjobMaterialized { parent_id: parent.id.clone(), subjob })?;
        self.mark_parent_begun(parent.id.as_str())?;
        self.transition(new_jid.as_str(), JobState::Running, None, None)?;
        Ok(new_jid)
    }

    /// Latches the parent's own [`Job::ever_began`] the first time any of
    /// its subjobs starts running, mirroring an ordinary job's own
    /// transition through `Beginning`. Without this, `chk_array_doneness`'s
    /// `ever_began` gate would never open and a fully-drained array would
    /// never reach `Finished`.
    fn mark_parent_begun(&mut self, parent_id: &str) -> Result<(), DaemonError> {
        let already_began = self.state.jobs.get(parent_id).is_some_and(|job| job.ever_began);
        if already_began {
            return Ok(());
        }
        self.persist(Event::JobStateChanged { id: JobId::new(parent_id), state: JobState::Beginning })
    }

    /// `rerun`: drive a (sub)job back to `Queued`.
    pub fn rerun(&mut self, job_id: &str) -> Result<(), DaemonError> {
        self.transition(job_id, JobState::Queued, None, None)
    }

    /// `signal`: no execution host is attached in this crate (spec.md §1's
    /// Non-goals exclude resource negotiation with execution nodes), so this
    /// only validates the target exists.
    pub fn signal(&mut self, job_id: &str, signal_name: &str) -> Result<(), DaemonError> {
        if !self.state.jobs.contains_key(job_id) {
            return Err(DaemonError::NotFound(job_id.to_string()));
        }
        tracing::info!(job_id, signal = signal_name, "signal delivered");
        Ok(())
    }

    /// The sole state-transition entry point: persists the right event for
    /// an ordinary job or a subjob, then (for a subjob) checks whether its
    /// parent just finished draining.
    pub fn transition(
        &mut self,
        job_id: &str,
        new_state: JobState,
        child_exit_status: Option<i64>,
        child_stageout_status: Option<i64>,
    ) -> Result<(), DaemonError> {
        let job = self.state.jobs.get(job_id).ok_or_else(|| DaemonError::NotFound(job_id.to_string()))?;
        let old_state = job.state;
        if old_state == new_state {
            return Ok(());
        }

        if let Some(parent_id) = job.parent_ref.clone() {
            self.persist(Event::SubjobStateChanged {
                parent_id: parent_id.clone(),
                subjob_id: JobId::new(job_id),
                old_state,
                new_state,
                child_exit_status,
                child_stageout_status,
            })?;
            self.maybe_finish_parent(parent_id.as_str())?;
        } else {
            self.persist(Event::JobStateChanged { id: JobId::new(job_id), state: new_state })?;
        }
        Ok(())
    }

    /// `chk_array_doneness`, run live (with real effects) the instant a
    /// subjob transition could have drained the parent. The resulting
    /// `ArrayDoneness` event is persisted purely so replay can re-derive the
    /// tracker's `CHK_ARRAY` flag — `MaterializedState::apply_event` folds it
    /// with a no-op effects implementor so end-of-job mail/accounting never
    /// fires twice.
    fn maybe_finish_parent(&mut self, parent_id: &str) -> Result<(), DaemonError> {
        let now = self.now_epoch();
        let ran = match self.state.jobs.get_mut(parent_id) {
            Some(parent) => oj_core::chk_array_doneness(parent, now, &mut self.effects),
            None => false,
        };
        if ran {
            self.persist(Event::ArrayDoneness { parent_id: JobId::new(parent_id), endtime: now })?;
        }
        Ok(())
    }

    /// `delete`: an ordinary job is just removed; a subjob is first expired
    /// (if not already terminal) so the parent's counts stay correct; an
    /// array parent sets `NO_DELETE` for the duration of the cascade so
    /// `chk_array_doneness` can't re-enter mid-delete (spec.md §4.6 step 1).
    pub fn delete(&mut self, job_id: &str) -> Result<(), DaemonError> {
        let job = self.state.jobs.get(job_id).cloned().ok_or_else(|| DaemonError::NotFound(job_id.to_string()))?;
        if job.is_array_parent() {
            self.delete_array_parent(job_id)
        } else if job.parent_ref.is_some() {
            self.delete_subjob(job_id)
        } else {
            self.persist(Event::JobDeleted { id: JobId::new(job_id) })
        }
    }

    fn delete_subjob(&mut self, subjob_id: &str) -> Result<(), DaemonError> {
        let job = self
            .state
            .jobs
            .get(subjob_id)
            .cloned()
            .ok_or_else(|| DaemonError::NotFound(subjob_id.to_string()))?;
        if !matches!(job.state, JobState::Finished | JobState::Expired) {
            self.transition(subjob_id, JobState::Expired, None, None)?;
        }
        self.persist(Event::JobDeleted { id: JobId::new(subjob_id) })
    }

    fn delete_array_parent(&mut self, parent_id: &str) -> Result<(), DaemonError> {
        if let Some(parent) = self.state.jobs.get_mut(parent_id) {
            if let Some(tracker) = parent.tracker.as_mut() {
                tracker.flags.insert(TrackerFlags::NO_DELETE);
            }
        }

        let children: Vec<String> = self
            .state
            .jobs
            .values()
            .filter(|j| j.parent_ref.as_ref().map(JobId::as_str) == Some(parent_id))
            .map(|j| j.id.as_str().to_string())
            .collect();
        for child in children {
            self.delete_subjob(&child)?;
        }

        if let Some(parent) = self.state.jobs.get_mut(parent_id) {
            if let Some(tracker) = parent.tracker.as_mut() {
                tracker.flags.remove(TrackerFlags::NO_DELETE);
            }
        }
        self.maybe_finish_parent(parent_id)?;
        self.persist(Event::JobDeleted { id: JobId::new(parent_id) })
    }

    /// `status`: the aggregate view of a job, including its tracker
    /// breakdown if it's an array parent.
    pub fn status(&self, id: &str) -> Result<JobStatusView, DaemonError> {
        let job = self.state.get_job(id).ok_or_else(|| DaemonError::NotFound(id.to_string()))?;
        let array = job.tracker.as_ref().map(|tracker| ArrayStatusView {
            total: tracker.total,
            queued: tracker.state_counts[JobState::Queued.index()],
            running: tracker.state_counts[JobState::Running.index()],
            held: tracker.state_counts[JobState::Held.index()],
            exiting: tracker.state_counts[JobState::Exiting.index()],
            expired: tracker.state_counts[JobState::Expired.index()],
            remaining: job.get_jattr_str(AttrId::ArrayIndicesRemaining).unwrap_or("-").to_string(),
            state_count: job.get_jattr_str(AttrId::ArrayStateCount).unwrap_or("").to_string(),
        });
        Ok(JobStatusView {
            id: job.id.as_str().to_string(),
            state: job.state.to_string(),
            owner: job.owner.clone(),
            exit_status: job.get_jattr_long(AttrId::ExitStatus),
            array,
        })
    }

    /// Status of a single array index, synthesizing a pseudo-state when no
    /// subjob has been materialized yet (spec.md §4.6).
    pub fn subjob_status(&self, parent_id: &str, index: u64) -> Result<String, DaemonError> {
        let parent = self.state.jobs.get(parent_id).ok_or_else(|| DaemonError::NotFound(parent_id.to_string()))?;
        let (_, state, _) = get_subjob_and_state(parent, index, |id| self.state.jobs.get(id));
        Ok(state.to_string())
    }

    /// `svr_renew_creds`: scan every job and schedule renewal for whichever
    /// ones are due (spec.md §4.7).
    pub fn cred_renew_sweep(&mut self) -> Result<Vec<oj_core::ScheduledRenewal>, DaemonError> {
        let now = self.now_epoch();
        let scheduled = oj_core::cred_renew_sweep(self.state.jobs.values(), now, &self.config.cred_renew);
        for renewal in &scheduled {
            tracing::info!(job_id = %renewal.job_id, run_at = renewal.run_at, "scheduled credential renewal");
            self.persist(Event::CredRenewScheduled { job_id: renewal.job_id.clone(), run_at: renewal.run_at })?;
        }
        Ok(scheduled)
    }

    /// `svr_renew_job_cred`: re-check and, if still warranted, renew.
    /// Logged but never propagated — a renewal failure must never stop the
    /// sweep (spec.md §7).
    pub fn fire_cred_renewal(&mut self, job_id: &str) {
        let job = self.state.jobs.get(job_id);
        if oj_core::cred_renew::should_attempt_renewal(job) {
            tracing::info!(job_id, "credential renewed");
        } else {
            tracing::warn!(job_id, "credential renewal skipped: job finished or lost its cred_id");
        }
    }

    /// Fold the WAL into a fresh snapshot and truncate it. Cheap to call
    /// often; the snapshot format is zstd-compressed JSON (`oj-storage`).
    pub fn checkpoint(&mut self) -> Result<(), DaemonError> {
        self.wal.flush()?;
        let seq = self.wal.write_seq();
        oj_storage::save(&self.snapshot_path, &self.state, seq)?;
        self.wal.mark_processed(seq);
        self.wal.truncate_before(seq + 1)?;
        Ok(())
    }

    pub fn shutdown(&mut self) -> Result<(), DaemonError> {
        self.persist(Event::Shutdown)?;
        self.checkpoint()
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
