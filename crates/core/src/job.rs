// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job record: immutable header, lifecycle state, and attribute store.

use crate::array_id::JobId;
use crate::array_job::ArrayTracker;
use crate::attribute::{AttrId, AttrMode, AttrValue, AttributeStore, SetScope};
use crate::error::ArrayError;
use serde::{Deserialize, Serialize};

/// One of the ten states a job (or subjob) occupies at any given time.
///
/// Declared in the fixed order the original's single-character state codes
/// use, so `self as usize` can index `ArrayTracker::state_counts` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    Transit = 0,
    Queued = 1,
    Held = 2,
    Waiting = 3,
    Running = 4,
    Exiting = 5,
    Expired = 6,
    Beginning = 7,
    Moved = 8,
    Finished = 9,
}

impl JobState {
    pub const COUNT: usize = 10;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// `IS_ARRAY_PARENT` / `IS_SUBJOB` / `HERE` job flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobFlags(u8);

impl JobFlags {
    pub const IS_ARRAY_PARENT: JobFlags = JobFlags(1 << 0);
    pub const IS_SUBJOB: JobFlags = JobFlags(1 << 1);
    pub const HERE: JobFlags = JobFlags(1 << 2);

    pub const fn none() -> Self {
        JobFlags(0)
    }

    pub fn contains(self, other: JobFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: JobFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: JobFlags) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for JobFlags {
    type Output = JobFlags;
    fn bitor(self, rhs: JobFlags) -> JobFlags {
        JobFlags(self.0 | rhs.0)
    }
}

/// A job or subjob record.
///
/// The header (`id`, `file_prefix`, `owner`, `ctime`, `queue`,
/// `reservation`) is set once at construction and never rewritten in
/// place — a subjob's header is a fresh copy built by
/// [`crate::subjob::create_subjob`], not a mutation of the parent's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub file_prefix: String,
    pub owner: String,
    pub ctime: i64,
    pub queue: String,
    pub reservation: Option<String>,

    pub state: JobState,
    pub substate: i32,
    pub flags: JobFlags,

    /// Sticky once set: has this job ever reached `Beginning`? Consulted by
    /// [`crate::parent_aggregator::chk_array_doneness`], whose "ever
    /// reached Begun" check can't rely on current `state` alone once the
    /// job has moved on to `Finished`.
    pub ever_began: bool,

    pub attrs: AttributeStore,

    /// Non-owning reference to the parent, set on subjobs only.
    pub parent_ref: Option<JobId>,
    /// Owned array tracker, set on array parents only.
    pub tracker: Option<ArrayTracker>,
}

impl Job {
    pub fn new(id: JobId, owner: impl Into<String>, queue: impl Into<String>, ctime: i64) -> Self {
        Job {
            id,
            file_prefix: String::new(),
            owner: owner.into(),
            ctime,
            queue: queue.into(),
            reservation: None,
            state: JobState::Transit,
            substate: 0,
            flags: JobFlags::none(),
            ever_began: false,
            attrs: AttributeStore::new(),
            parent_ref: None,
            tracker: None,
        }
    }

    pub fn is_array_parent(&self) -> bool {
        self.flags.contains(JobFlags::IS_ARRAY_PARENT)
    }

    pub fn is_subjob(&self) -> bool {
        self.flags.contains(JobFlags::IS_SUBJOB)
    }

    /// Transition to `state`, latching [`Job::ever_began`] on first entry to
    /// `Beginning` so later doneness processing can still tell the job ran
    /// even after it has moved on to a terminal state.
    pub fn set_state(&mut self, state: JobState) {
        if state == JobState::Beginning {
            self.ever_began = true;
        }
        self.state = state;
    }

    /// Typed attribute accessors. Each setter (a) updates the stored value,
    /// (b) marks the attribute dirty, (c) invalidates the cached encoded
    /// form — both handled by [`AttributeStore::set`] — and (d), for a
    /// plain attribute, would run the definition's action callback under
    /// `mode` unless `scope` is `Internal`. `array_indices_submitted` and
    /// `array_indices_remaining` are the only two attributes in this crate
    /// that carry one, and installing/fixing up an [`ArrayTracker`] needs
    /// context (the `max_array_size` tunable) these generic setters don't
    /// have — callers use [`crate::array_job::install_tracker`] and
    /// [`crate::array_job::recovery_fixup`] directly for those two instead
    /// of going through `set_jattr_str_slim`.
    pub fn get_jattr_long(&self, id: AttrId) -> Option<i64> {
        self.attrs.get_long(id)
    }

    pub fn get_jattr_str(&self, id: AttrId) -> Option<&str> {
        self.attrs.get_str(id)
    }

    pub fn get_jattr_bool(&self, id: AttrId) -> Option<bool> {
        self.attrs.get_bool(id)
    }

    pub fn set_jattr_long(
        &mut self,
        id: AttrId,
        value: i64,
        mode: AttrMode,
        scope: SetScope,
    ) -> Result<(), ArrayError> {
        self.attrs.set(id, AttrValue::Long(value));
        self.run_action(id, mode, scope)
    }

    pub fn set_jattr_bool(
        &mut self,
        id: AttrId,
        value: bool,
        mode: AttrMode,
        scope: SetScope,
    ) -> Result<(), ArrayError> {
        self.attrs.set(id, AttrValue::Bool(value));
        self.run_action(id, mode, scope)
    }

    /// `set_jattr_str_slim` in the original's naming: sets a string
    /// attribute without touching any resource sub-structure.
    pub fn set_jattr_str_slim(
        &mut self,
        id: AttrId,
        value: impl Into<String>,
        _mode: AttrMode,
        _scope: SetScope,
    ) -> Result<(), ArrayError> {
        debug_assert!(
            !matches!(id, AttrId::ArrayIndicesSubmitted | AttrId::ArrayIndicesRemaining),
            "use array_job::install_tracker/recovery_fixup for {id:?}",
        );
        self.attrs.set(id, AttrValue::Str(value.into()));
        Ok(())
    }

    /// Runs `id`'s action callback under `mode`, unless `scope` is
    /// `Internal`. None of the `Long`/`Bool`-typed attributes this crate
    /// models carry one — only `array_indices_submitted` and
    /// `array_indices_remaining` do, and those are written through
    /// [`crate::array_job::install_tracker`]/[`crate::array_job::recovery_fixup`]
    /// instead of `set_jattr_long`/`set_jattr_bool` — so this is a no-op,
    /// kept as the dispatch point the original's generic action table would
    /// occupy.
    fn run_action(&mut self, _id: AttrId, _mode: AttrMode, _scope: SetScope) -> Result<(), ArrayError> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Job {
    pub fn builder(id: impl Into<String>) -> JobBuilder {
        JobBuilder {
            id: JobId::new(id.into()),
            owner: "tester".to_string(),
            queue: "workq".to_string(),
            ctime: 1_000_000,
            state: JobState::Queued,
            substate: 0,
            ever_began: false,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct JobBuilder {
    id: JobId,
    owner: String,
    queue: String,
    ctime: i64,
    state: JobState,
    substate: i32,
    ever_began: bool,
}

#[cfg(any(test, feature = "test-support"))]
impl JobBuilder {
    crate::setters! {
        into {
            owner: String,
            queue: String,
        }
        set {
            ctime: i64,
            state: JobState,
            substate: i32,
            ever_began: bool,
        }
    }

    pub fn build(self) -> Job {
        let mut job = Job::new(self.id, self.owner, self.queue, self.ctime);
        job.state = self.state;
        job.substate = self.substate;
        job.ever_began = self.ever_began;
        job
    }
}

// Single-character state codes, matching the original server's job status
// display (`qstat`'s S column).
crate::simple_display! {
    JobState {
        Transit => "T",
        Queued => "Q",
        Held => "H",
        Waiting => "W",
        Running => "R",
        Exiting => "E",
        Expired => "X",
        Beginning => "B",
        Moved => "M",
        Finished => "F",
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
