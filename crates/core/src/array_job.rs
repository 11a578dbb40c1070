// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The array tracker and the parent-lifecycle operations that own it.
//!
//! Exclusively owned by its array parent: `install_tracker` replaces it
//! wholesale on a fresh or altered `array_indices_submitted`,
//! `recovery_fixup` rebuilds `queued_list` after a WAL replay, and
//! `update_sj_parent` is the sole mutator once a subjob starts changing
//! state.

use crate::attribute::{AttrId, AttrMode, AttrValue};
use crate::error::ArrayError;
use crate::job::{Job, JobFlags, JobState};
use crate::range_set::RangeSet;
use tracing::warn;

/// `NO_DELETE` — a bulk delete is in progress; suppresses doneness
/// re-entry. `CHK_ARRAY` — a doneness check is already running; guards
/// `chk_array_doneness` against its own callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackerFlags(u8);

impl TrackerFlags {
    pub const NO_DELETE: TrackerFlags = TrackerFlags(1 << 0);
    pub const CHK_ARRAY: TrackerFlags = TrackerFlags(1 << 1);

    pub fn contains(self, other: TrackerFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: TrackerFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: TrackerFlags) {
        self.0 &= !other.0;
    }
}

/// Per-parent structure: totals, per-state counts, and the queued-index
/// range. Never shared or mutated by anything but the functions in this
/// module.
#[derive(Debug, Clone)]
pub struct ArrayTracker {
    pub total: u64,
    pub start: u64,
    pub end: u64,
    pub step: u64,
    /// Monotonic count of subjobs ever materialized.
    pub dispatched: u64,
    pub state_counts: [u64; JobState::COUNT],
    /// `None` until rebuilt by [`recovery_fixup`] (RECOV/ALTER installs
    /// leave this empty per spec).
    pub queued_list: Option<RangeSet>,
    pub flags: TrackerFlags,
}

impl ArrayTracker {
    fn empty(total: u64, start: u64, end: u64, step: u64) -> Self {
        ArrayTracker {
            total,
            start,
            end,
            step,
            dispatched: 0,
            state_counts: [0; JobState::COUNT],
            queued_list: None,
            flags: TrackerFlags::default(),
        }
    }
}

/// Install (or reinstall) a parent's array tracker on a write of
/// `array_indices_submitted`. `mode` is `New` on first submission, `Alter`
/// on a later qalter-style resubmission, `Recov` on WAL replay.
///
/// `max_array_size` is the server tunable (default 10 000); it is only
/// enforced for `New`/`Alter`, matching the original's `mode != RECOV`
/// guard (a previously-accepted array must still load on recovery even if
/// the tunable has since shrunk).
pub fn install_tracker(
    job: &mut Job,
    text: &str,
    mode: AttrMode,
    max_array_size: u64,
) -> Result<(), ArrayError> {
    if mode == AttrMode::Alter && job.state != JobState::Queued {
        return Err(ArrayError::ModifyWhileRunning);
    }

    let parsed = RangeSet::parse(text)?;
    let count = parsed.count();
    if mode != AttrMode::Recov && count > max_array_size {
        return Err(ArrayError::MaxArraySize { count, limit: max_array_size });
    }
    let (start, end, step) = range_bounds(&parsed, text)?;

    // Step 1: release any previous tracker and its queued_list.
    job.tracker = None;

    let mut tracker = ArrayTracker::empty(count, start, end, step);
    if mode == AttrMode::New {
        tracker.state_counts[JobState::Queued.index()] = count;
        tracker.queued_list = Some(parsed);
    }
    job.tracker = Some(tracker);

    job.flags.insert(JobFlags::IS_ARRAY_PARENT);
    job.attrs.set(AttrId::Array, AttrValue::Bool(true));
    job.attrs.set(AttrId::ArrayStateCount, AttrValue::Str(String::new()));
    job.attrs.set(AttrId::ArrayIndicesSubmitted, AttrValue::Str(text.to_string()));

    if mode != AttrMode::Recov {
        update_array_indices_remaining_attr(job);
    }
    Ok(())
}

/// The submitted range only ever has one stripe by construction
/// (`array_indices_submitted` is a single `start-end:step` expression, not
/// an arbitrary list); pull its bounds back out for the tracker header.
fn range_bounds(parsed: &RangeSet, text: &str) -> Result<(u64, u64, u64), ArrayError> {
    let start = parsed
        .first()
        .ok_or_else(|| ArrayError::BadAttrValue(format!("empty array range {text:?}")))?;
    let mut iter = parsed.iter();
    iter.next();
    let step = iter.next().map(|second| second - start).unwrap_or(1);
    let end = {
        let mut last = start;
        for i in parsed.iter() {
            last = i;
        }
        last
    };
    Ok((start, end, step))
}

/// Rebuild `queued_list` from a persisted `array_indices_remaining` when
/// the tracker's `queued_list` is still empty (RECOV/ALTER install left it
/// that way). A no-op if there is no tracker, or its `queued_list` has
/// already been rebuilt.
pub fn recovery_fixup(job: &mut Job, text: &str) {
    let Some(tracker) = job.tracker.as_mut() else { return };
    if tracker.queued_list.is_some() {
        return;
    }

    let parsed = if text.trim() == "-" || text.trim().is_empty() {
        RangeSet::empty()
    } else {
        match RangeSet::parse(text) {
            Ok(r) => r,
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "unparseable array_indices_remaining during recovery");
                return;
            }
        }
    };

    let q = parsed.count();
    tracker.state_counts[JobState::Queued.index()] = q;
    tracker.state_counts[JobState::Expired.index()] = tracker.total - q;
    tracker.queued_list = Some(parsed);

    job.attrs.set(AttrId::ArrayIndicesRemaining, AttrValue::Str(text.to_string()));
}

/// Serialize `queued_list` into `array_indices_remaining` and rebuild
/// `array_state_count` from the tracker's counts.
pub fn update_array_indices_remaining_attr(job: &mut Job) {
    let Some(tracker) = &job.tracker else { return };
    let remaining = tracker
        .queued_list
        .as_ref()
        .map(RangeSet::serialize)
        .unwrap_or_else(|| "-".to_string());
    let state_count = format_array_state_count(tracker);
    job.attrs.set(AttrId::ArrayIndicesRemaining, AttrValue::Str(remaining));
    job.attrs.set(AttrId::ArrayStateCount, AttrValue::Str(state_count));
}

/// `"Queued:<q> Running:<r> Exiting:<e> Expired:<x>"`, the fixed order and
/// format `array_state_count` always reports in.
fn format_array_state_count(tracker: &ArrayTracker) -> String {
    format!(
        "Queued:{} Running:{} Exiting:{} Expired:{}",
        tracker.state_counts[JobState::Queued.index()],
        tracker.state_counts[JobState::Running.index()],
        tracker.state_counts[JobState::Exiting.index()],
        tracker.state_counts[JobState::Expired.index()],
    )
}

/// The sole mutator of a parent's tracker. `sjid` is the subjob id the
/// transition applies to (used only to extract its index); `sj` is the
/// subjob's own record, consulted for `exit_status`/`stageout_status` once
/// it reaches a terminal-ish state.
pub fn update_sj_parent(
    parent: &mut Job,
    sj: Option<&Job>,
    sjid: &str,
    old_state: JobState,
    new_state: JobState,
) {
    if old_state == new_state {
        return;
    }
    let Some(index) = crate::array_id::get_index_from_jid(sjid) else { return };

    let Some(tracker) = parent.tracker.as_mut() else { return };

    tracker.state_counts[old_state.index()] = tracker.state_counts[old_state.index()].saturating_sub(1);
    tracker.state_counts[new_state.index()] += 1;

    if old_state == JobState::Queued {
        match tracker.queued_list.as_mut() {
            Some(list) if list.contains(index) => list.remove(index),
            _ => {
                warn!(
                    job_id = %parent.id,
                    index,
                    "subjob left Queued but its index was not in queued_list",
                );
            }
        }
    }
    if new_state == JobState::Queued {
        let step = tracker.step;
        if let Some(list) = tracker.queued_list.as_mut() {
            list.add(index, step);
        }
    }

    update_array_indices_remaining_attr(parent);

    if let Some(sj) = sj {
        if new_state != JobState::Queued {
            join_exit_status(parent, sj);
        }
    }
}

/// Monotonically join a child's `exit_status` into the parent's (invariant
/// 6: 2 if any child went negative, else 1 if any went positive, else 0;
/// never retreats once at 2) and take the max of `stageout_status`.
fn join_exit_status(parent: &mut Job, child: &Job) {
    if let Some(child_status) = child.get_jattr_long(AttrId::ExitStatus) {
        let contribution = if child_status < 0 {
            2
        } else if child_status > 0 {
            1
        } else {
            0
        };
        let current = parent.get_jattr_long(AttrId::ExitStatus).unwrap_or(0);
        let joined = current.max(contribution);
        parent.attrs.set(AttrId::ExitStatus, AttrValue::Long(joined));
    }
    if let Some(child_stageout) = child.get_jattr_long(AttrId::StageoutStatus) {
        let current = parent.get_jattr_long(AttrId::StageoutStatus).unwrap_or(0);
        parent
            .attrs
            .set(AttrId::StageoutStatus, AttrValue::Long(current.max(child_stageout)));
    }
}

/// Tracker-relative attribute writes that bypass the generic action
/// dispatch (see [`crate::job::Job::set_jattr_str_slim`]): used by the
/// subjob factory to stamp `array_id`/`array_index` on a new child with no
/// callback firing.
pub fn set_array_id_internal(job: &mut Job, parent_id: &str, index: u64) {
    job.attrs.set(AttrId::ArrayId, AttrValue::Str(parent_id.to_string()));
    job.attrs.set(AttrId::ArrayIndex, AttrValue::Long(index as i64));
}

/// The number of subjobs still queued: the tracker's `Queued` count for an
/// array parent, `1` for an ordinary job (`get_queued_subjobs_ct` in the
/// original — a job with no array semantics counts as one slot). `Internal`
/// if `job` carries `IS_ARRAY_PARENT` but no tracker, which should not
/// happen.
pub fn get_queued_subjobs_ct(job: &Job) -> Result<i64, ArrayError> {
    if !job.is_array_parent() {
        return Ok(1);
    }
    match &job.tracker {
        Some(tracker) => Ok(tracker.state_counts[JobState::Queued.index()] as i64),
        None => Err(ArrayError::Internal(format!("{} is flagged IS_ARRAY_PARENT with no tracker", job.id))),
    }
}

#[cfg(test)]
#[path = "array_job_tests.rs"]
mod tests;
