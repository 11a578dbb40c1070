// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The subjob factory (§4.5): clones a parent array job into a single
//! materialized subjob, carrying forward the copied-attribute set and
//! expanding the `^array_index^` path template.
//!
//! Ported from `array_func.c::create_subjob`/`subst_array_index`. The
//! original clones by encoding each attribute with `ATR_ENCODE_MOM` and
//! decoding it back into the child so it never shares malloc'd storage with
//! the parent; `AttrValue` is already an owned, `Clone`-able enum here, so
//! the copy step is a direct clone rather than an encode/decode round trip
//! — the effect (independent storage, `Default` bit carried forward) is the
//! same.

use crate::array_id::{self, JobId};
use crate::array_job;
use crate::attribute::{AttrId, AttrValue};
use crate::clock::Clock;
use crate::error::ArrayError;
use crate::job::{Job, JobFlags, JobState};

/// The literal token `^array_index^` substituted in `outpath`/`errpath`.
pub const ARRAY_INDEX_TAG: &str = "^array_index^";

/// Substate a freshly-cloned subjob starts in before `svr_setjobstate`
/// drives it to `(Queued, Queued)` (`JOB_SUBSTATE_TRANSICM` in the
/// original).
pub const SUBSTATE_TRANSICM: i32 = 9997;

/// Substate `svr_setjobstate` lands on for `(Queued, Queued)`
/// (`JOB_SUBSTATE_QUEUED` in the original).
pub const SUBSTATE_QUEUED: i32 = 10;

/// Substate a parent lands on once `chk_array_doneness` finds every child
/// drained and moves it to `Finished` (`JOB_SUBSTATE_FINISHED` in the
/// original).
pub const SUBSTATE_FINISHED: i32 = 92;

/// Every attribute id copied verbatim from parent to subjob (spec §4.5,
/// `array_func.c`'s `attrs_to_copy`). Exhaustive.
pub const COPIED_ATTRS: &[AttrId] = &[
    AttrId::Jobname,
    AttrId::JobOwner,
    AttrId::RescUsed,
    AttrId::State,
    AttrId::InQueue,
    AttrId::AtServer,
    AttrId::Account,
    AttrId::Ctime,
    AttrId::Errpath,
    AttrId::Grouplst,
    AttrId::Join,
    AttrId::Keep,
    AttrId::Mtime,
    AttrId::Mailpnts,
    AttrId::Mailuser,
    AttrId::Nodemux,
    AttrId::Outpath,
    AttrId::Priority,
    AttrId::Qtime,
    AttrId::Remove,
    AttrId::Rerunable,
    AttrId::Resource,
    AttrId::SessionId,
    AttrId::Shell,
    AttrId::Sandbox,
    AttrId::Jobdir,
    AttrId::Stagein,
    AttrId::Stageout,
    AttrId::Substate,
    AttrId::Userlst,
    AttrId::Variables,
    AttrId::Euser,
    AttrId::Egroup,
    AttrId::Hashname,
    AttrId::Hopcount,
    AttrId::Queuetype,
    AttrId::Security,
    AttrId::Etime,
    AttrId::Refresh,
    AttrId::Gridname,
    AttrId::Umask,
    AttrId::Cred,
    AttrId::Runcount,
    AttrId::Pset,
    AttrId::EligibleTime,
    AttrId::SampleStarttime,
    AttrId::Executable,
    AttrId::Arglist,
    AttrId::ReserveId,
    AttrId::Project,
    AttrId::RunVersion,
    AttrId::TolerateNodeFailures,
    AttrId::CredId,
    AttrId::SubmitHost,
];

/// Dependencies `create_subjob` needs beyond the parent record: something
/// to enqueue the child, and whether eligible-time accounting is enabled
/// server-wide (spec §4.5 step 5).
pub trait SubjobHost {
    /// Enqueue the new subjob. `Err` aborts creation and purges the child,
    /// matching the original's `svr_enquejob` failure path.
    fn enqueue(&mut self, subjob: &Job) -> Result<(), ArrayError>;
}

/// Create subjob `new_jid` from `parent`. Pre-conditions (checked, not
/// assumed): `parent` is flagged `IS_ARRAY_PARENT`; `new_jid` carries a
/// single-index bracket whose index falls on the tracker's stripe.
pub fn create_subjob(
    parent: &Job,
    new_jid: &JobId,
    host: &mut impl SubjobHost,
    clock: &impl Clock,
    eligible_time_enable: bool,
) -> Result<Job, ArrayError> {
    if !parent.is_array_parent() {
        return Err(ArrayError::Ivalreq("parent is not an array job".into()));
    }
    let tracker = parent
        .tracker
        .as_ref()
        .ok_or_else(|| ArrayError::Internal("array parent has no tracker".into()))?;

    let index = array_id::get_index_from_jid(new_jid.as_str())
        .ok_or_else(|| ArrayError::Ivalreq(format!("{new_jid} is not a single subjob id")))?;
    if index < tracker.start || index > tracker.end || (index - tracker.start) % tracker.step != 0 {
        return Err(ArrayError::Ivalreq(format!(
            "index {index} is not on the array's stripe"
        )));
    }

    // Step 1: copy the fixed header verbatim, then overwrite id/file_prefix/parent_ref.
    let mut subjob = Job::new(new_jid.clone(), parent.owner.clone(), parent.queue.clone(), parent.ctime);
    subjob.reservation = parent.reservation.clone();
    subjob.file_prefix = String::new();
    subjob.parent_ref = Some(parent.id.clone());

    // Step 2: copy the attribute set, carrying forward the Default bit only.
    for &id in COPIED_ATTRS {
        if let Some(value) = parent.attrs.get(id) {
            let parent_flags = parent.attrs.flags(id);
            subjob.attrs.set_carrying_default(id, value.clone(), parent_flags);
        }
    }

    // Step 3: array_id/array_index via the internal path (no action callback).
    array_job::set_array_id_internal(&mut subjob, parent.id.as_str(), index);

    // Step 4: flip flags, substate, then drive to (Queued, Queued).
    subjob.flags.remove(JobFlags::IS_ARRAY_PARENT);
    subjob.flags.insert(JobFlags::IS_SUBJOB);
    subjob.substate = SUBSTATE_TRANSICM;
    subjob.state = JobState::Queued;
    subjob.substate = SUBSTATE_QUEUED;

    // Step 5: eligible-time accounting.
    if eligible_time_enable {
        let parent_eligible = parent.get_jattr_long(AttrId::EligibleTime).unwrap_or(0);
        let accruing = parent.get_jattr_long(AttrId::AccrueType) == Some(1);
        let eligible = if accruing {
            let sj_start = subjob.get_jattr_long(AttrId::SampleStarttime).unwrap_or(0);
            let parent_start = parent.get_jattr_long(AttrId::SampleStarttime).unwrap_or(0);
            parent_eligible + (sj_start - parent_start)
        } else {
            parent_eligible
        };
        subjob.attrs.set(AttrId::EligibleTime, AttrValue::Long(eligible));
    }

    // Step 6: qrank <- wallclock millis.
    subjob.attrs.set(AttrId::Qrank, AttrValue::Long(clock.epoch_ms() as i64));

    // Step 7: enqueue; on failure, the subjob is simply dropped (our "purge").
    host.enqueue(&subjob).map_err(|_| ArrayError::Ivalreq("enqueue refused".into()))?;

    // Step 8: expand ^array_index^ in outpath/errpath.
    if let Some(path) = subjob.get_jattr_str(AttrId::Outpath) {
        let expanded = expand_array_index(path, index);
        subjob.attrs.set(AttrId::Outpath, AttrValue::Str(expanded));
    }
    if let Some(path) = subjob.get_jattr_str(AttrId::Errpath) {
        let expanded = expand_array_index(path, index);
        subjob.attrs.set(AttrId::Errpath, AttrValue::Str(expanded));
    }

    Ok(subjob)
}

/// Replace the single occurrence of [`ARRAY_INDEX_TAG`] in `path` with
/// `index`. Returns `path` unchanged if the token is absent.
pub fn expand_array_index(path: &str, index: u64) -> String {
    match path.find(ARRAY_INDEX_TAG) {
        Some(pos) => {
            let mut out = String::with_capacity(path.len());
            out.push_str(&path[..pos]);
            out.push_str(&index.to_string());
            out.push_str(&path[pos + ARRAY_INDEX_TAG.len()..]);
            out
        }
        None => path.to_string(),
    }
}

/// A request carrying a job id target (delete/signal/rerun/run), cloned per
/// subjob by [`dup_for_subjob`]. Models `dup_br_for_subjob`'s data-only
/// concerns in a crate with no real wire `batch_request` type: rewrite the
/// target id, carry caller identity/permissions forward, and track a
/// reference count the caller decrements as each duplicate completes.
#[derive(Debug, Clone)]
pub struct SubjobRequestTemplate {
    pub target: JobId,
    pub caller: String,
    pub perms: u32,
}

/// Clone `req` for `subjob_id`, rewriting only the target. Caller identity
/// and permissions are carried forward unchanged, matching
/// `dup_br_for_subjob`.
pub fn dup_for_subjob(req: &SubjobRequestTemplate, subjob_id: &JobId) -> SubjobRequestTemplate {
    SubjobRequestTemplate { target: subjob_id.clone(), caller: req.caller.clone(), perms: req.perms }
}

#[cfg(test)]
#[path = "subjob_tests.rs"]
mod tests;
