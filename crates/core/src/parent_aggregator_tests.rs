// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::array_job::install_tracker;
use crate::attribute::AttrMode;
use crate::job::JobFlags;

#[derive(Default)]
struct RecordingEffects {
    checked_block: u32,
    hooks_run: u32,
    accounting: Vec<i64>,
    mailed: u32,
    depend_fired: u32,
    history: u32,
}

impl EndOfJobEffects for RecordingEffects {
    fn check_block(&mut self, _parent: &Job) {
        self.checked_block += 1;
    }
    fn run_end_job_hooks(&mut self, _parent: &Job) {
        self.hooks_run += 1;
    }
    fn emit_accounting(&mut self, _parent: &Job, exit_status: i64) {
        self.accounting.push(exit_status);
    }
    fn mail_end(&mut self, _parent: &Job) {
        self.mailed += 1;
    }
    fn depend_on_term(&mut self, _parent: &Job) {
        self.depend_fired += 1;
    }
    fn save_or_purge_history(&mut self, _parent: &Job) {
        self.history += 1;
    }
}

fn drained_parent() -> Job {
    let mut job = Job::builder("1[].host").state(JobState::Running).build();
    job.flags.insert(JobFlags::IS_ARRAY_PARENT);
    install_tracker(&mut job, "0-1", AttrMode::New, 10_000).unwrap();
    job.set_state(JobState::Beginning);
    // drain both subjobs to Finished via the tracker's own accounting
    let tracker = job.tracker.as_mut().unwrap();
    tracker.state_counts[JobState::Queued.index()] = 0;
    tracker.state_counts[JobState::Finished.index()] = 2;
    job
}

#[test]
fn doneness_runs_when_fully_drained() {
    let mut parent = drained_parent();
    let mut effects = RecordingEffects::default();
    let ran = chk_array_doneness(&mut parent, 99_999, &mut effects);
    assert!(ran);
    assert_eq!(parent.state, JobState::Finished);
    assert_eq!(parent.get_jattr_long(AttrId::Endtime), Some(99_999));
    assert_eq!(effects.hooks_run, 1);
    assert_eq!(effects.mailed, 1);
    assert_eq!(effects.accounting, vec![0]);
    assert_eq!(effects.history, 1);
}

#[test]
fn doneness_does_not_rerun_once_chk_array_flag_set() {
    let mut parent = drained_parent();
    let mut effects = RecordingEffects::default();
    assert!(chk_array_doneness(&mut parent, 1, &mut effects));
    let ran_again = chk_array_doneness(&mut parent, 2, &mut effects);
    assert!(!ran_again);
    assert_eq!(effects.hooks_run, 1);
}

#[test]
fn doneness_does_not_fire_while_subjobs_still_active() {
    let mut parent = Job::builder("1[].host").state(JobState::Running).build();
    parent.flags.insert(JobFlags::IS_ARRAY_PARENT);
    install_tracker(&mut parent, "0-1", AttrMode::New, 10_000).unwrap();
    let mut effects = RecordingEffects::default();
    let ran = chk_array_doneness(&mut parent, 1, &mut effects);
    assert!(!ran);
    assert_eq!(effects.hooks_run, 0);
}

#[test]
fn doneness_no_op_without_tracker() {
    let mut parent = Job::builder("1.host").build();
    let mut effects = RecordingEffects::default();
    assert!(!chk_array_doneness(&mut parent, 1, &mut effects));
}

#[test]
fn doneness_skips_end_job_side_effects_if_never_began() {
    let mut parent = Job::builder("1[].host").state(JobState::Queued).build();
    parent.flags.insert(JobFlags::IS_ARRAY_PARENT);
    install_tracker(&mut parent, "0-1", AttrMode::New, 10_000).unwrap();
    let tracker = parent.tracker.as_mut().unwrap();
    tracker.state_counts[JobState::Queued.index()] = 0;
    tracker.state_counts[JobState::Expired.index()] = 2;

    let mut effects = RecordingEffects::default();
    let ran = chk_array_doneness(&mut parent, 1, &mut effects);
    assert!(ran);
    assert_eq!(effects.hooks_run, 0);
    assert_eq!(parent.state, JobState::Queued);
}

#[test]
fn doneness_fires_depend_hook_when_depend_set() {
    let mut parent = drained_parent();
    parent.attrs.set(AttrId::Depend, AttrValue::Str("afterok:2.host".to_string()));
    let mut effects = RecordingEffects::default();
    chk_array_doneness(&mut parent, 1, &mut effects);
    assert_eq!(effects.depend_fired, 1);
}

#[test]
fn synthesize_state_queued_when_still_in_queued_list() {
    let mut parent = Job::builder("1[].host").state(JobState::Queued).build();
    parent.flags.insert(JobFlags::IS_ARRAY_PARENT);
    install_tracker(&mut parent, "0-3", AttrMode::New, 10_000).unwrap();
    assert_eq!(synthesize_state(&parent, 2), (JobState::Queued, JobState::Queued));
}

#[test]
fn synthesize_state_expired_when_left_queued_and_parent_not_finished() {
    let mut parent = Job::builder("1[].host").state(JobState::Running).build();
    parent.flags.insert(JobFlags::IS_ARRAY_PARENT);
    install_tracker(&mut parent, "0-3", AttrMode::New, 10_000).unwrap();
    parent.tracker.as_mut().unwrap().queued_list.as_mut().unwrap().remove(2);
    assert_eq!(synthesize_state(&parent, 2), (JobState::Expired, JobState::Finished));
}

#[test]
fn synthesize_state_finished_when_parent_finished() {
    let mut parent = Job::builder("1[].host").state(JobState::Finished).build();
    parent.flags.insert(JobFlags::IS_ARRAY_PARENT);
    install_tracker(&mut parent, "0-3", AttrMode::New, 10_000).unwrap();
    parent.tracker.as_mut().unwrap().queued_list.as_mut().unwrap().remove(2);
    assert_eq!(synthesize_state(&parent, 2), (JobState::Finished, JobState::Finished));
}

#[test]
fn get_subjob_and_state_returns_live_subjob_when_found() {
    let mut parent = Job::builder("1[].host").state(JobState::Running).build();
    parent.flags.insert(JobFlags::IS_ARRAY_PARENT);
    install_tracker(&mut parent, "0-3", AttrMode::New, 10_000).unwrap();
    let live = Job::builder("1[2].host").state(JobState::Running).build();

    let (found, state, substate) = get_subjob_and_state(&parent, 2, |id| {
        if id == "1[2].host" { Some(&live) } else { None }
    });
    assert!(found.is_some());
    assert_eq!(state, JobState::Running);
    assert_eq!(substate, JobState::Running);
}

#[test]
fn get_subjob_and_state_synthesizes_when_absent() {
    let mut parent = Job::builder("1[].host").state(JobState::Running).build();
    parent.flags.insert(JobFlags::IS_ARRAY_PARENT);
    install_tracker(&mut parent, "0-3", AttrMode::New, 10_000).unwrap();

    let (found, state, substate) = get_subjob_and_state(&parent, 2, |_| None);
    assert!(found.is_none());
    assert_eq!(state, JobState::Queued);
    assert_eq!(substate, JobState::Queued);
}

#[test]
fn get_subjob_and_state_out_of_range_index() {
    let mut parent = Job::builder("1[].host").state(JobState::Running).build();
    parent.flags.insert(JobFlags::IS_ARRAY_PARENT);
    install_tracker(&mut parent, "0-3", AttrMode::New, 10_000).unwrap();

    let (found, state, substate) = get_subjob_and_state(&parent, 99, |_| None);
    assert!(found.is_none());
    assert_eq!(state, JobState::Expired);
    assert_eq!(substate, JobState::Finished);
}
