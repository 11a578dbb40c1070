// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use oj_core::{AttrMode, JobId, JobState};

fn roundtrip(event: Event) -> Event {
    let json = serde_json::to_string(&event).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn job_submitted_roundtrips() {
    let event = Event::JobSubmitted {
        id: JobId::new("1.host"),
        owner: "alice".to_string(),
        queue: "workq".to_string(),
        ctime: 1_000,
    };
    match roundtrip(event) {
        Event::JobSubmitted { id, owner, queue, ctime } => {
            assert_eq!(id.as_str(), "1.host");
            assert_eq!(owner, "alice");
            assert_eq!(queue, "workq");
            assert_eq!(ctime, 1_000);
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn array_installed_roundtrips() {
    let event = Event::ArrayInstalled {
        parent_id: JobId::new("2[].host"),
        text: "0-9".to_string(),
        mode: WireAttrMode::New,
        max_array_size: 100,
    };
    match roundtrip(event) {
        Event::ArrayInstalled { parent_id, text, mode, max_array_size } => {
            assert_eq!(parent_id.as_str(), "2[].host");
            assert_eq!(text, "0-9");
            assert_eq!(mode, WireAttrMode::New);
            assert_eq!(max_array_size, 100);
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn wire_attr_mode_converts_to_core_attr_mode() {
    assert!(matches!(AttrMode::from(WireAttrMode::New), AttrMode::New));
    assert!(matches!(AttrMode::from(WireAttrMode::Alter), AttrMode::Alter));
    assert!(matches!(AttrMode::from(WireAttrMode::Recov), AttrMode::Recov));
}

#[test]
fn subjob_state_changed_roundtrips_with_exit_status() {
    let event = Event::SubjobStateChanged {
        parent_id: JobId::new("2[].host"),
        subjob_id: JobId::new("2[3].host"),
        old_state: JobState::Running,
        new_state: JobState::Exiting,
        child_exit_status: Some(0),
        child_stageout_status: Some(0),
    };
    match roundtrip(event) {
        Event::SubjobStateChanged { old_state, new_state, child_exit_status, child_stageout_status, .. } => {
            assert_eq!(old_state, JobState::Running);
            assert_eq!(new_state, JobState::Exiting);
            assert_eq!(child_exit_status, Some(0));
            assert_eq!(child_stageout_status, Some(0));
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn job_deleted_roundtrips() {
    let event = Event::JobDeleted { id: JobId::new("3.host") };
    match roundtrip(event) {
        Event::JobDeleted { id } => assert_eq!(id.as_str(), "3.host"),
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn shutdown_roundtrips() {
    assert!(matches!(roundtrip(Event::Shutdown), Event::Shutdown));
}

#[test]
fn cred_renew_scheduled_roundtrips() {
    let event = Event::CredRenewScheduled { job_id: JobId::new("4.host"), run_at: 12_345 };
    match roundtrip(event) {
        Event::CredRenewScheduled { job_id, run_at } => {
            assert_eq!(job_id.as_str(), "4.host");
            assert_eq!(run_at, 12_345);
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}
