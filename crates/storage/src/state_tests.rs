// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::event::WireAttrMode;
use oj_core::{JobId, JobState};

#[test]
fn job_submitted_inserts_job() {
    let mut state = MaterializedState::new();
    state.apply_event(&Event::JobSubmitted {
        id: JobId::new("1.host"),
        owner: "alice".to_string(),
        queue: "workq".to_string(),
        ctime: 1_000,
    });

    let job = state.get_job("1.host").unwrap();
    assert_eq!(job.owner, "alice");
    assert_eq!(job.queue, "workq");
    assert_eq!(job.ctime, 1_000);
}

#[test]
fn job_submitted_is_idempotent() {
    let mut state = MaterializedState::new();
    let event = Event::JobSubmitted {
        id: JobId::new("1.host"),
        owner: "alice".to_string(),
        queue: "workq".to_string(),
        ctime: 1_000,
    };
    state.apply_event(&event);
    state.apply_event(&event);

    assert_eq!(state.jobs.len(), 1);
}

#[test]
fn get_job_resolves_unambiguous_prefix() {
    let mut state = MaterializedState::new();
    state.apply_event(&Event::JobSubmitted {
        id: JobId::new("42.host"),
        owner: "alice".to_string(),
        queue: "workq".to_string(),
        ctime: 1_000,
    });

    assert!(state.get_job("42").is_some());
    assert!(state.get_job("42.host").is_some());
}

#[test]
fn get_job_rejects_ambiguous_prefix() {
    let mut state = MaterializedState::new();
    for id in ["4.host", "42.host"] {
        state.apply_event(&Event::JobSubmitted {
            id: JobId::new(id),
            owner: "alice".to_string(),
            queue: "workq".to_string(),
            ctime: 1_000,
        });
    }

    assert!(state.get_job("4").is_none());
}

#[test]
fn array_installed_attaches_tracker() {
    let mut state = MaterializedState::new();
    state.apply_event(&Event::JobSubmitted {
        id: JobId::new("2[].host"),
        owner: "alice".to_string(),
        queue: "workq".to_string(),
        ctime: 1_000,
    });
    state.apply_event(&Event::ArrayInstalled {
        parent_id: JobId::new("2[].host"),
        text: "0-4".to_string(),
        mode: WireAttrMode::New,
        max_array_size: 100,
    });

    let job = state.get_job("2[].host").unwrap();
    assert!(job.tracker.is_some());
}

#[test]
fn array_installed_on_unknown_job_is_ignored() {
    let mut state = MaterializedState::new();
    state.apply_event(&Event::ArrayInstalled {
        parent_id: JobId::new("9[].host"),
        text: "0-4".to_string(),
        mode: WireAttrMode::New,
        max_array_size: 100,
    });

    assert!(state.get_job("9[].host").is_none());
}

#[test]
fn subjob_materialized_inserts_subjob() {
    let mut state = MaterializedState::new();
    let subjob = oj_core::Job::new(JobId::new("2[3].host"), "alice", "workq", 1_000);
    state.apply_event(&Event::SubjobMaterialized { parent_id: JobId::new("2[].host"), subjob });

    assert!(state.get_job("2[3].host").is_some());
}

#[test]
fn job_state_changed_updates_state() {
    let mut state = MaterializedState::new();
    state.apply_event(&Event::JobSubmitted {
        id: JobId::new("1.host"),
        owner: "alice".to_string(),
        queue: "workq".to_string(),
        ctime: 1_000,
    });
    state.apply_event(&Event::JobStateChanged { id: JobId::new("1.host"), state: JobState::Running });

    assert_eq!(state.get_job("1.host").unwrap().state, JobState::Running);
}

#[test]
fn job_deleted_removes_job() {
    let mut state = MaterializedState::new();
    state.apply_event(&Event::JobSubmitted {
        id: JobId::new("1.host"),
        owner: "alice".to_string(),
        queue: "workq".to_string(),
        ctime: 1_000,
    });
    state.apply_event(&Event::JobDeleted { id: JobId::new("1.host") });

    assert!(state.get_job("1.host").is_none());
}

#[test]
fn subjob_state_changed_updates_subjob_and_parent() {
    let mut state = MaterializedState::new();
    state.apply_event(&Event::JobSubmitted {
        id: JobId::new("2[].host"),
        owner: "alice".to_string(),
        queue: "workq".to_string(),
        ctime: 1_000,
    });
    state.apply_event(&Event::ArrayInstalled {
        parent_id: JobId::new("2[].host"),
        text: "0-1".to_string(),
        mode: WireAttrMode::New,
        max_array_size: 100,
    });
    let subjob = oj_core::Job::new(JobId::new("2[0].host"), "alice", "workq", 1_000);
    state.apply_event(&Event::SubjobMaterialized { parent_id: JobId::new("2[].host"), subjob });

    state.apply_event(&Event::SubjobStateChanged {
        parent_id: JobId::new("2[].host"),
        subjob_id: JobId::new("2[0].host"),
        old_state: JobState::Running,
        new_state: JobState::Exiting,
        child_exit_status: Some(0),
        child_stageout_status: Some(0),
    });

    assert_eq!(state.get_job("2[0].host").unwrap().state, JobState::Exiting);
}

#[test]
fn cred_renew_scheduled_does_not_mutate_jobs() {
    let mut state = MaterializedState::new();
    state.apply_event(&Event::CredRenewScheduled { job_id: JobId::new("1.host"), run_at: 5_000 });

    assert!(state.jobs.is_empty());
}

#[test]
fn shutdown_does_not_mutate_jobs() {
    let mut state = MaterializedState::new();
    state.apply_event(&Event::Shutdown);

    assert!(state.jobs.is_empty());
}

#[test]
fn state_survives_serde_roundtrip() {
    let mut state = MaterializedState::new();
    state.apply_event(&Event::JobSubmitted {
        id: JobId::new("1.host"),
        owner: "alice".to_string(),
        queue: "workq".to_string(),
        ctime: 1_000,
    });

    let json = serde_json::to_string(&state).unwrap();
    let restored: MaterializedState = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.get_job("1.host").unwrap().owner, "alice");
}
