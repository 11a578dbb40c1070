// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8 boundary cases and scenario 3 ("modify before begun"),
//! exercised as CLI error paths: each of these must fail loudly rather than
//! silently corrupt the tracker.

use crate::prelude::*;

#[test]
fn a_single_index_range_creates_exactly_one_subjob() {
    let ws = Workspace::new();
    ws.oj().args(["submit", "300[].host", "--array", "0-0"]).passes();
    ws.oj()
        .args(["status", "300[].host"])
        .passes()
        .stdout_has("total: 1 (1 queued, 0 running, 0 held, 0 exiting, 0 expired)");

    ws.oj().args(["run", "300[].host", "0"]).passes();
    ws.oj().args(["run", "300[].host", "1"]).fails();
}

#[test]
fn alter_before_the_parent_begins_replaces_the_tracker() {
    let ws = Workspace::new();
    ws.oj().args(["submit", "301[].host", "--array", "0-3"]).passes();

    ws.oj()
        .args(["alter-array", "301[].host", "0-9:2"])
        .passes()
        .stdout_has("Altered array");
    ws.oj()
        .args(["status", "301[].host"])
        .passes()
        .stdout_has("total: 5 (5 queued, 0 running, 0 held, 0 exiting, 0 expired)");
}

#[test]
fn alter_after_the_parent_has_begun_is_rejected() {
    let ws = Workspace::new();
    ws.oj().args(["submit", "302[].host", "--array", "0-3"]).passes();
    ws.oj().args(["run", "302[].host", "0"]).passes();

    let result = ws.oj().args(["alter-array", "302[].host", "0-9"]).fails();
    assert!(
        result.stderr().contains("cannot modify array job once it has begun running"),
        "expected a ModifyWhileRunning message, got:\n{}",
        result.stderr()
    );
}

#[test]
fn running_an_index_outside_the_submitted_range_is_rejected() {
    let ws = Workspace::new();
    ws.oj().args(["submit", "303[].host", "--array", "0-3"]).passes();

    ws.oj().args(["run", "303[].host", "9"]).fails();
}

#[test]
fn rerunning_an_unknown_job_fails() {
    let ws = Workspace::new();
    ws.oj().args(["rerun", "does-not-exist.host"]).fails();
}
