// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §8 scenario 2 — mixed exit statuses: the parent's `exit_status`
//! is the monotone join over children (invariant 6), so a single negative
//! child exit dominates a later positive one.

use crate::prelude::*;

#[test]
fn negative_child_exit_dominates_the_parent() {
    let ws = Workspace::new();
    ws.oj().args(["submit", "100[].host", "--array", "0-2"]).passes();

    ws.oj().args(["run", "100[].host", "0"]).passes();
    ws.oj().args(["finish", "100[0].host", "--exit-status", "1"]).passes();
    ws.oj().args(["status", "100[].host"]).passes().stdout_has("Exit status: 1");

    ws.oj().args(["run", "100[].host", "1"]).passes();
    ws.oj().args(["finish", "100[1].host", "--exit-status", "-5"]).passes();
    ws.oj().args(["status", "100[].host"]).passes().stdout_has("Exit status: 2");

    ws.oj().args(["run", "100[].host", "2"]).passes();
    ws.oj().args(["finish", "100[2].host", "--exit-status", "0"]).passes();

    // Once joined to 2, a later zero-exit child must never retreat it
    // (invariant 6: monotone join, 2 never retreats).
    ws.oj()
        .args(["status", "100[].host"])
        .passes()
        .stdout_has("State: F")
        .stdout_has("Exit status: 2");
}
