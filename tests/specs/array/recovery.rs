// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec.md §1's "survives server restart" as seen from outside: this CLI
//! has no long-running daemon process backing it (SPEC_FULL.md §2) — every
//! invocation reopens the on-disk WAL/snapshot pair from scratch. So a
//! sequence of separate `oj` processes against the same `OJ_STATE_DIR` is
//! exactly the restart scenario, not a simulation of it.

use crate::prelude::*;

#[test]
fn tracker_state_survives_a_fresh_process_between_every_command() {
    let ws = Workspace::new();

    // Each ws.oj() call below spawns an independent process; nothing but
    // the state directory on disk carries information forward.
    ws.oj().args(["submit", "200[].host", "--array", "2-3,7", "--owner", "bob"]).passes();

    ws.oj()
        .args(["status", "200[].host"])
        .passes()
        .stdout_has("total: 3 (3 queued, 0 running, 0 held, 0 exiting, 0 expired)")
        .stdout_has("remaining: 2-3,7");

    ws.oj().args(["run", "200[].host", "2"]).passes();
    ws.oj().args(["finish", "200[2].host", "--exit-status", "0"]).passes();

    ws.oj()
        .args(["status", "200[].host"])
        .passes()
        .stdout_has("remaining: 3,7")
        .stdout_has("Queued:2 Running:0 Exiting:0 Expired:1");
}

#[test]
fn checkpoint_truncates_the_wal_without_losing_state() {
    let ws = Workspace::new();
    ws.oj().args(["submit", "201.host", "--owner", "carol"]).passes();
    ws.oj().args(["status", "201.host"]).passes().stdout_has("Owner: carol").stdout_has("State: Q");

    // `submit` already checkpoints; a second, unrelated submission plus
    // status read still reflects both jobs across the on-disk snapshot.
    ws.oj().args(["submit", "202.host", "--owner", "carol"]).passes();
    ws.oj().args(["status", "201.host"]).passes().stdout_has("Owner: carol");
    ws.oj().args(["status", "202.host"]).passes().stdout_has("Owner: carol");
}
