// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end array lifecycle spec — spec.md §8 scenario 1: submit, run,
//! finish a small array and watch the parent drain to completion.

use crate::prelude::*;

#[test]
fn submit_reports_the_full_range_as_queued() {
    let ws = Workspace::new();

    ws.oj()
        .args(["submit", "100[].host", "--array", "0-3"])
        .passes()
        .stdout_has("100[].host");

    ws.oj()
        .args(["status", "100[].host"])
        .passes()
        .stdout_has("total: 4 (4 queued, 0 running, 0 held, 0 exiting, 0 expired)")
        .stdout_has("remaining: 0-3")
        .stdout_has("Queued:4 Running:0 Exiting:0 Expired:0");
}

#[test]
fn running_and_finishing_every_subjob_drains_the_parent() {
    let ws = Workspace::new();
    ws.oj().args(["submit", "100[].host", "--array", "0-3"]).passes();

    for index in 0..4 {
        let sjid = format!("100[{index}].host");
        ws.oj().args(["run", "100[].host", &index.to_string()]).passes().stdout_has(&sjid);
        ws.oj().args(["finish", &sjid, "--exit-status", "0"]).passes();

        let expect_remaining = match index {
            0 => "1-3",
            1 => "2-3",
            2 => "3",
            _ => "-",
        };
        ws.oj()
            .args(["status", "100[].host"])
            .passes()
            .stdout_has(&format!("remaining: {expect_remaining}"));
    }

    ws.oj()
        .args(["status", "100[].host"])
        .passes()
        .stdout_has("State: F")
        .stdout_has("Exit status: 0")
        .stdout_has("remaining: -");
}

#[test]
fn subjob_status_synthesizes_state_without_materializing() {
    let ws = Workspace::new();
    ws.oj().args(["submit", "100[].host", "--array", "0-3"]).passes();

    // Index 2 has never been run: still reported Queued from the tracker's
    // queued_list alone (spec.md §4.6's get_subjob_and_state).
    ws.oj().args(["subjob-status", "100[].host", "2"]).passes().stdout_has("[2] Q");
}

#[test]
fn max_array_size_is_enforced() {
    let ws = Workspace::new();

    ws.oj()
        .env("OJ_MAX_ARRAY_SIZE", "2")
        .args(["submit", "100[].host", "--array", "0-9"])
        .fails();
}
