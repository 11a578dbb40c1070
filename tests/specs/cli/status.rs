// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj status --format json` specs — the machine-readable external
//! interface alongside the human-readable text one (spec.md §6).

use crate::prelude::*;

#[test]
fn json_status_round_trips_through_serde() {
    let ws = Workspace::new();
    ws.oj().args(["submit", "400[].host", "--array", "0-1", "--owner", "dave"]).passes();

    let out = ws.oj().args(["status", "400[].host", "--format", "json"]).passes();
    let value: serde_json::Value = serde_json::from_str(&out.stdout()).expect("status --format json is valid JSON");

    assert_eq!(value["owner"], "dave");
    assert_eq!(value["array"]["total"], 2);
    assert_eq!(value["array"]["remaining"], "0-1");
}

#[test]
fn json_subjob_status_reports_the_synthesized_state() {
    let ws = Workspace::new();
    ws.oj().args(["submit", "401[].host", "--array", "0-1"]).passes();

    let out = ws.oj().args(["subjob-status", "401[].host", "1", "--format", "json"]).passes();
    let value: serde_json::Value = serde_json::from_str(&out.stdout()).expect("valid JSON");
    assert_eq!(value["index"], 1);
    assert_eq!(value["state"], "Q");
}

#[test]
fn status_of_an_unknown_job_fails() {
    Workspace::new().oj().args(["status", "missing.host"]).fails();
}
