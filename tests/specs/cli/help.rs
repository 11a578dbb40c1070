// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs — verify the subcommand surface is discoverable.

use crate::prelude::*;

#[test]
fn oj_no_args_shows_usage_and_is_an_error() {
    let result = Workspace::new().oj().fails();
    assert!(result.stderr().contains("Usage:"), "expected usage text, got:\n{}", result.stderr());
}

#[test]
fn oj_help_lists_every_subcommand() {
    Workspace::new()
        .oj()
        .args(["--help"])
        .passes()
        .stdout_has("submit")
        .stdout_has("run")
        .stdout_has("rerun")
        .stdout_has("signal")
        .stdout_has("delete")
        .stdout_has("alter-array")
        .stdout_has("finish")
        .stdout_has("status")
        .stdout_has("subjob-status");
}

#[test]
fn oj_submit_help_shows_usage() {
    Workspace::new().oj().args(["submit", "--help"]).passes().stdout_has("Usage:").stdout_has("--array");
}

#[test]
fn oj_version_reports_the_crate_version() {
    Workspace::new()
        .oj()
        .args(["--version"])
        .passes()
        .stdout_has(env!("CARGO_PKG_VERSION"));
}
