// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared scaffolding for the black-box `oj` CLI specs: a throwaway state
//! directory per test and a small fluent wrapper over `assert_cmd` so
//! individual specs read as a sequence of CLI invocations, not process
//! plumbing.

use std::ffi::OsStr;

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use tempfile::TempDir;

/// An isolated `OJ_STATE_DIR` for one test. Dropped (and deleted) at the
/// end of the test function.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Workspace { dir: tempfile::tempdir().expect("create tempdir for workspace") }
    }

    /// Start building an `oj` invocation rooted at this workspace's state
    /// directory, with color output forced off so stdout assertions don't
    /// have to strip ANSI escapes.
    pub fn oj(&self) -> CliRun {
        let mut cmd = Command::cargo_bin("oj").expect("locate oj binary");
        cmd.env("OJ_STATE_DIR", self.dir.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("COLOR");
        CliRun { cmd }
    }
}

/// A single `oj` invocation under construction.
pub struct CliRun {
    cmd: Command,
}

impl CliRun {
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and assert a zero exit status.
    pub fn passes(mut self) -> CliOutput {
        CliOutput { assert: self.cmd.assert().success() }
    }

    /// Run and assert a non-zero exit status.
    pub fn fails(mut self) -> CliOutput {
        CliOutput { assert: self.cmd.assert().failure() }
    }
}

/// The captured result of a finished `oj` invocation.
pub struct CliOutput {
    assert: Assert,
}

impl CliOutput {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stderr).into_owned()
    }

    /// Assert stdout contains `needle` and return self, so checks can chain.
    pub fn stdout_has(self, needle: &str) -> Self {
        let out = self.stdout();
        assert!(out.contains(needle), "expected stdout to contain {needle:?}, got:\n{out}");
        self
    }
}
