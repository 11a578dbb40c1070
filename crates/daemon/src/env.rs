// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.
//!
//! Mirrors spec.md §6's "Environment input": the real server reads
//! `<root>/server_priv/db_password` and `<root>/server_priv/db_user` for its
//! database credentials (out of scope here — DB row mapping is an external
//! collaborator). What this crate actually persists, the event-sourced job
//! table, lives under the same kind of server-root directory.

use std::path::PathBuf;

/// Root directory for persisted state: `OJ_STATE_DIR` if set, else
/// `XDG_STATE_HOME/oj`, else `~/.local/state/oj`.
pub fn state_dir() -> Result<PathBuf, std::io::Error> {
    if let Ok(dir) = std::env::var("OJ_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("oj"));
    }
    dirs::home_dir()
        .map(|home| home.join(".local/state/oj"))
        .ok_or_else(|| std::io::Error::other("could not resolve a home directory"))
}

/// `server_priv/db_password`-style path under the state root, kept only as
/// the documented external-collaborator contract (spec.md §6); this crate
/// never reads its contents.
pub fn db_password_path(root: &std::path::Path) -> PathBuf {
    root.join("server_priv").join("db_password")
}

pub fn db_user_path(root: &std::path::Path) -> PathBuf {
    root.join("server_priv").join("db_user")
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_i64(name: &str) -> Option<i64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| match v.as_str() {
        "1" | "true" | "TRUE" => Some(true),
        "0" | "false" | "FALSE" => Some(false),
        _ => None,
    })
}

/// `max_array_size` override (`OJ_MAX_ARRAY_SIZE`).
pub fn max_array_size() -> Option<u64> {
    env_u64("OJ_MAX_ARRAY_SIZE")
}

/// `cred_renew_enable` override (`OJ_CRED_RENEW_ENABLE`).
pub fn cred_renew_enable() -> Option<bool> {
    env_bool("OJ_CRED_RENEW_ENABLE")
}

/// `cred_renew_period` override, seconds (`OJ_CRED_RENEW_PERIOD`).
pub fn cred_renew_period() -> Option<i64> {
    env_i64("OJ_CRED_RENEW_PERIOD")
}

/// `cred_renew_cache_period` override, seconds (`OJ_CRED_RENEW_CACHE_PERIOD`).
pub fn cred_renew_cache_period() -> Option<i64> {
    env_i64("OJ_CRED_RENEW_CACHE_PERIOD")
}

/// `eligible_time_enable` override (`OJ_ELIGIBLE_TIME_ENABLE`).
pub fn eligible_time_enable() -> Option<bool> {
    env_bool("OJ_ELIGIBLE_TIME_ENABLE")
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
