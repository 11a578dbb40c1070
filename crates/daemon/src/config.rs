// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server tunables: `max_array_size`, eligible-time accounting, and the
//! credential-renewal knobs from spec.md §4.7. A plain struct with
//! `Default`, overridable from the environment — not a collection of
//! process-wide globals (Design Notes §9's "pass them as context" guidance).

use oj_core::CredRenewTunables;

/// Server-wide default for `max_array_size` (spec.md §4.4 step 3).
pub const DEFAULT_MAX_ARRAY_SIZE: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub max_array_size: u64,
    pub eligible_time_enable: bool,
    pub cred_renew: CredRenewTunables,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            max_array_size: DEFAULT_MAX_ARRAY_SIZE,
            eligible_time_enable: false,
            cred_renew: CredRenewTunables::default(),
        }
    }
}

impl ServerConfig {
    /// Layer `crate::env` overrides on top of the defaults. Invalid
    /// `cred_renew_period`/`cred_renew_cache_period` overrides are logged
    /// and dropped rather than failing startup — same tolerance spec.md §7
    /// asks of the credential renewer itself.
    pub fn from_env() -> Self {
        let mut config = ServerConfig::default();
        if let Some(max) = crate::env::max_array_size() {
            config.max_array_size = max;
        }
        if let Some(enable) = crate::env::eligible_time_enable() {
            config.eligible_time_enable = enable;
        }
        if let Some(enable) = crate::env::cred_renew_enable() {
            config.cred_renew.enabled = enable;
        }
        if let Some(period) = crate::env::cred_renew_period() {
            if let Err(err) = config.cred_renew.set_period(period) {
                tracing::warn!(error = %err, "ignoring invalid OJ_CRED_RENEW_PERIOD");
            }
        }
        if let Some(cache_period) = crate::env::cred_renew_cache_period() {
            if let Err(err) = config.cred_renew.set_cache_period(cache_period) {
                tracing::warn!(error = %err, "ignoring invalid OJ_CRED_RENEW_CACHE_PERIOD");
            }
        }
        config
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
