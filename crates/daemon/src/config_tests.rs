// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
fn defaults_match_spec_constants() {
    let config = ServerConfig::default();
    assert_eq!(config.max_array_size, DEFAULT_MAX_ARRAY_SIZE);
    assert!(config.cred_renew.enabled);
    assert_eq!(config.cred_renew.period, oj_core::cred_renew::SVR_RENEW_PERIOD_DEFAULT);
}

#[test]
#[serial]
fn from_env_applies_max_array_size_override() {
    std::env::set_var("OJ_MAX_ARRAY_SIZE", "42");
    let config = ServerConfig::from_env();
    assert_eq!(config.max_array_size, 42);
    std::env::remove_var("OJ_MAX_ARRAY_SIZE");
}

#[test]
#[serial]
fn from_env_drops_invalid_cred_renew_period_and_keeps_default() {
    std::env::set_var("OJ_CRED_RENEW_PERIOD", "1");
    let config = ServerConfig::from_env();
    assert_eq!(config.cred_renew.period, oj_core::cred_renew::SVR_RENEW_PERIOD_DEFAULT);
    std::env::remove_var("OJ_CRED_RENEW_PERIOD");
}
