// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ojd`: runs the job table service and its credential-renewal sweep.
//!
//! There is no batch-request listener here (SPEC_FULL.md §2) — this binary
//! exists to keep the daemon's state directory warm and demonstrate the
//! renewal sweep firing on its own schedule; real submit/run/rerun/signal/
//! delete traffic in this crate is driven through [`oj_daemon::Runtime`]
//! directly, e.g. from `oj-cli` or a test harness.

use std::time::Duration;

use oj_core::cred_renew::SVR_RENEW_CREDS_TM;
use oj_daemon::{env, renewal_tick, Runtime, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let base_dir = env::state_dir()?;
    let config = ServerConfig::from_env();
    tracing::info!(?base_dir, max_array_size = config.max_array_size, "starting ojd");

    let mut runtime = Runtime::open(&base_dir, config)?;
    let mut wheel = oj_daemon::timer::TimerWheel::new();
    let tick = Duration::from_secs(SVR_RENEW_CREDS_TM as u64);

    let mut interval = tokio::time::interval(tick);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = (std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs()) as i64;
                if let Err(err) = renewal_tick(&mut runtime, &mut wheel, now) {
                    tracing::error!(error = %err, "credential renewal tick failed");
                }
                if let Err(err) = runtime.checkpoint() {
                    tracing::error!(error = %err, "checkpoint failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                runtime.shutdown()?;
                break;
            }
        }
    }

    Ok(())
}
