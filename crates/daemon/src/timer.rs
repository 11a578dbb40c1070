// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal stand-in for the original's `WORK_Timed` queue (spec.md §5): a
//! sorted list of `(run_at, job_id)` pairs, drained from the single main
//! loop rather than fired from real OS timers or threads. The credential
//! renewer is the only consumer in this crate.

use oj_core::{Clock, JobId};

use crate::runtime::{DaemonError, Runtime};

/// Pending one-shot renewal fires, ordered by `run_at` ascending.
#[derive(Debug, Default)]
pub struct TimerWheel {
    pending: Vec<(i64, JobId)>,
}

impl TimerWheel {
    pub fn new() -> Self {
        TimerWheel::default()
    }

    pub fn schedule(&mut self, run_at: i64, job_id: JobId) {
        let pos = self.pending.partition_point(|(t, _)| *t <= run_at);
        self.pending.insert(pos, (run_at, job_id));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every entry whose `run_at <= now`.
    pub fn drain_due(&mut self, now: i64) -> Vec<JobId> {
        let split = self.pending.partition_point(|(t, _)| *t <= now);
        self.pending.drain(..split).map(|(_, id)| id).collect()
    }
}

/// One tick of the credential-renewal timer: sweep for newly-due jobs,
/// schedule them on `wheel`, then fire anything the wheel already has due.
/// Mirrors `svr_renew_creds` rescheduling itself as a work task every
/// `SVR_RENEW_CREDS_TM` while each per-job renewal fires from the wheel at
/// its jittered offset.
pub fn renewal_tick<C: Clock>(runtime: &mut Runtime<C>, wheel: &mut TimerWheel, now_epoch: i64) -> Result<(), DaemonError> {
    for renewal in runtime.cred_renew_sweep()? {
        wheel.schedule(renewal.run_at, renewal.job_id);
    }
    for job_id in wheel.drain_due(now_epoch) {
        runtime.fire_cred_renewal(job_id.as_str());
    }
    Ok(())
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
