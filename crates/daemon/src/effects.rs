// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's [`oj_core::parent_aggregator::EndOfJobEffects`] implementor:
//! the out-of-crate side effects `chk_array_doneness` triggers (accounting,
//! mail, hooks, history/purge) modeled as `tracing` events, matching the
//! teacher's pattern of logging at the seam where a real integration (an
//! SMTP relay, a hook interpreter, the history database) would otherwise
//! sit. None of those integrations are in scope here (spec.md §1).

use oj_core::parent_aggregator::EndOfJobEffects;
use oj_core::Job;

#[derive(Debug, Default)]
pub struct TracingEndOfJobEffects;

impl EndOfJobEffects for TracingEndOfJobEffects {
    fn check_block(&mut self, parent: &Job) {
        tracing::debug!(job_id = %parent.id, "check_block: notifying any waiting interactive submitter");
    }

    fn run_end_job_hooks(&mut self, parent: &Job) {
        tracing::info!(job_id = %parent.id, "running EndJob hooks");
    }

    fn emit_accounting(&mut self, parent: &Job, exit_status: i64) {
        tracing::info!(job_id = %parent.id, exit_status, "accounting: LAST");
        tracing::info!(job_id = %parent.id, exit_status, "accounting: END");
    }

    fn mail_end(&mut self, parent: &Job) {
        tracing::info!(job_id = %parent.id, owner = %parent.owner, "mailing owner: job ended");
    }

    fn depend_on_term(&mut self, parent: &Job) {
        tracing::debug!(job_id = %parent.id, "firing dependency-termination hooks");
    }

    fn save_or_purge_history(&mut self, parent: &Job) {
        tracing::debug!(job_id = %parent.id, "history/purge decision");
    }
}
