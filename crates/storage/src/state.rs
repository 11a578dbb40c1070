// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state: the live job table, folded from a stream of
//! [`crate::event::Event`]s. Mirrors the teacher's event-sourcing shape —
//! state is derived from facts, never mutated directly by a caller.
//!
//! # Idempotency
//!
//! Every branch of [`MaterializedState::apply_event`] must be idempotent:
//! replaying the same event twice must leave the state exactly as replaying
//! it once would. WAL replay after a crash may deliver an event more than
//! once.

use crate::event::Event;
use oj_core::{array_job, parent_aggregator, AttrValue, Job};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub jobs: HashMap<String, Job>,
}

impl MaterializedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a job by its full id, or by an unambiguous id prefix.
    pub fn get_job(&self, id: &str) -> Option<&Job> {
        if let Some(job) = self.jobs.get(id) {
            return Some(job);
        }
        let mut matches = self.jobs.values().filter(|j| j.id.as_str().starts_with(id));
        let first = matches.next()?;
        if matches.next().is_some() {
            None
        } else {
            Some(first)
        }
    }

    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::JobSubmitted { id, owner, queue, ctime } => {
                self.jobs
                    .entry(id.as_str().to_string())
                    .or_insert_with(|| Job::new(id.clone(), owner.clone(), queue.clone(), *ctime));
            }

            Event::ArrayInstalled { parent_id, text, mode, max_array_size } => {
                if let Some(job) = self.jobs.get_mut(parent_id.as_str()) {
                    if let Err(err) = array_job::install_tracker(job, text, (*mode).into(), *max_array_size) {
                        tracing::warn!(job_id = %parent_id, error = %err, "replay: install_tracker failed");
                    }
                }
            }

            Event::ArrayIndicesRecovered { parent_id, text } => {
                if let Some(job) = self.jobs.get_mut(parent_id.as_str()) {
                    array_job::recovery_fixup(job, text);
                }
            }

            Event::SubjobMaterialized { subjob, .. } => {
                self.jobs.entry(subjob.id.as_str().to_string()).or_insert_with(|| subjob.clone());
            }

            Event::SubjobStateChanged {
                parent_id,
                subjob_id,
                old_state,
                new_state,
                child_exit_status,
                child_stageout_status,
            } => {
                let child_snapshot = child_exit_status.map(|exit_status| {
                    let mut stand_in = Job::new(subjob_id.clone(), String::new(), String::new(), 0);
                    stand_in.attrs.set(oj_core::AttrId::ExitStatus, AttrValue::Long(exit_status));
                    if let Some(stageout) = child_stageout_status {
                        stand_in.attrs.set(oj_core::AttrId::StageoutStatus, AttrValue::Long(*stageout));
                    }
                    stand_in
                });

                if let Some(job) = self.jobs.get_mut(subjob_id.as_str()) {
                    job.set_state(*new_state);
                }
                if let Some(parent) = self.jobs.get_mut(parent_id.as_str()) {
                    array_job::update_sj_parent(
                        parent,
                        child_snapshot.as_ref(),
                        subjob_id.as_str(),
                        *old_state,
                        *new_state,
                    );
                }
            }

            Event::JobStateChanged { id, state } => {
                if let Some(job) = self.jobs.get_mut(id.as_str()) {
                    job.set_state(*state);
                }
            }

            Event::JobDeleted { id } => {
                self.jobs.remove(id.as_str());
            }

            Event::ArrayDoneness { parent_id, endtime: _ } => {
                if let Some(mut job) = self.jobs.remove(parent_id.as_str()) {
                    let mut effects = NoopEndOfJobEffects;
                    parent_aggregator::chk_array_doneness(&mut job, job_ctime_hint(&job), &mut effects);
                    self.jobs.insert(parent_id.as_str().to_string(), job);
                }
            }

            Event::CredRenewScheduled { .. } | Event::Shutdown => {}
        }
    }
}

/// Doneness is replayed for its tracker/attribute side effects only; the
/// out-of-crate effects (mail, accounting, hooks) already ran once, live,
/// before the event was written — replay must not resend them.
struct NoopEndOfJobEffects;
impl parent_aggregator::EndOfJobEffects for NoopEndOfJobEffects {}

fn job_ctime_hint(job: &Job) -> i64 {
    job.ctime
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
