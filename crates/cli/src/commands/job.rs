// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj submit` / `run` / `rerun` / `signal` / `delete` / `alter-array` -
//! mutating job table commands. Each dispatches straight into
//! [`oj_daemon::Runtime`] and checkpoints so the change survives the process
//! exiting — there is no long-running daemon process backing this CLI.

use oj_core::JobState;
use oj_daemon::Runtime;

use crate::color;

pub fn submit(
    rt: &mut Runtime,
    id: &str,
    owner: &str,
    queue: &str,
    array: Option<&str>,
) -> anyhow::Result<()> {
    let jid = rt.submit_job(id, owner, queue, array)?;
    rt.checkpoint()?;
    println!("Submitted job {}", color::header(jid.as_str()));
    Ok(())
}

pub fn run(rt: &mut Runtime, parent_id: &str, index: u64) -> anyhow::Result<()> {
    let sjid = rt.run_subjob(parent_id, index)?;
    rt.checkpoint()?;
    println!("Running {}", color::header(sjid.as_str()));
    Ok(())
}

pub fn rerun(rt: &mut Runtime, id: &str) -> anyhow::Result<()> {
    rt.rerun(id)?;
    rt.checkpoint()?;
    println!("Requeued job {}", color::header(id));
    Ok(())
}

pub fn signal(rt: &mut Runtime, id: &str, signal_name: &str) -> anyhow::Result<()> {
    rt.signal(id, signal_name)?;
    println!("Sent {} to job {}", color::muted(signal_name), color::header(id));
    Ok(())
}

pub fn delete(rt: &mut Runtime, id: &str) -> anyhow::Result<()> {
    rt.delete(id)?;
    rt.checkpoint()?;
    println!("Deleted job {}", color::header(id));
    Ok(())
}

pub fn alter_array(rt: &mut Runtime, id: &str, array_indices: &str) -> anyhow::Result<()> {
    rt.alter_array(id, array_indices)?;
    rt.checkpoint()?;
    println!("Altered array {} to {}", color::header(id), array_indices);
    Ok(())
}

/// `oj finish`: drive a running (sub)job through `Exiting` to `Finished`,
/// carrying its exit (and stage-out) status into the parent join
/// (spec.md §4.4 step 6). Stands in for the execution host reporting job
/// completion (spec.md §1's Non-goals exclude real resource negotiation).
pub fn finish(
    rt: &mut Runtime,
    id: &str,
    exit_status: i64,
    stageout_status: Option<i64>,
) -> anyhow::Result<()> {
    rt.transition(id, JobState::Exiting, None, None)?;
    rt.transition(id, JobState::Finished, Some(exit_status), stageout_status)?;
    rt.checkpoint()?;
    println!("Finished job {} (exit {})", color::header(id), exit_status);
    Ok(())
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
