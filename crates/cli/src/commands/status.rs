// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj status` / `oj subjob-status` - read-only job and array queries

use clap::ValueEnum;
use oj_daemon::Runtime;

use crate::color;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn handle(rt: &Runtime, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let view = rt.status(id)?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        OutputFormat::Text => {
            println!("{} {}", color::header("Job:"), view.id);
            println!("  {} {}", color::context("Owner:"), view.owner);
            println!("  {} {}", color::context("State:"), view.state);
            if let Some(exit_status) = view.exit_status {
                println!("  {} {}", color::context("Exit status:"), exit_status);
            }
            if let Some(array) = &view.array {
                println!();
                println!("  {}", color::header("Array:"));
                println!(
                    "    {} {} ({} queued, {} running, {} held, {} exiting, {} expired)",
                    color::context("total:"),
                    array.total,
                    array.queued,
                    array.running,
                    array.held,
                    array.exiting,
                    array.expired,
                );
                println!("    {} {}", color::context("remaining:"), array.remaining);
                if !array.state_count.is_empty() {
                    println!("    {} {}", color::context("state_count:"), array.state_count);
                }
            }
        }
    }
    Ok(())
}

pub fn handle_subjob(rt: &Runtime, parent_id: &str, index: u64, format: OutputFormat) -> anyhow::Result<()> {
    let state = rt.subjob_status(parent_id, index)?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "parent_id": parent_id,
                "index": index,
                "state": state,
            }))?);
        }
        OutputFormat::Text => {
            println!("{}[{}] {}", color::header(parent_id), index, state);
        }
    }
    Ok(())
}
