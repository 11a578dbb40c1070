// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj`: a small local-exercise CLI over [`oj_daemon::Runtime`].
//!
//! There is no client/server split here (SPEC_FULL.md §2's "no real network
//! listener or wire codec") — each invocation opens the on-disk job table
//! directly, applies one command, and checkpoints before exiting.

mod color;
mod commands;
mod exit_error;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use oj_daemon::{Runtime, ServerConfig};

use commands::status::OutputFormat;

#[derive(Parser)]
#[command(
    name = "oj",
    version = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH")),
    about = "Array job workload manager CLI",
    styles = color::styles()
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a new job, optionally as an array parent.
    Submit {
        id: String,
        #[arg(long, default_value = "submitter")]
        owner: String,
        #[arg(long, default_value = "workq")]
        queue: String,
        /// Array index expression, e.g. `0-9999:2`.
        #[arg(long = "array")]
        array: Option<String>,
    },
    /// Materialize and run one subjob of an array parent.
    Run {
        parent_id: String,
        index: u64,
    },
    /// Requeue a (sub)job.
    Rerun {
        id: String,
    },
    /// Deliver a signal to a job.
    Signal {
        id: String,
        signal: String,
    },
    /// Delete a job (and, for an array parent, its subjobs).
    Delete {
        id: String,
    },
    /// Replace an array parent's submitted index range.
    AlterArray {
        id: String,
        array_indices: String,
    },
    /// Drive a running (sub)job to Finished with the given exit status.
    Finish {
        id: String,
        #[arg(long = "exit-status", default_value_t = 0, allow_hyphen_values = true)]
        exit_status: i64,
        #[arg(long = "stageout-status", allow_hyphen_values = true)]
        stageout_status: Option<i64>,
    },
    /// Show a job's status, including array tracker state.
    Status {
        id: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show the synthesized status of a single array index.
    SubjobStatus {
        parent_id: String,
        index: u64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn run(cli: Cli, rt: &mut Runtime) -> anyhow::Result<()> {
    match cli.command {
        Command::Submit { id, owner, queue, array } => {
            commands::job::submit(rt, &id, &owner, &queue, array.as_deref())
        }
        Command::Run { parent_id, index } => commands::job::run(rt, &parent_id, index).map(|_| ()),
        Command::Rerun { id } => commands::job::rerun(rt, &id),
        Command::Signal { id, signal } => commands::job::signal(rt, &id, &signal),
        Command::Delete { id } => commands::job::delete(rt, &id),
        Command::AlterArray { id, array_indices } => commands::job::alter_array(rt, &id, &array_indices),
        Command::Finish { id, exit_status, stageout_status } => {
            commands::job::finish(rt, &id, exit_status, stageout_status)
        }
        Command::Status { id, format } => commands::status::handle(rt, &id, format),
        Command::SubjobStatus { parent_id, index, format } => {
            commands::status::handle_subjob(rt, &parent_id, index, format)
        }
    }
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let base_dir = match oj_daemon::env::state_dir() {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let mut rt = match Runtime::open(&base_dir, ServerConfig::from_env()) {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli, &mut rt) {
        let code = err.downcast_ref::<ExitError>().map(|e| e.code).unwrap_or(1);
        eprintln!("error: {err}");
        std::process::exit(code);
    }
}
