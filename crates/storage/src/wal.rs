// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only write-ahead log of [`Event`]s, one JSON object per line.
//!
//! Tolerant of a truncated or corrupted tail (a crash mid-write is the
//! common case for an append-only file): [`Wal::open`] keeps every valid
//! line up to the first one that doesn't parse, rotates the original file
//! out to a `.bak` generation (keeping up to three), and rewrites the live
//! file with just the valid prefix.

use crate::event::Event;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of buffered appends that forces [`Wal::needs_flush`] to report
/// true, independent of wall-clock time.
const FLUSH_THRESHOLD: usize = 100;

/// Number of rotated backup generations kept on corruption (`.bak`,
/// `.bak.2`, `.bak.3`).
const MAX_BACKUPS: u8 = 3;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A single durable record: its monotonic sequence number and the event it
/// carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

pub struct Wal {
    path: PathBuf,
    file: File,
    entries: Vec<WalEntry>,
    write_seq: u64,
    processed_seq: u64,
    read_cursor: u64,
    pending: String,
    pending_count: usize,
}

impl Wal {
    /// Open (or create) the log at `path`. `processed_seq` is the sequence
    /// number the caller has already durably folded into a snapshot;
    /// [`Wal::next_unprocessed`] starts handing out entries after it.
    pub fn open(path: &Path, processed_seq: u64) -> Result<Self, WalError> {
        let entries = if path.exists() {
            let raw = std::fs::read(path)?;
            let (valid, corrupt_tail) = parse_prefix(&raw);
            if corrupt_tail {
                rotate_backups(path)?;
                std::fs::write(path.with_extension("bak"), &raw)?;
                rewrite(path, &valid)?;
            }
            valid
        } else {
            File::create(path)?;
            Vec::new()
        };

        let write_seq = entries.last().map(|e| e.seq).unwrap_or(0);
        let file = OpenOptions::new().append(true).open(path)?;

        Ok(Wal {
            path: path.to_path_buf(),
            file,
            entries,
            write_seq,
            processed_seq,
            read_cursor: processed_seq,
            pending: String::new(),
            pending_count: 0,
        })
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Append `event`, assigning it the next sequence number. Buffered in
    /// memory until [`Wal::flush`] is called.
    pub fn append(&mut self, event: &Event) -> Result<u64, WalError> {
        self.write_seq += 1;
        let entry = WalEntry { seq: self.write_seq, event: event.clone() };
        self.pending.push_str(&serde_json::to_string(&entry)?);
        self.pending.push('\n');
        self.pending_count += 1;
        self.entries.push(entry);
        Ok(self.write_seq)
    }

    pub fn flush(&mut self) -> Result<(), WalError> {
        if !self.pending.is_empty() {
            self.file.write_all(self.pending.as_bytes())?;
            self.file.flush()?;
            self.pending.clear();
        }
        self.pending_count = 0;
        Ok(())
    }

    pub fn needs_flush(&self) -> bool {
        self.pending_count >= FLUSH_THRESHOLD
    }

    /// The next entry past the internal read cursor, advancing it. Distinct
    /// from [`Wal::processed_seq`], which only moves on an explicit
    /// [`Wal::mark_processed`] call — a caller can read ahead of what it has
    /// durably applied.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        let next = self.entries.iter().find(|e| e.seq > self.read_cursor).cloned();
        if let Some(entry) = &next {
            self.read_cursor = entry.seq;
        }
        Ok(next)
    }

    pub fn mark_processed(&mut self, seq: u64) {
        if seq > self.processed_seq {
            self.processed_seq = seq;
        }
    }

    pub fn entries_after(&self, seq: u64) -> Result<Vec<WalEntry>, WalError> {
        Ok(self.entries.iter().filter(|e| e.seq > seq).cloned().collect())
    }

    /// Drop every entry with `seq < keep_from` from memory and disk, e.g.
    /// after a snapshot has durably captured everything before it.
    pub fn truncate_before(&mut self, keep_from: u64) -> Result<(), WalError> {
        self.flush()?;
        self.entries.retain(|e| e.seq >= keep_from);
        rewrite(&self.path, &self.entries)?;
        self.file = OpenOptions::new().append(true).open(&self.path)?;
        Ok(())
    }
}

/// Parse `raw` as UTF-8 newline-delimited JSON entries, stopping at the
/// first line that fails to decode (either non-UTF-8 content or invalid
/// JSON). Returns the valid prefix and whether anything was truncated.
fn parse_prefix(raw: &[u8]) -> (Vec<WalEntry>, bool) {
    let text = match std::str::from_utf8(raw) {
        Ok(t) => t,
        Err(valid_up_to) => {
            let (ok, _) = raw.split_at(valid_up_to.valid_up_to());
            let text = std::str::from_utf8(ok).unwrap_or("");
            return parse_lines(text, true);
        }
    };
    parse_lines(text, false)
}

fn parse_lines(text: &str, already_corrupt: bool) -> (Vec<WalEntry>, bool) {
    let mut entries = Vec::new();
    let mut corrupt = already_corrupt;
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<WalEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(_) => {
                corrupt = true;
                break;
            }
        }
    }
    (entries, corrupt)
}

fn rewrite(path: &Path, entries: &[WalEntry]) -> Result<(), WalError> {
    let mut buf = String::new();
    for entry in entries {
        buf.push_str(&serde_json::to_string(entry)?);
        buf.push('\n');
    }
    std::fs::write(path, buf)?;
    Ok(())
}

/// Shift `.bak` -> `.bak.2` -> `.bak.3`, dropping anything past
/// [`MAX_BACKUPS`] generations.
fn rotate_backups(path: &Path) -> Result<(), WalError> {
    for gen in (1..MAX_BACKUPS).rev() {
        let from = backup_path(path, gen);
        let to = backup_path(path, gen + 1);
        if from.exists() {
            std::fs::rename(from, to)?;
        }
    }
    Ok(())
}

fn backup_path(path: &Path, generation: u8) -> PathBuf {
    if generation <= 1 {
        path.with_extension("bak")
    } else {
        path.with_extension(format!("bak.{generation}"))
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
