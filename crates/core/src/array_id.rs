// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identity and the structural parsing that distinguishes an ordinary
//! job id from an array parent/subjob/range id.
//!
//! A job id has the form `<numeric>[.<suffix>]` for an ordinary job, or
//! carries a bracketed index expression for array jobs: `123[].host` (the
//! parent), `123[7].host` (a subjob), `123[0-9].host` (a range reference).
//! Unlike [`crate::clock`]'s random instance ids, a `JobId` is a thin
//! wrapper over the string itself — it has to stay structurally
//! addressable, not just unique.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a job or subjob, in PBS's bracketed-index syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        JobId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        JobId(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        JobId(s)
    }
}

impl std::borrow::Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// What [`is_job_array`] sees in a job id's bracket contents.
///
/// Purely syntactic: a malformed index or range inside the brackets is not
/// detected here, matching the original's caveat that this classifier never
/// validates numeric content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    No,
    Parent,
    Single,
    Range,
}

fn bracket_span(id: &str) -> Option<(usize, usize)> {
    let open = id.find('[')?;
    let close_rel = id[open..].find(']')?;
    Some((open, open + close_rel))
}

/// Classify `id` by its bracket contents. A syntactic check only.
pub fn is_job_array(id: &str) -> ArrayKind {
    let Some((open, close)) = bracket_span(id) else {
        return ArrayKind::No;
    };
    let inner = &id[open + 1..close];
    if inner.is_empty() {
        ArrayKind::Parent
    } else if inner.contains('-') {
        ArrayKind::Range
    } else {
        ArrayKind::Single
    }
}

/// The bracket contents of a `Range`-kind id (e.g. `"0-9"` out of
/// `123[0-9].host`), or `None` for any other kind.
pub fn get_range_from_jid(id: &str) -> Option<&str> {
    match is_job_array(id) {
        ArrayKind::Range => {
            let (open, close) = bracket_span(id)?;
            Some(&id[open + 1..close])
        }
        _ => None,
    }
}

/// The parsed index of a `Single`-kind id, or `None` for any other kind or
/// an unparseable index.
pub fn get_index_from_jid(id: &str) -> Option<u64> {
    match is_job_array(id) {
        ArrayKind::Single => {
            let (open, close) = bracket_span(id)?;
            id[open + 1..close].parse().ok()
        }
        _ => None,
    }
}

/// Derive a subjob's parent id by emptying its bracket contents:
/// `123[7].host` -> `123[].host`.
pub fn find_arrayparent(subjob_id: &str) -> Option<JobId> {
    let (open, close) = bracket_span(subjob_id)?;
    let mut parent = String::with_capacity(subjob_id.len());
    parent.push_str(&subjob_id[..=open]);
    parent.push_str(&subjob_id[close..]);
    Some(JobId::new(parent))
}

/// Build a subjob id for `index` from a parent id: `123[].host` ->
/// `123[7].host`.
pub fn create_subjob_id(parent: &JobId, index: u64) -> Option<JobId> {
    let id = parent.as_str();
    let (open, close) = bracket_span(id)?;
    let mut out = String::with_capacity(id.len() + 8);
    out.push_str(&id[..=open]);
    out.push_str(&index.to_string());
    out.push_str(&id[close..]);
    Some(JobId::new(out))
}

#[cfg(test)]
#[path = "array_id_tests.rs"]
mod tests;
