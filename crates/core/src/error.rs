// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds surfaced by the array job subsystem.

use thiserror::Error;

/// Errors the core can report to callers.
///
/// `System` and `Internal` are always recoverable: a caller must return
/// without mutating state and never abort the process. User-visible RPC
/// paths (in `oj-daemon`) translate any variant into a numeric status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArrayError {
    /// Malformed range, unknown attribute, or a type mismatch on set.
    #[error("bad attribute value: {0}")]
    BadAttrValue(String),

    /// Submitted index count exceeds the `max_array_size` tunable.
    #[error("array size {count} exceeds limit {limit}")]
    MaxArraySize { count: u64, limit: u64 },

    /// ALTER attempted on a parent that has left the Queued state.
    #[error("cannot modify array job once it has begun running")]
    ModifyWhileRunning,

    /// Malformed id, missing fields, or enqueue refused.
    #[error("invalid request: {0}")]
    Ivalreq(String),

    /// Allocation or resource failure. Always recoverable by the caller.
    #[error("system error: {0}")]
    System(String),

    /// Invariant violation (e.g. an unparseable subjob id the server built
    /// itself). Logged at error severity; the callback that hit it returns
    /// without mutating state.
    #[error("internal error: {0}")]
    Internal(String),
}
