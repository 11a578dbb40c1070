// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed key -> value attribute store carried by every [`crate::job::Job`].
//!
//! Each attribute has flags (`Set`, `Default`, `Indirect`, `Target`), a
//! cached encoded form invalidated on every write, and — for a handful of
//! attributes — an `action` callback invoked with the mode the write
//! happened under (`New`, `Alter`, `Recov`). The action callbacks that
//! matter here (installing/fixing up the array tracker) are dispatched from
//! [`crate::job::Job`]'s typed setters rather than through a generic
//! function-pointer table, since in practice only `array_indices_submitted`
//! and `array_indices_remaining` carry one.

use crate::error::ArrayError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Every attribute the array job subsystem reads or writes.
///
/// Exhaustive: the set named in spec §3 plus the copied-attribute set used
/// by the subjob factory (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum AttrId {
    Jobname,
    JobOwner,
    RescUsed,
    State,
    InQueue,
    AtServer,
    Account,
    Ctime,
    Errpath,
    Grouplst,
    Join,
    Keep,
    Mtime,
    Mailpnts,
    Mailuser,
    Nodemux,
    Outpath,
    Priority,
    Qtime,
    Remove,
    Rerunable,
    Resource,
    SessionId,
    Shell,
    Sandbox,
    Jobdir,
    Stagein,
    Stageout,
    Substate,
    Userlst,
    Variables,
    Euser,
    Egroup,
    Hashname,
    Hopcount,
    Queuetype,
    Security,
    Etime,
    Refresh,
    Gridname,
    Umask,
    Cred,
    Runcount,
    Pset,
    EligibleTime,
    SampleStarttime,
    AccrueType,
    Executable,
    Arglist,
    ReserveId,
    Project,
    RunVersion,
    TolerateNodeFailures,
    CredId,
    CredValidity,
    SubmitHost,
    Array,
    ArrayId,
    ArrayIndex,
    ArrayIndicesSubmitted,
    ArrayIndicesRemaining,
    ArrayStateCount,
    ExitStatus,
    StageoutStatus,
    Endtime,
    Depend,
    Qrank,
}

/// A tagged attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Long(i64),
    Bool(bool),
    Str(String),
    Size(u64),
    List(Vec<String>),
    ResourceList(HashMap<String, String>),
}

impl AttrValue {
    pub fn as_long(&self) -> Option<i64> {
        match self {
            AttrValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Long(v) => write!(f, "{v}"),
            AttrValue::Bool(v) => write!(f, "{v}"),
            AttrValue::Str(v) => f.write_str(v),
            AttrValue::Size(v) => write!(f, "{v}"),
            AttrValue::List(v) => write!(f, "{}", v.join(",")),
            AttrValue::ResourceList(v) => {
                let mut parts: Vec<String> = v.iter().map(|(k, val)| format!("{k}={val}")).collect();
                parts.sort();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

/// Per-attribute flags (`ATR_VFLAG_*` in the original).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttrFlags(u8);

impl AttrFlags {
    pub const SET: AttrFlags = AttrFlags(1 << 0);
    pub const DEFAULT: AttrFlags = AttrFlags(1 << 1);
    pub const INDIRECT: AttrFlags = AttrFlags(1 << 2);
    pub const TARGET: AttrFlags = AttrFlags(1 << 3);

    pub const fn none() -> Self {
        AttrFlags(0)
    }

    pub fn contains(self, other: AttrFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: AttrFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: AttrFlags) {
        self.0 &= !other.0;
    }
}

impl std::ops::BitOr for AttrFlags {
    type Output = AttrFlags;
    fn bitor(self, rhs: AttrFlags) -> AttrFlags {
        AttrFlags(self.0 | rhs.0)
    }
}

/// The mode under which an attribute write (and its action callback) runs.
///
/// `New` — first submission. `Alter` — a later qalter-style modification.
/// `Recov` — rebuilding state from a persisted record (WAL replay).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrMode {
    New,
    Alter,
    Recov,
}

/// Marks a write as internal: the definition's `action` callback is skipped
/// (used for `array_id`/`array_index` on a freshly cloned subjob, per §4.5
/// step 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetScope {
    Internal,
    Normal,
}

#[derive(Debug, Clone)]
struct AttrEntry {
    value: AttrValue,
    flags: AttrFlags,
    /// Cached encoded form, invalidated on every write.
    encoded: Option<String>,
}

/// Typed key -> value map with dirty tracking and a per-entry encoded-form
/// cache, carried by every [`crate::job::Job`].
#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    entries: HashMap<AttrId, AttrEntry>,
    dirty: std::collections::HashSet<AttrId>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: AttrId) -> Option<&AttrValue> {
        self.entries.get(&id).map(|e| &e.value)
    }

    pub fn get_long(&self, id: AttrId) -> Option<i64> {
        self.get(id).and_then(AttrValue::as_long)
    }

    pub fn get_bool(&self, id: AttrId) -> Option<bool> {
        self.get(id).and_then(AttrValue::as_bool)
    }

    pub fn get_str(&self, id: AttrId) -> Option<&str> {
        self.get(id).and_then(AttrValue::as_str)
    }

    pub fn is_set(&self, id: AttrId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.flags.contains(AttrFlags::SET))
    }

    pub fn flags(&self, id: AttrId) -> AttrFlags {
        self.entries.get(&id).map(|e| e.flags).unwrap_or_default()
    }

    /// Set a value. Marks the attribute dirty and invalidates its cached
    /// encoded form. Does not run any action callback — callers that need
    /// one dispatch it themselves after calling this (see
    /// [`crate::job::Job`]'s typed setters).
    pub fn set(&mut self, id: AttrId, value: AttrValue) {
        self.entries.insert(
            id,
            AttrEntry { value, flags: AttrFlags::SET, encoded: None },
        );
        self.dirty.insert(id);
    }

    /// Set a value while preserving (only) the `Default` bit carried by
    /// `carry_default_from`. Used by the subjob factory, which clones a
    /// parent's value into the child and "carries forward the `Default`
    /// flag bit only" (spec §4.5 step 2).
    pub fn set_carrying_default(&mut self, id: AttrId, value: AttrValue, carry_default_from: AttrFlags) {
        let mut flags = AttrFlags::SET;
        if carry_default_from.contains(AttrFlags::DEFAULT) {
            flags.insert(AttrFlags::DEFAULT);
        }
        self.entries.insert(id, AttrEntry { value, flags, encoded: None });
        self.dirty.insert(id);
    }

    pub fn clear(&mut self, id: AttrId) {
        self.entries.remove(&id);
        self.dirty.insert(id);
    }

    pub fn is_dirty(&self, id: AttrId) -> bool {
        self.dirty.contains(&id)
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    /// Cached encoded form for `id`, computing and storing it via `encode`
    /// if absent.
    pub fn encoded_or_compute(&mut self, id: AttrId, encode: impl FnOnce(&AttrValue) -> String) -> String {
        if let Some(entry) = self.entries.get(&id) {
            if let Some(cached) = &entry.encoded {
                return cached.clone();
            }
            let value = entry.value.clone();
            let encoded = encode(&value);
            if let Some(e) = self.entries.get_mut(&id) {
                e.encoded = Some(encoded.clone());
            }
            return encoded;
        }
        String::new()
    }
}

/// Unknown attribute name lookup, used by name-based access paths (e.g.
/// decoding an `svrattrl` list). Returns `BadAttrValue` for unrecognized
/// names, matching the original's `UnknownAttribute` outcome.
pub fn attr_id_from_name(name: &str) -> Result<AttrId, ArrayError> {
    use AttrId::*;
    Ok(match name {
        "jobname" => Jobname,
        "job_owner" => JobOwner,
        "resc_used" => RescUsed,
        "job_state" => State,
        "in_queue" => InQueue,
        "at_server" => AtServer,
        "account" => Account,
        "ctime" => Ctime,
        "errpath" => Errpath,
        "grouplst" => Grouplst,
        "join" => Join,
        "keep" => Keep,
        "mtime" => Mtime,
        "mailpnts" => Mailpnts,
        "mailuser" => Mailuser,
        "nodemux" => Nodemux,
        "outpath" => Outpath,
        "priority" => Priority,
        "qtime" => Qtime,
        "remove" => Remove,
        "rerunable" => Rerunable,
        "resource" => Resource,
        "session_id" => SessionId,
        "shell" => Shell,
        "sandbox" => Sandbox,
        "jobdir" => Jobdir,
        "stagein" => Stagein,
        "stageout" => Stageout,
        "substate" => Substate,
        "userlst" => Userlst,
        "variables" => Variables,
        "euser" => Euser,
        "egroup" => Egroup,
        "hashname" => Hashname,
        "hopcount" => Hopcount,
        "queuetype" => Queuetype,
        "security" => Security,
        "etime" => Etime,
        "refresh" => Refresh,
        "gridname" => Gridname,
        "umask" => Umask,
        "cred" => Cred,
        "runcount" => Runcount,
        "pset" => Pset,
        "eligible_time" => EligibleTime,
        "sample_starttime" => SampleStarttime,
        "accrue_type" => AccrueType,
        "executable" => Executable,
        "Arglist" => Arglist,
        "reserve_ID" => ReserveId,
        "project" => Project,
        "run_version" => RunVersion,
        "tolerate_node_failures" => TolerateNodeFailures,
        "cred_id" => CredId,
        "cred_validity" => CredValidity,
        "submit_host" => SubmitHost,
        "array" => Array,
        "array_id" => ArrayId,
        "array_index" => ArrayIndex,
        "array_indices_submitted" => ArrayIndicesSubmitted,
        "array_indices_remaining" => ArrayIndicesRemaining,
        "array_state_count" => ArrayStateCount,
        "exit_status" => ExitStatus,
        "stageout_status" => StageoutStatus,
        "endtime" => Endtime,
        "depend" => Depend,
        "qrank" => Qrank,
        other => return Err(ArrayError::BadAttrValue(format!("unknown attribute {other:?}"))),
    })
}

#[cfg(test)]
#[path = "attribute_tests.rs"]
mod tests;
