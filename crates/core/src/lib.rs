// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-core: domain library for the array job subsystem — job records, the
//! array tracker, the subjob factory, parent doneness, and credential
//! renewal scheduling. No I/O, no wire format: callers in `oj-storage` and
//! `oj-daemon` supply persistence and transport around these types.

pub mod macros;

pub mod array_id;
pub mod array_job;
pub mod attribute;
pub mod clock;
pub mod cred_renew;
pub mod error;
pub mod job;
pub mod parent_aggregator;
pub mod range_set;
pub mod subjob;
pub mod svrattrl;

pub use array_id::{create_subjob_id, find_arrayparent, get_index_from_jid, get_range_from_jid, is_job_array, ArrayKind, JobId};
pub use array_job::{
    get_queued_subjobs_ct, install_tracker, recovery_fixup, update_array_indices_remaining_attr, update_sj_parent,
    ArrayTracker, TrackerFlags,
};
pub use attribute::{attr_id_from_name, AttrFlags, AttrId, AttrMode, AttributeStore, AttrValue, SetScope};
pub use clock::{Clock, FakeClock, SystemClock};
pub use cred_renew::{is_due_for_renewal, jitter_offset, sweep as cred_renew_sweep, CredRenewTunables, ScheduledRenewal};
pub use error::ArrayError;
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{Job, JobFlags, JobState};
pub use parent_aggregator::{chk_array_doneness, get_subjob_and_state, synthesize_state, EndOfJobEffects};
pub use range_set::RangeSet;
pub use subjob::{create_subjob, dup_for_subjob, expand_array_index, SubjobHost, SubjobRequestTemplate};
pub use svrattrl::{
    compare_svrattrl_list, env_array_to_str, parse_comma_string, prune_esc_backslash, sort_svrattrl_list,
    strtok_quoted, AttrOp, Svrattrl,
};
