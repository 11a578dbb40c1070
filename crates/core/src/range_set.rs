// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compact representation of a set of non-negative integer indices.
//!
//! Backs `array_indices_submitted`/`array_indices_remaining`: a sorted list
//! of non-overlapping `(low, high, step)` stripes, parsed from and
//! serialized to the grammar `indices := item ("," item)*; item := N | N "-"
//! N [":" N]`.

use crate::error::ArrayError;
use std::fmt;

/// A single arithmetic stripe `low, low+step, low+2*step, ..., high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stripe {
    low: u64,
    high: u64,
    step: u64,
}

impl Stripe {
    fn contains(&self, i: u64) -> bool {
        i >= self.low && i <= self.high && (i - self.low) % self.step == 0
    }

    fn count(&self) -> u64 {
        (self.high - self.low) / self.step + 1
    }
}

/// A sorted, non-overlapping set of integer index stripes.
///
/// Mirrors the original's `range`/`trm_quelist`: membership and removal are
/// `O(log s)` in the number of stripes `s`; `add` may split or merge
/// adjacent stripes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    stripes: Vec<Stripe>,
}

impl RangeSet {
    /// Construct a single-stripe set from `start, end, step`.
    ///
    /// `step == 0` or `start > end` is invalid.
    pub fn new(start: u64, end: u64, step: u64) -> Result<Self, ArrayError> {
        if step == 0 {
            return Err(ArrayError::BadAttrValue("range step must be nonzero".into()));
        }
        if start > end {
            return Err(ArrayError::BadAttrValue("range start must be <= end".into()));
        }
        Ok(Self { stripes: vec![Stripe { low: start, high: end, step }] })
    }

    /// An empty range set.
    pub fn empty() -> Self {
        Self { stripes: Vec::new() }
    }

    /// Parse the grammar `indices := item ("," item)*; item := N | N "-" N [":" N]`.
    ///
    /// The literal `"-"` parses as the empty set.
    pub fn parse(text: &str) -> Result<Self, ArrayError> {
        let text = text.trim();
        if text.is_empty() || text == "-" {
            return Ok(Self::empty());
        }

        let mut stripes = Vec::new();
        for item in text.split(',') {
            let item = item.trim();
            if item.is_empty() {
                return Err(ArrayError::BadAttrValue(format!("empty item in range {text:?}")));
            }
            let stripe = if let Some((lo, rest)) = item.split_once('-') {
                let low: u64 = lo
                    .trim()
                    .parse()
                    .map_err(|_| ArrayError::BadAttrValue(format!("bad low bound in {item:?}")))?;
                let (hi, step) = match rest.split_once(':') {
                    Some((hi, step)) => {
                        let step: u64 = step.trim().parse().map_err(|_| {
                            ArrayError::BadAttrValue(format!("bad step in {item:?}"))
                        })?;
                        (hi, step)
                    }
                    None => (rest, 1),
                };
                let high: u64 = hi
                    .trim()
                    .parse()
                    .map_err(|_| ArrayError::BadAttrValue(format!("bad high bound in {item:?}")))?;
                if step == 0 {
                    return Err(ArrayError::BadAttrValue(format!("zero step in {item:?}")));
                }
                if low > high {
                    return Err(ArrayError::BadAttrValue(format!(
                        "start > end in {item:?}"
                    )));
                }
                Stripe { low, high, step }
            } else {
                let n: u64 = item
                    .parse()
                    .map_err(|_| ArrayError::BadAttrValue(format!("bad index {item:?}")))?;
                Stripe { low: n, high: n, step: 1 }
            };
            stripes.push(stripe);
        }
        stripes.sort_by_key(|s| s.low);
        Ok(Self { stripes: canonicalize(stripes) })
    }

    /// Serialize back to the grammar, canonical (stripes sorted by low,
    /// adjacent compatible stripes merged). The empty set serializes as `"-"`.
    pub fn serialize(&self) -> String {
        if self.stripes.is_empty() {
            return "-".to_string();
        }
        self.stripes
            .iter()
            .map(|s| {
                if s.low == s.high {
                    s.low.to_string()
                } else if s.step == 1 {
                    format!("{}-{}", s.low, s.high)
                } else {
                    format!("{}-{}:{}", s.low, s.high, s.step)
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// True if `i` is a member of this set.
    pub fn contains(&self, i: u64) -> bool {
        self.find_stripe(i).is_some()
    }

    fn find_stripe(&self, i: u64) -> Option<usize> {
        // Stripes are sorted and non-overlapping by `low`; binary search the
        // last stripe whose low <= i, then verify membership.
        let idx = self.stripes.partition_point(|s| s.low <= i);
        if idx == 0 {
            return None;
        }
        let candidate = idx - 1;
        if self.stripes[candidate].contains(i) {
            Some(candidate)
        } else {
            None
        }
    }

    /// Remove `i`. A no-op if `i` is absent.
    pub fn remove(&mut self, i: u64) {
        let Some(idx) = self.find_stripe(i) else { return };
        let s = self.stripes[idx];
        if s.low == s.high {
            self.stripes.remove(idx);
        } else if i == s.low {
            self.stripes[idx].low = s.low + s.step;
        } else if i == s.high {
            self.stripes[idx].high = s.high - s.step;
        } else {
            // Split into a left remainder and a right remainder.
            let left = Stripe { low: s.low, high: i - s.step, step: s.step };
            let right = Stripe { low: i + s.step, high: s.high, step: s.step };
            self.stripes.splice(idx..=idx, [left, right]);
        }
    }

    /// Add `i` with the given step. A no-op if `i` is already present.
    pub fn add(&mut self, i: u64, step: u64) {
        if self.contains(i) {
            return;
        }
        let idx = self.stripes.partition_point(|s| s.low <= i);
        self.stripes.insert(idx, Stripe { low: i, high: i, step: step.max(1) });
        self.stripes.sort_by_key(|s| s.low);
        self.stripes = canonicalize(std::mem::take(&mut self.stripes));
    }

    /// Number of indices across all stripes.
    pub fn count(&self) -> u64 {
        self.stripes.iter().map(|s| s.count()).sum()
    }

    /// True if no indices remain.
    pub fn is_empty(&self) -> bool {
        self.stripes.is_empty()
    }

    /// Smallest index in the set, if any.
    pub fn first(&self) -> Option<u64> {
        self.stripes.first().map(|s| s.low)
    }

    /// Iterate all indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.stripes.iter().flat_map(|s| (s.low..=s.high).step_by(s.step as usize))
    }
}

/// Merge adjacent stripes that share a step and are contiguous
/// (`next.low == prev.high + step`). Assumes `stripes` is sorted by `low`
/// and internally non-overlapping.
fn canonicalize(stripes: Vec<Stripe>) -> Vec<Stripe> {
    let mut out: Vec<Stripe> = Vec::with_capacity(stripes.len());
    for s in stripes {
        if let Some(last) = out.last_mut() {
            if last.step == s.step && s.low == last.high + last.step {
                last.high = s.high;
                continue;
            }
        }
        out.push(s);
    }
    out
}

impl fmt::Display for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

#[cfg(test)]
#[path = "range_set_tests.rs"]
mod tests;
