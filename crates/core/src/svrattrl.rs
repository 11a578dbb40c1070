// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The generic attribute-transfer node and the string helpers that feed it.
//!
//! `Svrattrl` is the wire-agnostic shape every attribute crosses a boundary
//! as: a name, an optional resource qualifier, an encoded value, and an
//! operator. Ported from `attr_func.c`'s `svrattrl` handling — sister-chain
//! reference counting becomes an `Rc`-free `Vec<Svrattrl>` here since nothing
//! in this crate shares a single allocation across multiple in-flight
//! requests the way the original's linked batch_request copies did.

use std::cmp::Ordering;

/// The operator a [`Svrattrl`] entry carries (`INCR`/`DECR` only apply to
/// numeric resources; `batch_op_default` trips it to `Set`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    Set,
    Unset,
    Incr,
    Decr,
    Default,
}

/// One `name[.resource] OP value` entry in an attribute-transfer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Svrattrl {
    pub name: String,
    pub resource: Option<String>,
    pub value: String,
    pub op: AttrOp,
}

impl Svrattrl {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Svrattrl { name: name.into(), resource: None, value: value.into(), op: AttrOp::Set }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_op(mut self, op: AttrOp) -> Self {
        self.op = op;
        self
    }

    fn sort_key(&self) -> (&str, &str) {
        (&self.name, self.resource.as_deref().unwrap_or(""))
    }
}

impl PartialOrd for Svrattrl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Svrattrl {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Sort a list in place by `(name, resource)`, the order `attr_func.c`
/// expects before a `compare_svrattrl_list` call.
pub fn sort_svrattrl_list(list: &mut [Svrattrl]) {
    list.sort();
}

/// True if `a` and `b` carry the same set of `(name, resource, value)`
/// triples, ignoring order and ignoring `op`. Mirrors
/// `attr_func.c::compare_svrattrl_list`, which treats the list as a set for
/// equality purposes.
pub fn compare_svrattrl_list(a: &[Svrattrl], b: &[Svrattrl]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a_sorted: Vec<&Svrattrl> = a.iter().collect();
    let mut b_sorted: Vec<&Svrattrl> = b.iter().collect();
    a_sorted.sort_by(|x, y| x.sort_key().cmp(&y.sort_key()));
    b_sorted.sort_by(|x, y| x.sort_key().cmp(&y.sort_key()));
    a_sorted
        .iter()
        .zip(b_sorted.iter())
        .all(|(x, y)| x.sort_key() == y.sort_key() && x.value == y.value)
}

/// The escape character that suppresses delimiter recognition one position
/// ahead of it (`ESC_CHAR` in the original).
const ESC_CHAR: u8 = b'\\';

/// Split a buffer into successive tokens separated by an unescaped `,` or a
/// raw `\n`, trimming the leading/trailing whitespace of each token
/// (`attr_func.c::parse_comma_string`). A backslash immediately before a
/// comma escapes it — the comma is kept as part of the token and not
/// treated as a delimiter — but does not escape a newline. Call repeatedly
/// with the previous return value's continuation, `0` to start; returns
/// `None` once exhausted.
pub fn parse_comma_string(text: &str, start: usize) -> Option<(&str, usize)> {
    if start >= text.len() {
        return None;
    }
    let bytes = text.as_bytes();

    let mut i = start;
    while i < bytes.len() && bytes[i] != b'\n' && (bytes[i] as char).is_whitespace() {
        i += 1;
    }
    let token_start = i;

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'\n' {
            break;
        }
        if c == b',' && (i == token_start || bytes[i - 1] != ESC_CHAR) {
            break;
        }
        i += 1;
    }

    let mut end = i;
    while end > token_start && (bytes[end - 1] as char).is_whitespace() {
        end -= 1;
    }

    let next = if i < bytes.len() { i + 1 } else { i };
    Some((&text[token_start..end], next))
}

/// Tokenize `text` on any byte in `delims`, honoring single- or
/// double-quoted regions that suppress delimiter recognition
/// (`attr_func.c::strtok_quoted`). A quoted run is never split on; its
/// surrounding quote characters are kept in the returned token, matching
/// the original's own worked example (`foo_stra="glad,elated"some`).
pub fn strtok_quoted<'a>(text: &'a str, delims: &str) -> Vec<&'a str> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    let mut token_start = 0;
    let mut in_quotes = false;
    let mut quote_char = 0u8;
    while i < bytes.len() {
        let c = bytes[i];
        if in_quotes {
            if c == quote_char {
                in_quotes = false;
            }
        } else if c == b'"' || c == b'\'' {
            in_quotes = true;
            quote_char = c;
        } else if delims.as_bytes().contains(&c) {
            if i > token_start {
                tokens.push(&text[token_start..i]);
            }
            token_start = i + 1;
        }
        i += 1;
    }
    if token_start < bytes.len() {
        tokens.push(&text[token_start..]);
    }
    tokens
}

/// Join an environment-style `NAME=value` list with the PBS environment
/// separator (`\x01`), escaping any literal separator bytes in a value with
/// a leading backslash, matching `attr_func.c::env_array_to_str`.
pub fn env_array_to_str(vars: &[(String, String)]) -> String {
    const SEP: char = '\u{1}';
    vars.iter()
        .map(|(k, v)| format!("{k}={}", escape_sep(v, SEP)))
        .collect::<Vec<_>>()
        .join(&SEP.to_string())
}

fn escape_sep(value: &str, sep: char) -> String {
    value.chars().flat_map(|c| {
        if c == sep || c == '\\' {
            vec!['\\', c]
        } else {
            vec![c]
        }
    }).collect()
}

/// Remove a single escaping backslash before any `ch` in `text`, leaving
/// other backslashes untouched. Mirrors
/// `attr_func.c::prune_esc_backslash`, which undoes `escape_sep`.
pub fn prune_esc_backslash(text: &str, ch: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == ch || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[path = "svrattrl_tests.rs"]
mod tests;
