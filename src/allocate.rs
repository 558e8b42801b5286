//! Unique-name allocation over a batch of candidate column names.
//!
//! Every name is treated as a `(key, number)` pair parsed from a trailing
//! `"<key> <digits>"` suffix. A per-call reservation map (the blacklist)
//! records which index owns each pair: existing table columns first, then
//! each candidate's own natural pair. Only after every implied slot is
//! reserved does collision resolution run, so a candidate arriving as
//! `"foo 2"` is never silently bumped to `"foo 3"` just because another
//! incoming candidate shares its base key, and repeated imports of the
//! same data renumber nothing.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::sanitize::{self, CleanedName};

/// Stem used when a candidate sanitizes down to the empty string.
pub const DEFAULT_NAME_STEM: &str = "Column";

/// One allocated column name with the repairs that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueName {
    pub name: String,
    pub is_ascii_cleaned: bool,
    pub is_unicode_fixed: bool,
    pub is_truncated: bool,
    /// The candidate was empty and received a positional `"Column N"`.
    pub is_default: bool,
    /// A numeric suffix was added or changed to dodge a collision.
    pub is_numbered: bool,
}

/// key -> (trailing number, or None for a bare key) -> owning index.
/// Index space: existing names occupy `0..existing.len()`, candidates
/// continue from there.
type Blacklist = HashMap<String, HashMap<Option<u64>, usize>>;

/// Sanitizes `candidates` and makes each resulting name unique against
/// `existing` and against the other candidates. Output order matches
/// candidate order; `existing` names are never altered.
pub fn allocate(candidates: &[String], existing: &[String], max_bytes: usize) -> Vec<UniqueName> {
    let cleaned = candidates
        .iter()
        .map(|name| sanitize::clean(name, max_bytes))
        .collect();
    resolve(cleaned, existing, max_bytes)
}

/// Byte-level variant for callers holding raw header fields; invalid
/// UTF-8 is repaired during sanitization.
pub fn allocate_bytes(candidates: &[&[u8]], existing: &[String], max_bytes: usize) -> Vec<UniqueName> {
    let cleaned = candidates
        .iter()
        .map(|raw| sanitize::clean_bytes(raw, max_bytes))
        .collect();
    resolve(cleaned, existing, max_bytes)
}

fn resolve(cleaned: Vec<CleanedName>, existing: &[String], max_bytes: usize) -> Vec<UniqueName> {
    let offset = existing.len();
    let mut blacklist: Blacklist = HashMap::new();

    // Existing columns own their slots outright.
    for (idx, name) in existing.iter().enumerate() {
        let (key, number) = split_trailing_number(name);
        reserve(&mut blacklist, key, number, idx);
    }
    // Candidates with an explicit suffix claim that slot before generic
    // collision resolution runs; first occurrence wins.
    for (i, candidate) in cleaned.iter().enumerate() {
        let (key, number) = split_trailing_number(&candidate.name);
        reserve(&mut blacklist, key, number, offset + i);
    }
    // Empty candidates will materialize as positional placeholders; claim
    // those numbers now so no later column can take them first.
    for (i, candidate) in cleaned.iter().enumerate() {
        if candidate.name.is_empty() {
            let position = (offset + i + 1) as u64;
            reserve(&mut blacklist, DEFAULT_NAME_STEM, Some(position), offset + i);
        }
    }

    let mut allocated = Vec::with_capacity(cleaned.len());
    for (i, candidate) in cleaned.into_iter().enumerate() {
        let index = offset + i;
        let mut is_truncated = candidate.is_truncated;
        let mut is_default = false;
        let mut is_numbered = false;

        let (mut key, number, mut name) = if candidate.name.is_empty() {
            is_default = true;
            let position = (index + 1) as u64;
            (
                DEFAULT_NAME_STEM.to_string(),
                Some(position),
                format!("{DEFAULT_NAME_STEM} {position}"),
            )
        } else {
            let (key, number) = split_trailing_number(&candidate.name);
            let name = match number {
                Some(n) => format!("{key} {n}"),
                None => key.to_string(),
            };
            (key.to_string(), number, name)
        };

        let owner = blacklist
            .get(&key)
            .and_then(|slots| slots.get(&number))
            .copied();
        if owner != Some(index) {
            // Another column owns this slot; search upward for a free
            // number, shrinking the key whenever the suffix would push
            // the name past the byte budget.
            is_numbered = true;
            let mut n = number.map_or(2, |v| v.saturating_add(1));
            loop {
                let suffix = format!(" {n}");
                if key.len() + suffix.len() > max_bytes {
                    let budget = max_bytes.saturating_sub(suffix.len());
                    if sanitize::truncate_to_byte_budget(&mut key, budget) {
                        is_truncated = true;
                    }
                }
                let slots = blacklist.entry(key.clone()).or_default();
                if let Entry::Vacant(slot) = slots.entry(Some(n)) {
                    slot.insert(index);
                    name = format!("{key}{suffix}");
                    break;
                }
                n = n.saturating_add(1);
            }
        }

        allocated.push(UniqueName {
            name,
            is_ascii_cleaned: candidate.is_ascii_cleaned,
            is_unicode_fixed: candidate.is_unicode_fixed,
            is_truncated,
            is_default,
            is_numbered,
        });
    }
    allocated
}

fn reserve(blacklist: &mut Blacklist, key: &str, number: Option<u64>, index: usize) {
    blacklist
        .entry(key.to_string())
        .or_default()
        .entry(number)
        .or_insert(index);
}

/// Splits a name into its key and an optional trailing number.
///
/// The pattern is the *last* run of digits separated from a non-space
/// prefix by exactly one space: `"Amount 2"` -> `("Amount", Some(2))`,
/// `"Amount"` -> `("Amount", None)`, `"2 Amount"` -> `("2 Amount", None)`.
/// Runs longer than 18 digits are treated as part of the key so the
/// upward search can always increment without overflowing.
pub fn split_trailing_number(name: &str) -> (&str, Option<u64>) {
    static TRAILING_NUMBER: OnceLock<Regex> = OnceLock::new();
    let pattern = TRAILING_NUMBER.get_or_init(|| {
        Regex::new(r"(?s)^(.*\S) (\d{1,18})$").expect("trailing-number pattern is valid")
    });
    if let Some(captures) = pattern.captures(name) {
        if let Ok(number) = captures[2].parse::<u64>() {
            let key = captures.get(1).map_or("", |m| m.as_str());
            return (key, Some(number));
        }
    }
    (name, None)
}
