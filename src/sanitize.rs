//! Single-name sanitization: control-character stripping, UTF-8 repair,
//! and byte-budget truncation.
//!
//! [`clean_bytes`] is the byte-level entry point; raw header bytes from a
//! CSV file may carry mojibake that a `&str` can never represent, so the
//! repair step only has something to do when callers start from bytes.
//! [`clean`] is the convenience wrapper for input that is already valid
//! UTF-8.

use std::borrow::Cow;

use serde::Serialize;
use thiserror::Error;

/// Default cap on the UTF-8 byte length of a column name.
pub const MAX_BYTES_PER_COLUMN_NAME: usize = 100;

/// Smallest byte budget the allocator can work with: one key byte plus
/// room for a `" <n>"` suffix.
pub const MIN_MAX_NAME_BYTES: usize = 4;

#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("maximum name length must be at least {MIN_MAX_NAME_BYTES} bytes, got {0}")]
    TooSmall(usize),
}

/// Rejects byte budgets too small to hold a one-character key plus a
/// numeric suffix. The cleaning functions themselves stay total; callers
/// that accept a configurable budget should validate it here first.
pub fn validate_max_bytes(max_bytes: usize) -> Result<(), BudgetError> {
    if max_bytes < MIN_MAX_NAME_BYTES {
        return Err(BudgetError::TooSmall(max_bytes));
    }
    Ok(())
}

/// Result of sanitizing one candidate name.
///
/// `name` contains no code point below 0x20, is valid UTF-8 by
/// construction, and its byte length never exceeds the budget passed to
/// [`clean`] / [`clean_bytes`]. The flags record which repairs fired so a
/// caller can surface warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanedName {
    pub name: String,
    pub is_ascii_cleaned: bool,
    pub is_unicode_fixed: bool,
    pub is_truncated: bool,
}

/// Sanitizes a string that is already valid UTF-8.
pub fn clean(name: &str, max_bytes: usize) -> CleanedName {
    clean_bytes(name.as_bytes(), max_bytes)
}

/// Sanitizes raw bytes into a usable column name.
pub fn clean_bytes(raw: &[u8], max_bytes: usize) -> CleanedName {
    let (stripped, is_ascii_cleaned) = strip_control_bytes(raw);
    let (repaired, is_unicode_fixed) = repair_utf8(stripped.as_ref());
    let mut name = repaired.into_owned();
    let is_truncated = truncate_to_byte_budget(&mut name, max_bytes);
    CleanedName {
        name,
        is_ascii_cleaned,
        is_unicode_fixed,
        is_truncated,
    }
}

/// Removes bytes in `0x00..=0x1F`, borrowing the input when nothing needs
/// to go. Control characters are single bytes in UTF-8 and never occur
/// inside a multi-byte sequence, so this is safe to do before decoding.
fn strip_control_bytes(raw: &[u8]) -> (Cow<'_, [u8]>, bool) {
    if !raw.iter().any(|b| *b < 0x20) {
        return (Cow::Borrowed(raw), false);
    }
    let kept = raw
        .iter()
        .copied()
        .filter(|b| *b >= 0x20)
        .collect::<Vec<_>>();
    (Cow::Owned(kept), true)
}

/// Decodes bytes as UTF-8, replacing each maximal run of invalid bytes
/// with a single U+FFFD.
///
/// `String::from_utf8_lossy` would emit one replacement character per
/// rejected subsequence, turning a three-byte surrogate encoding into
/// three markers. Users read U+FFFD as "one corruption happened here", so
/// consecutive invalid chunks collapse into one.
fn repair_utf8(raw: &[u8]) -> (Cow<'_, str>, bool) {
    if let Ok(valid) = std::str::from_utf8(raw) {
        return (Cow::Borrowed(valid), false);
    }
    let mut repaired = String::with_capacity(raw.len());
    let mut in_invalid_run = false;
    for chunk in raw.utf8_chunks() {
        if !chunk.valid().is_empty() {
            repaired.push_str(chunk.valid());
            in_invalid_run = false;
        }
        if !chunk.invalid().is_empty() {
            if !in_invalid_run {
                repaired.push(char::REPLACEMENT_CHARACTER);
            }
            in_invalid_run = true;
        }
    }
    (Cow::Owned(repaired), true)
}

/// Shortens `name` to at most `max_bytes` UTF-8 bytes, backing up to the
/// nearest character boundary. Returns whether anything was cut.
pub(crate) fn truncate_to_byte_budget(name: &mut String, max_bytes: usize) -> bool {
    if name.len() <= max_bytes {
        return false;
    }
    let mut cut = max_bytes;
    while !name.is_char_boundary(cut) {
        cut -= 1;
    }
    name.truncate(cut);
    true
}
