//! Aggregated warnings for a batch of allocated names.
//!
//! Callers surface one line per repair category: how many names were
//! touched plus a single example, rather than one warning per name.

use std::collections::BTreeMap;
use std::fmt;

use log::warn;

use crate::allocate::UniqueName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningKind {
    ControlCharsRemoved,
    UnicodeRepaired,
    Truncated,
    Defaulted,
    Renumbered,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WarningKind::ControlCharsRemoved => "contained control characters",
            WarningKind::UnicodeRepaired => "contained invalid UTF-8",
            WarningKind::Truncated => "exceeded the length limit",
            WarningKind::Defaulted => "were empty and received a placeholder",
            WarningKind::Renumbered => "collided and were renumbered",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Default)]
struct Tally {
    count: usize,
    example: Option<String>,
}

/// Per-category counts with one example name each.
#[derive(Debug, Clone, Default)]
pub struct WarningSummary {
    categories: BTreeMap<WarningKind, Tally>,
}

impl WarningSummary {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn record(&mut self, result: &UniqueName) {
        let flags = [
            (WarningKind::ControlCharsRemoved, result.is_ascii_cleaned),
            (WarningKind::UnicodeRepaired, result.is_unicode_fixed),
            (WarningKind::Truncated, result.is_truncated),
            (WarningKind::Defaulted, result.is_default),
            (WarningKind::Renumbered, result.is_numbered),
        ];
        for (kind, flagged) in flags {
            if flagged {
                let tally = self.categories.entry(kind).or_default();
                tally.count += 1;
                tally
                    .example
                    .get_or_insert_with(|| result.name.clone());
            }
        }
    }

    pub fn entries(&self) -> Vec<(WarningKind, usize, Option<&str>)> {
        self.categories
            .iter()
            .map(|(kind, tally)| (*kind, tally.count, tally.example.as_deref()))
            .collect()
    }

    /// Emits one `warn!` line per category.
    pub fn log(&self) {
        for (kind, count, example) in self.entries() {
            match example {
                Some(example) => warn!("{count} column name(s) {kind}, e.g. {example:?}"),
                None => warn!("{count} column name(s) {kind}"),
            }
        }
    }
}
