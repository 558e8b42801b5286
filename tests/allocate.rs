use std::collections::HashSet;

use colnames::allocate::{allocate, allocate_bytes, split_trailing_number};
use colnames::sanitize::MAX_BYTES_PER_COLUMN_NAME;
use proptest::prelude::*;

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn distinct_names_pass_through_in_order() {
    let results = allocate(
        &names(&["id", "name", "amount"]),
        &[],
        MAX_BYTES_PER_COLUMN_NAME,
    );
    let finals = results.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
    assert_eq!(finals, vec!["id", "name", "amount"]);
    assert!(results.iter().all(|r| !r.is_numbered && !r.is_default));
}

#[test]
fn duplicate_candidates_are_numbered_deterministically() {
    let results = allocate(
        &names(&["foo", "foo", "foo"]),
        &[],
        MAX_BYTES_PER_COLUMN_NAME,
    );
    let finals = results.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
    assert_eq!(finals, vec!["foo", "foo 2", "foo 3"]);
    assert!(!results[0].is_numbered);
    assert!(results[1].is_numbered && results[2].is_numbered);
}

#[test]
fn numbering_skips_slots_reserved_by_existing_columns() {
    let results = allocate(
        &names(&["foo", "foo 2"]),
        &names(&["foo 2", "foo"]),
        MAX_BYTES_PER_COLUMN_NAME,
    );
    let finals = results.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
    assert_eq!(finals, vec!["foo 3", "foo 4"]);
    assert!(results[0].is_numbered && results[1].is_numbered);
}

#[test]
fn reservation_never_displaces_existing_columns() {
    // "foo" is genuinely free here and keeps its name; only the candidate
    // that truly collides gets pushed past the taken numbers.
    let existing = names(&["foo 2", "foo 3"]);
    let results = allocate(&names(&["foo", "foo 2"]), &existing, MAX_BYTES_PER_COLUMN_NAME);
    let finals = results.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
    assert_eq!(finals, vec!["foo", "foo 4"]);
    assert!(!results[0].is_numbered);
    assert!(results[1].is_numbered);

    let mut all = existing.clone();
    all.extend(results.iter().map(|r| r.name.clone()));
    let unique = all.iter().collect::<HashSet<_>>();
    assert_eq!(unique.len(), all.len());
}

#[test]
fn empty_candidate_receives_positional_placeholder() {
    let results = allocate(&names(&[""]), &[], MAX_BYTES_PER_COLUMN_NAME);
    assert_eq!(results[0].name, "Column 1");
    assert!(results[0].is_default);
    assert!(!results[0].is_numbered);
}

#[test]
fn placeholder_position_counts_existing_columns() {
    let results = allocate(
        &names(&[""]),
        &names(&["a", "b"]),
        MAX_BYTES_PER_COLUMN_NAME,
    );
    assert_eq!(results[0].name, "Column 3");
    assert!(results[0].is_default);
}

#[test]
fn placeholder_number_is_reserved_ahead_of_later_columns() {
    // The empty candidate claims "Column 2" before resolution runs, so the
    // explicit "Column 1" keeps its slot and nothing collides.
    let results = allocate(
        &names(&["Column 1", ""]),
        &[],
        MAX_BYTES_PER_COLUMN_NAME,
    );
    let finals = results.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
    assert_eq!(finals, vec!["Column 1", "Column 2"]);
    assert!(!results[1].is_numbered);
}

#[test]
fn placeholder_renumbers_when_its_position_is_taken() {
    let results = allocate(
        &names(&["", "Column 1"]),
        &[],
        MAX_BYTES_PER_COLUMN_NAME,
    );
    let finals = results.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
    assert_eq!(finals, vec!["Column 2", "Column 1"]);
    assert!(results[0].is_default && results[0].is_numbered);
    assert!(!results[1].is_numbered);
}

#[test]
fn key_shrinks_when_suffix_would_bust_the_budget() {
    let results = allocate(&names(&["abcd", "abcd"]), &[], 4);
    let finals = results.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
    assert_eq!(finals, vec!["abcd", "ab 2"]);
    assert!(results[1].is_numbered);
    assert!(results[1].is_truncated);
    assert!(!results[0].is_truncated);
}

#[test]
fn oversized_digit_runs_count_as_part_of_the_key() {
    let name = "x 99999999999999999999999";
    let results = allocate(&names(&[name, name]), &[], MAX_BYTES_PER_COLUMN_NAME);
    assert_eq!(results[0].name, name);
    assert_eq!(results[1].name, format!("{name} 2"));
}

#[test]
fn invalid_header_bytes_are_repaired_before_allocation() {
    let fields: Vec<&[u8]> = vec![b"col\xFF", b"col\xFF"];
    let results = allocate_bytes(&fields, &[], MAX_BYTES_PER_COLUMN_NAME);
    assert_eq!(results[0].name, "col\u{FFFD}");
    assert_eq!(results[1].name, "col\u{FFFD} 2");
    assert!(results.iter().all(|r| r.is_unicode_fixed));
}

#[test]
fn trailing_number_parsing_matches_the_last_digit_run() {
    assert_eq!(split_trailing_number("Amount 2"), ("Amount", Some(2)));
    assert_eq!(split_trailing_number("Amount"), ("Amount", None));
    assert_eq!(split_trailing_number("2 Amount"), ("2 Amount", None));
    assert_eq!(split_trailing_number("a 12 34"), ("a 12", Some(34)));
    assert_eq!(split_trailing_number("123"), ("123", None));
    // Two spaces break the single-space pattern; the name stays bare so it
    // is never silently rewritten.
    assert_eq!(split_trailing_number("foo  2"), ("foo  2", None));
}

proptest! {
    #[test]
    fn allocation_preserves_order_and_uniqueness(
        candidates in proptest::collection::vec(".{0,20}", 0..10),
        existing in proptest::collection::hash_set("[a-d]( [0-9])?", 0..6),
        max_bytes in 4usize..60,
    ) {
        let existing = existing.into_iter().collect::<Vec<_>>();
        let results = allocate(&candidates, &existing, max_bytes);
        prop_assert_eq!(results.len(), candidates.len());

        let mut all = existing.clone();
        all.extend(results.iter().map(|r| r.name.clone()));
        let unique = all.iter().collect::<HashSet<_>>();
        prop_assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn allocation_is_reproducible(
        candidates in proptest::collection::vec(".{0,12}", 0..8),
        max_bytes in 4usize..60,
    ) {
        let first = allocate(&candidates, &[], max_bytes);
        let second = allocate(&candidates, &[], max_bytes);
        prop_assert_eq!(first, second);
    }
}
