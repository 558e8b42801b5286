use std::fs;
use std::io::Write;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

fn colnames() -> Command {
    Command::cargo_bin("colnames").expect("binary exists")
}

#[test]
fn clean_renders_repairs_in_a_table() {
    colnames()
        .args(["clean", "order\tid", "total"])
        .assert()
        .success()
        .stdout(contains("orderid"))
        .stdout(contains("ascii"));
}

#[test]
fn clean_emits_json_flags() {
    colnames()
        .args(["clean", "--json", "a\tb"])
        .assert()
        .success()
        .stdout(contains("\"name\": \"ab\""))
        .stdout(contains("\"is_ascii_cleaned\": true"));
}

#[test]
fn clean_rejects_budgets_below_the_minimum() {
    colnames()
        .args(["clean", "--max-bytes", "2", "abc"])
        .assert()
        .failure()
        .stderr(contains("at least 4 bytes"));
}

#[test]
fn headers_reports_duplicate_columns() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("orders.csv");
    fs::write(&path, "id,id,amount\n1,2,3\n").expect("write csv");

    colnames()
        .args(["headers", "-i", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("id 2"));
}

#[test]
fn headers_respects_existing_names() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("orders.csv");
    fs::write(&path, "id,amount\n1,2\n").expect("write csv");

    colnames()
        .args([
            "headers",
            "-i",
            path.to_str().unwrap(),
            "--existing",
            "id,id 2",
        ])
        .assert()
        .success()
        .stdout(contains("id 3"));
}

#[test]
fn headers_rewrites_the_file_with_repaired_names() {
    let dir = tempdir().expect("temp dir");
    let input = dir.path().join("orders.csv");
    let output = dir.path().join("fixed.csv");
    fs::write(&input, "id,id,\n1,2,3\n").expect("write csv");

    colnames()
        .args([
            "headers",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let fixed = fs::read_to_string(&output).expect("read output");
    assert_eq!(fixed, "\"id\",\"id 2\",\"Column 3\"\n\"1\",\"2\",\"3\"\n");
}

#[test]
fn headers_repairs_invalid_utf8_in_header_fields() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("mojibake.csv");
    let mut file = fs::File::create(&path).expect("create csv");
    file.write_all(b"col\xFF,ok\n1,2\n").expect("write bytes");

    colnames()
        .args(["headers", "--json", "-i", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("col\u{FFFD}"))
        .stdout(contains("\"is_unicode_fixed\": true"));
}

#[test]
fn headers_honours_tsv_delimiter_resolution() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("orders.tsv");
    fs::write(&path, "id\tid\n1\t2\n").expect("write tsv");

    colnames()
        .args(["headers", "-i", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("id 2"));
}
