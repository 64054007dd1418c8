use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn people() -> NamedTempFile {
    csv_file("id,name,city\n1,ada,Oslo\n2,bob,Rome\n3,cy,Oslo\n")
}

#[test]
fn prints_filtered_rows() {
    let input = people();
    Command::cargo_bin("tabulon")
        .unwrap()
        .arg(input.path())
        .args(["--where", "city=Oslo", "--select", "name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ada"))
        .stdout(predicate::str::contains("cy"))
        .stdout(predicate::str::contains("bob").not())
        .stdout(predicate::str::contains("2 rows"));
}

#[test]
fn joins_and_orders_as_json() {
    let input = people();
    let orders = csv_file("customer,total\n3,15\n1,10\n3,5\n");
    let join = format!("{}:id=customer", orders.path().display());

    let output = Command::cargo_bin("tabulon")
        .unwrap()
        .arg(input.path())
        .args(["--join", &join, "--order-by", "total:desc", "--select", "name,total"])
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value["rows"],
        serde_json::json!([["cy", 15], ["ada", 10], ["cy", 5]])
    );
}

#[test]
fn no_matches_exits_with_one() {
    let input = people();
    Command::cargo_bin("tabulon")
        .unwrap()
        .arg(input.path())
        .args(["--where", "city=Paris"])
        .assert()
        .code(1);
}

#[test]
fn unknown_column_exits_with_two() {
    let input = people();
    Command::cargo_bin("tabulon")
        .unwrap()
        .arg(input.path())
        .args(["--select", "salary"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown column"));
}
