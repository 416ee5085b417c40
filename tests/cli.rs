mod common;

use assert_cmd::Command;
use predicates::str::contains;

use common::Fixture;

fn cmd() -> Command {
    Command::cargo_bin("exam-drill").unwrap()
}

#[test]
fn check_reports_bank_summary() {
    let fixture = Fixture::new();
    let path = fixture.sheet("bank.csv", 25);

    cmd()
        .arg("--questions")
        .arg(&path)
        .arg("--check")
        .assert()
        .success()
        .stdout(contains("25 questions"))
        .stdout(contains("without a valid answer key: 0"));
}

#[test]
fn check_fails_on_missing_columns() {
    let fixture = Fixture::new();
    let path = fixture.write("bank.csv", "question,A\nWhy?,Because\n");

    cmd()
        .args(["--check", "--questions"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("missing required columns: correct"));
}

#[test]
fn check_writes_log_file() {
    let fixture = Fixture::new();
    let path = fixture.sheet("bank.csv", 3);
    let log = fixture.dir.join("drill.log");

    cmd()
        .env_remove("RUST_LOG")
        .arg("--check")
        .arg("--questions")
        .arg(&path)
        .arg("--log-file")
        .arg(&log)
        .assert()
        .success();

    let logged = std::fs::read_to_string(&log).unwrap();
    assert!(logged.contains("loaded question bank"));
}
