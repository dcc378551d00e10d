#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::io::Write;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write csv");
    file.flush().expect("flush csv");
    file
}

#[test]
fn cli_prints_help() {
    run_cli("help\nquit\n")
        .success()
        .stdout(str_contains("Commands:"))
        .stdout(str_contains("load <topics.csv> <lessons.csv>"));
}

#[test]
fn cli_reports_invalid_dates() {
    run_cli("dates notadate 2025-12-31\nquit\n")
        .success()
        .stdout(str_contains("Invalid start date"));
}

#[test]
fn cli_builds_and_shows_a_plan() {
    let topics = csv_file("module,TEA\nCardiology,3\n");
    let lessons = csv_file("lesson,module,duration_min\nIntro,Cardiology,60\nECG,Cardiology,60\n");

    let script = format!(
        "dates 2025-11-02 2025-11-29\nminutes 120\ndpw 5\nexam TEA\nload {} {}\nrun\nshow\nquit\n",
        topics.path().display(),
        lessons.path().display()
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Loaded 1 modules and 2 lessons."))
        .stdout(str_contains("Plan built"))
        .stdout(str_contains("complete"))
        .stdout(str_contains("Intro"));
}

#[test]
fn cli_saves_a_plan_to_json() {
    let topics = csv_file("module,TEA\nCardiology,3\n");
    let lessons = csv_file("lesson,module,duration_min\nIntro,Cardiology,60\n");
    let out = NamedTempFile::new().expect("create temp file");

    let script = format!(
        "dates 2025-11-02 2025-11-29\nminutes 120\nload {} {}\nrun\nsave json {}\nquit\n",
        topics.path().display(),
        lessons.path().display(),
        out.path().display()
    );
    run_cli(&script).success().stdout(str_contains("Plan saved to"));

    let contents = std::fs::read_to_string(out.path()).expect("read saved plan");
    assert!(contents.contains("\"Cardiology\""));
}

#[test]
fn cli_requires_a_backlog_before_running() {
    run_cli("run\nquit\n")
        .success()
        .stdout(str_contains("Load the backlog first"));
}
