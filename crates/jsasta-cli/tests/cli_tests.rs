//! End-to-end CLI tests driving the built `jsasta` binary as a subprocess
//! rather than only calling `driver::run` in-process.

use assert_cmd::Command;
use predicates::str::contains;
use std::io::Write;

fn temp_jsa(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".jsa").tempfile().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

#[test]
fn clean_program_exits_success_and_prints_no_diagnostics() {
    let f = temp_jsa("function main(): int { return 1; }");
    Command::cargo_bin("jsasta")
        .unwrap()
        .arg(f.path())
        .assert()
        .success()
        .stdout(contains("no diagnostics"));
}

#[test]
fn missing_file_exits_404() {
    Command::cargo_bin("jsasta").unwrap().arg("/no/such/file.jsa").assert().code(404);
}

#[test]
fn type_error_exits_500_and_prints_diagnostic() {
    let f = temp_jsa("function main(): int { return undefined_name; }");
    Command::cargo_bin("jsasta")
        .unwrap()
        .arg(f.path())
        .assert()
        .code(500)
        .stdout(contains("JSA3001"));
}
