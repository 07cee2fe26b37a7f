use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("maxbf").unwrap();
    cmd.env("MAXBF_CONFIG", "/nonexistent/maxbf.toml")
        .env_remove("MAXBF_DEBUG")
        .env_remove("MAXBF_TRACE")
        .timeout(Duration::from_secs(5));
    cmd
}

fn program_file(code: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", code).unwrap();
    tf
}

#[test]
fn left_bound_error_fails_without_output() {
    let tf = program_file("<");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("went past the start of the tape"));
}

#[test]
fn unclosed_bracket_is_a_nesting_error() {
    let tf = program_file("[[][][[]]");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("improperly nested jumps")
                .and(predicate::str::contains("never closed")),
        );
}

#[test]
fn unmatched_close_bracket_is_a_nesting_error() {
    let tf = program_file("+[-]]");
    cargo_bin()
        .arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("']' has no matching '['"));
}

#[test]
fn error_points_at_line_and_column() {
    let tf = program_file("+\n <\n");
    let expected = format!("{}:2:2", tf.path().display());
    cargo_bin()
        .arg(tf.path())
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains(expected)
                .and(predicate::str::contains("\n   <\n"))
                .and(predicate::str::contains("\n   ^\n")),
        );
}

#[test]
fn output_before_an_error_is_kept() {
    let tf = program_file(&format!("{}.<", "+".repeat(49)));
    cargo_bin()
        .arg(tf.path())
        .assert()
        .code(1)
        .stdout("1")
        .stderr(predicate::str::contains("went past the start of the tape"));
}

#[test]
fn missing_program_file_fails() {
    cargo_bin()
        .arg("/definitely/not/here.bf")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not open program file"));
}

#[test]
fn no_program_file_prints_usage() {
    cargo_bin()
        .assert()
        .code(2)
        .stderr(
            predicate::str::contains("please specify a program file")
                .and(predicate::str::contains("Usage:")),
        );
}

#[test]
fn too_many_program_files_prints_usage() {
    cargo_bin()
        .args(["a.bf", "b.bf"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("too many program files"));
}

#[test]
fn zero_dump_cells_is_a_usage_error() {
    let tf = program_file("+");
    cargo_bin()
        .arg("--dump-cells")
        .arg("0")
        .arg(tf.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--dump-cells must be at least 1"));
}
