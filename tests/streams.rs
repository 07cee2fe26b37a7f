use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
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
fn reads_and_echoes_individual_bytes_from_stdin() {
    let tf = program_file(",.,.,,.>,.");
    cargo_bin()
        .arg(tf.path())
        .write_stdin("Y\n&?.")
        .assert()
        .success()
        .stdout("Y\n?.");
}

#[test]
fn end_of_input_reads_as_zero() {
    let tf = program_file(",.");
    cargo_bin()
        .arg(tf.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout("\0");
}

#[test]
fn input_and_output_files_replace_stdio() {
    let tf = program_file(",[.,]");
    let input = program_file("copy me\n");
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("out.txt");

    cargo_bin()
        .arg("--input")
        .arg(input.path())
        .arg("--output")
        .arg(&out_path)
        .arg(tf.path())
        .write_stdin("ignored")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(fs::read(&out_path).unwrap(), b"copy me\n");
}

#[test]
fn missing_input_file_fails() {
    let tf = program_file(",.");
    cargo_bin()
        .args(["-i", "/definitely/not/here.txt"])
        .arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not open input file"));
}

#[test]
fn stdout_only_carries_program_output() {
    let tf = program_file("+++.");
    cargo_bin()
        .arg("--trace")
        .arg(tf.path())
        .assert()
        .success()
        .stdout("\u{3}")
        .stderr(predicate::str::contains("\u{3}").not());
}

#[test]
fn skipped_loop_does_not_consume_input() {
    let tf = program_file("[,],.");
    cargo_bin()
        .arg(tf.path())
        .write_stdin("AB")
        .assert()
        .success()
        .stdout("A");
}
