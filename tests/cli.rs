//! CLI smoke tests: the binary is the ingestion boundary stand-in, so it has
//! to produce valid JSON on stdout for valid input and fail cleanly otherwise.

use std::io::Write;

use assert_cmd::Command;

fn write_email_file(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("email.json");
    let mut file = std::fs::File::create(&path).expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    path
}

#[test]
fn parse_subcommand_emits_structured_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_email_file(
        &dir,
        r#"{
            "subject": "Thank you for applying to TikTok!",
            "sender": "talent@tiktok.com",
            "text_body": "Our talent acquisition team will be in touch."
        }"#,
    );

    let output = Command::cargo_bin("trackmail")
        .expect("binary exists")
        .args(["parse", "--input"])
        .arg(&path)
        .output()
        .expect("run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("stdout is JSON");
    assert_eq!(parsed["extraction"]["company"]["value"], "TikTok");
    assert_eq!(parsed["classification"]["status"], "applied");
    assert_eq!(parsed["dominant_layer"], "subject_line");
}

#[test]
fn parse_subcommand_reads_stdin() {
    let output = Command::cargo_bin("trackmail")
        .expect("binary exists")
        .arg("parse")
        .write_stdin(r#"{"subject": "Hello", "sender": "a@b.com"}"#)
        .output()
        .expect("run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("not_job_related"));
}

#[test]
fn parse_subcommand_rejects_invalid_json() {
    Command::cargo_bin("trackmail")
        .expect("binary exists")
        .arg("parse")
        .write_stdin("not json")
        .assert()
        .failure();
}

#[test]
fn rules_subcommand_reports_counts() {
    let output = Command::cargo_bin("trackmail")
        .expect("binary exists")
        .arg("rules")
        .output()
        .expect("run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8 stdout");
    assert!(stdout.contains("rules version"));
}
