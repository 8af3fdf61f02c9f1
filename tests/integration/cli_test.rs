//! Tests of the logstitch binary against a log root on disk.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;
use tempfile::TempDir;

use super::helpers::{setup_home, setup_log_tree};

/// Run logstitch with an isolated home and working directory
fn run_logstitch(home: &Path, cwd: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_logstitch"))
        .args(args)
        .current_dir(cwd)
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("APPDATA")
        .output()
        .expect("Failed to execute logstitch");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn logstitch(home: &Path) -> AssertCommand {
    let mut cmd = AssertCommand::cargo_bin("logstitch").expect("binary is built");
    cmd.env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("APPDATA");
    cmd
}

// ============================================================================
// ingest
// ============================================================================

#[test]
fn ingest_prints_root_summary_and_writes_reports() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);
    let root = setup_log_tree(&temp);
    let out = temp.path().join("out");

    let (stdout, stderr, code) = run_logstitch(
        &home,
        temp.path(),
        &[
            "ingest",
            "--root",
            root.to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
        ],
    );

    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains(&format!("LOG_ROOT: {}", root.display())));
    assert!(stdout.contains("LOG_FILES_INGESTED: 2"));
    assert!(stdout.contains("LOG_LINES_READ: 11"));
    assert!(stdout.contains("LOG_ERRORS: 1"));
    assert!(stdout.contains("MESSAGES: 6 (2 multiline, "));
    assert!(stdout.trim_end().ends_with("profile logs)"));
    assert!(!stdout.contains("LOG_FILES_SKIPPED"));

    for name in [
        "ingest_messages_logs.csv",
        "ingest_file_summary_logs.log",
        "ingest_errors_logs_logs.log",
        "ingest_error_paths_logs_logs.log",
    ] {
        assert!(out.join(name).is_file(), "missing {}", name);
    }
}

#[test]
fn ingest_defaults_output_to_working_directory() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);
    let root = setup_log_tree(&temp);
    let cwd = temp.path().join("cwd");
    fs::create_dir_all(&cwd).unwrap();

    logstitch(&home)
        .current_dir(&cwd)
        .args(["ingest", "--profile", "jupyter", "--root"])
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("LOG_FILES_INGESTED: 1"))
        .stdout(predicate::str::contains("profile jupyter)"));

    assert!(cwd.join("ingest_messages_jupyter.csv").is_file());
}

#[test]
fn ingest_all_profiles_as_json() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);
    let root = setup_log_tree(&temp);
    let out = temp.path().join("out");

    let (stdout, stderr, code) = run_logstitch(
        &home,
        temp.path(),
        &[
            "ingest",
            "--profile",
            "all",
            "--json",
            "--jobs",
            "2",
            "--root",
            root.to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
        ],
    );
    assert_eq!(code, 0, "stderr: {}", stderr);

    let runs: serde_json::Value = serde_json::from_str(&stdout).expect("stdout is JSON");
    let runs = runs.as_array().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["profile"], "logs");
    assert_eq!(runs[0]["total"]["messages_emitted"], 6);
    assert_eq!(runs[0]["roots"][0]["files_scanned"], 2);
    assert_eq!(runs[1]["profile"], "jupyter");
    assert_eq!(runs[1]["total"]["messages_emitted"], 2);
    assert_eq!(runs[1]["total"]["orphan_lines"], 1);

    assert!(out.join("ingest_messages_logs.csv").is_file());
    assert!(out.join("ingest_messages_jupyter.csv").is_file());
}

#[test]
fn ingest_joiner_and_error_log_overrides() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);
    let root = setup_log_tree(&temp);
    let out = temp.path().join("out");
    let error_log = temp.path().join("failures.txt");

    let (_, stderr, code) = run_logstitch(
        &home,
        temp.path(),
        &[
            "ingest",
            "--root",
            root.to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
            "--joiner",
            " | ",
            "--error-log",
            error_log.to_str().unwrap(),
        ],
    );
    assert_eq!(code, 0, "stderr: {}", stderr);

    // Only the file name is taken; the report lands next to the others.
    let errors = fs::read_to_string(out.join("failures.txt")).unwrap();
    assert!(errors.contains("Electron main process starting"));
    assert!(!error_log.exists());
    assert!(!out.join("ingest_errors_logs_logs.log").exists());

    let mut reader = csv::Reader::from_path(out.join("ingest_messages_logs.csv")).unwrap();
    let bodies: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[3].to_string())
        .collect();
    assert!(bodies
        .iter()
        .any(|b| b.ends_with(" |     at readFileSync (node:fs:469:35)")));
}

#[test]
fn ingest_missing_root_fails() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);
    let missing = temp.path().join("nope");

    let (_, stderr, code) = run_logstitch(
        &home,
        temp.path(),
        &["ingest", "--root", missing.to_str().unwrap()],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("Log root does not exist"), "stderr: {}", stderr);
}

#[test]
fn ingest_without_root_or_appdata_fails() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);

    logstitch(&home)
        .current_dir(temp.path())
        .arg("ingest")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No log root given"))
        .stderr(predicate::str::contains("APPDATA is not set"));
}

#[test]
fn ingest_zero_jobs_is_rejected() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);
    let root = setup_log_tree(&temp);

    logstitch(&home)
        .current_dir(temp.path())
        .args(["ingest", "--jobs", "0", "--root"])
        .arg(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Worker count must be at least 1"));
}

#[test]
fn ingest_uses_root_from_config() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);
    let root = setup_log_tree(&temp);
    fs::write(
        home.join(".config/logstitch/config.toml"),
        format!(
            "[ingest]\nroot = {:?}\noutput_dir = {:?}\n",
            root.to_str().unwrap(),
            temp.path().join("out").to_str().unwrap()
        ),
    )
    .unwrap();

    logstitch(&home)
        .current_dir(temp.path())
        .arg("ingest")
        .assert()
        .success()
        .stdout(predicate::str::contains("LOG_FILES_INGESTED: 2"));
    assert!(temp.path().join("out/ingest_messages_logs.csv").is_file());
}

// ============================================================================
// scan
// ============================================================================

#[test]
fn scan_writes_survey_csv() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);
    let root = setup_log_tree(&temp);
    let csv_path = temp.path().join("survey.csv");

    let (stdout, stderr, code) = run_logstitch(
        &home,
        temp.path(),
        &[
            "scan",
            "--root",
            root.to_str().unwrap(),
            "--csv",
            csv_path.to_str().unwrap(),
        ],
    );
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("LOG_FILES_FOUND: 2"));
    assert!(stdout.contains(&format!("CSV_WRITTEN: {}", csv_path.display())));
    assert!(stdout.contains("1-Git.log -> 1 messages, 1 continuation lines"));
    assert!(stdout.contains("2-Jupyter.log -> 1 messages, 2 continuation lines"));
    assert!(stdout.contains("MULTILINE_MESSAGES: detected in 2 files, 2 messages"));

    let written = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(written.lines().count(), 3);
}

// ============================================================================
// config, completions, version
// ============================================================================

#[test]
fn config_path_is_under_home() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);

    let (stdout, _, code) = run_logstitch(&home, temp.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert_eq!(
        stdout.trim(),
        home.join(".config/logstitch/config.toml").display().to_string()
    );
}

#[test]
fn config_show_reflects_file() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);
    fs::write(
        home.join(".config/logstitch/config.toml"),
        "[ingest]\njobs = 4\n\n[joiner]\nlogs = \" | \"\n",
    )
    .unwrap();

    logstitch(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("jobs = 4"))
        .stdout(predicate::str::contains("[parse]"));
}

#[test]
fn invalid_config_is_reported() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);
    fs::write(
        home.join(".config/logstitch/config.toml"),
        "[[parse.extra_grammars]]\nname = \"broken\"\npattern = '^\\d+'\n",
    )
    .unwrap();

    logstitch(&home)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timestamp grammar 'broken'"));
}

#[test]
fn completions_bash_mentions_binary() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);
    let (stdout, _, code) = run_logstitch(&home, temp.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("logstitch"));
    assert!(stdout.contains("ingest"));
}

#[test]
fn version_flag_prints_package_version() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);
    let (stdout, _, code) = run_logstitch(&home, temp.path(), &["--version"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with(&format!("logstitch {}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn unknown_profile_is_a_usage_error() {
    let temp = TempDir::new().unwrap();
    let home = setup_home(&temp);
    let (_, stderr, code) = run_logstitch(
        &home,
        temp.path(),
        &["ingest", "--profile", "exthost"],
    );
    assert_eq!(code, 2);
    assert!(stderr.contains("invalid value"));
}
