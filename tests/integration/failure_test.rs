//! Read failures, cancellation and other runs that do not go cleanly.

use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use tempfile::TempDir;

use logstitch::engine::DecodePolicy;
use logstitch::ingest::BatchRunner;
use logstitch::profile::EngineSettings;
use logstitch::report;
use logstitch::Profile;

use super::helpers::setup_log_tree;

const BROKEN: &[u8] = b"10:00:00.000 [info] first\n  detail\n\xff\xfe broken\n10:00:01.000 never read\n";

#[test]
fn strict_decoding_keeps_partial_messages() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("logs");
    let path = root.join("20240115T101500/broken.log");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, BROKEN).unwrap();

    let profile = Profile::logs();
    let engine = profile.engine(&EngineSettings {
        decode: DecodePolicy::Strict,
        ..EngineSettings::default()
    });
    let result = BatchRunner::new(&engine, "host")
        .run(&[path.clone()], Some(&root))
        .unwrap();

    assert_eq!(result.stats.read_errors, 1);
    assert_eq!(result.stats.messages_emitted, 1);
    assert_eq!(result.stats.lines_read, 3);
    assert_eq!(result.messages.len(), 2);

    let first = &result.messages[0];
    assert_eq!(first.timestamp, "2024-01-15 10:00:00.000");
    assert_eq!(first.continuation_line_count, 1);

    let failure = &result.messages[1];
    assert_eq!(failure.timestamp, "");
    assert_eq!(failure.tags, vec!["error"]);
    let expected = format!("<READ_ERROR: Failed to read line 3 of {}", path.display());
    assert!(failure.body.starts_with(&expected), "body: {}", failure.body);

    assert_eq!(result.files[0].messages_ok, 1);
    assert_eq!(result.files[0].messages_failed, 1);
    assert!(report::format_file_summary(&result.files[0]).contains("ERROR: Failed to read line 3"));
    assert!(result.error_paths.contains(&path));
}

#[test]
fn lossy_decoding_reads_through_invalid_bytes() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.log");
    fs::write(&path, BROKEN).unwrap();

    let engine = Profile::logs().engine(&EngineSettings::default());
    let result = BatchRunner::new(&engine, "host")
        .run(&[path], Some(temp.path()))
        .unwrap();

    assert_eq!(result.stats.read_errors, 0);
    assert_eq!(result.stats.lines_read, 4);
    assert_eq!(result.messages.len(), 2);
    assert_eq!(result.messages[0].continuation_line_count, 2);
    assert!(result.messages[0].body.contains('\u{FFFD}'));
}

#[cfg(unix)]
#[test]
fn unreadable_file_becomes_failure_record() {
    let temp = TempDir::new().unwrap();
    let root = setup_log_tree(&temp);
    let locked = root.join("20240115T101500/main.log");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can still open the file; nothing to observe then.
    if fs::File::open(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        return;
    }

    let profile = Profile::logs();
    let engine = profile.engine(&EngineSettings::default());
    let result = BatchRunner::new(&engine, "host")
        .run(&profile.rules().collect(&root), Some(&root))
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(result.stats.files_scanned, 2);
    assert_eq!(result.stats.read_errors, 1);
    assert_eq!(result.stats.messages_emitted, 3);

    let failure = &result.messages[0];
    assert_eq!(failure.provenance.source_file, "main.log");
    assert!(failure
        .body
        .starts_with(&format!("<READ_ERROR: Failed to open {}", locked.display())));
    assert_eq!(result.messages[1].provenance.source_file, "renderer.log");
}

#[test]
fn cancelled_run_skips_every_file() {
    let temp = TempDir::new().unwrap();
    let root = setup_log_tree(&temp);
    let profile = Profile::logs();
    let engine = profile.engine(&EngineSettings::default());

    let combined = BatchRunner::new(&engine, "host")
        .jobs(2)
        .cancel_on(Arc::new(AtomicBool::new(true)))
        .run_roots(&[root.clone()], profile.rules())
        .unwrap();

    assert_eq!(combined.total.files_scanned, 0);
    assert_eq!(combined.total.files_skipped, 2);
    assert!(combined.roots[0].result.messages.is_empty());

    let console = report::format_root_summary(&root, &combined.total);
    assert!(console.ends_with("LOG_FILES_SKIPPED: 2"));
}

#[test]
fn directories_named_like_logs_are_ignored() {
    let temp = TempDir::new().unwrap();
    let root = setup_log_tree(&temp);
    fs::create_dir_all(root.join("20240115T101500/archive.log")).unwrap();
    fs::write(root.join("20240115T101500/notes.txt"), "10:00:00 not a log\n").unwrap();
    fs::write(root.join("ingest_errors_logs_logs.log"), "stale report\n").unwrap();

    let files = Profile::logs().rules().collect(&root);
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("20240115T101500/main.log"));
    assert!(files[1].ends_with("20240115T101500/window1/renderer.log"));
}
