//! Test helper utilities

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Editor session folder every fixture tree is built under.
pub const SESSION: &str = "20240115T101500";

/// Extension-host output folder inside the session.
pub const CHANNELS: &str = "20240115T101500/window1/exthost/output_logging_20240115T101502";

/// Get the path to the fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load a fixture file's contents
pub fn load_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Copy a fixture to `rel` under `root`, creating directories as needed.
pub fn place_fixture(root: &Path, fixture: &str, rel: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).expect("Failed to create fixture dir");
    fs::write(&path, load_fixture(fixture)).expect("Failed to write fixture");
    path
}

/// A log root shaped like the editor's `logs` folder.
///
/// ```text
/// logs/20240115T101500/main.log
/// logs/20240115T101500/window1/renderer.log
/// logs/20240115T101500/window1/exthost/output_logging_20240115T101502/1-Git.log
/// logs/20240115T101500/window1/exthost/output_logging_20240115T101502/2-Jupyter.log
/// ```
pub fn setup_log_tree(temp_dir: &TempDir) -> PathBuf {
    let root = temp_dir.path().join("logs");
    place_fixture(&root, "main.log", &format!("{}/main.log", SESSION));
    place_fixture(&root, "renderer.log", &format!("{}/window1/renderer.log", SESSION));
    place_fixture(&root, "git.log", &format!("{}/1-Git.log", CHANNELS));
    place_fixture(&root, "jupyter.log", &format!("{}/2-Jupyter.log", CHANNELS));
    root
}

/// Create an isolated home so the user's real config is never read
pub fn setup_home(temp_dir: &TempDir) -> PathBuf {
    let home = temp_dir.path().join("home");
    fs::create_dir_all(home.join(".config").join("logstitch")).expect("Failed to create home");
    home
}
