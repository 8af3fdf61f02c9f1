//! Root resolution and candidate file discovery.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::IngestError;

/// Extension-host output folders, as a separator-neutral path fragment.
pub const OUTPUT_LOGGING_FRAGMENT: &str = "/exthost/output_logging_";

/// Editor installations whose `logs` folders sit under a roaming profile.
pub const ROAMING_EDITORS: &[&str] = &["Code", "Cursor", "Windsurf"];

/// Name prefixes of artifacts this tool writes. Never ingested.
pub const GENERATED_PREFIXES: &[&str] = &["ingest_errors", "ingest_error_paths", "ingest_file_summary"];

/// Which files under a root are candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryRules {
    /// Required file name suffix, compared case-insensitively.
    pub suffix: String,
    /// File name prefixes to skip, compared case-insensitively.
    pub skip_prefixes: Vec<String>,
    /// Only directories whose path contains this fragment.
    pub require_dir_fragment: Option<String>,
    /// Skip directories whose path contains this fragment.
    pub exclude_dir_fragment: Option<String>,
    /// Only files whose name contains this substring (case-insensitive).
    pub name_contains: Option<String>,
}

impl Default for DiscoveryRules {
    fn default() -> Self {
        Self {
            suffix: ".log".to_string(),
            skip_prefixes: GENERATED_PREFIXES.iter().map(|p| p.to_string()).collect(),
            require_dir_fragment: None,
            exclude_dir_fragment: None,
            name_contains: None,
        }
    }
}

impl DiscoveryRules {
    /// Whether a file in `dir` named `name` is a candidate.
    pub fn accepts(&self, dir: &Path, name: &str) -> bool {
        let dir_key = path_key(dir);
        if let Some(fragment) = &self.require_dir_fragment {
            if !dir_key.contains(&fragment.to_lowercase()) {
                return false;
            }
        }
        if let Some(fragment) = &self.exclude_dir_fragment {
            if dir_key.contains(&fragment.to_lowercase()) {
                return false;
            }
        }

        let lower = name.to_lowercase();
        if !lower.ends_with(&self.suffix.to_lowercase()) {
            return false;
        }
        if self
            .skip_prefixes
            .iter()
            .any(|p| lower.starts_with(&p.to_lowercase()))
        {
            return false;
        }
        match &self.name_contains {
            Some(needle) => lower.contains(&needle.to_lowercase()),
            None => true,
        }
    }

    /// Also skip file names starting with `prefix`.
    pub fn skipping(mut self, prefix: impl Into<String>) -> Self {
        self.skip_prefixes.push(prefix.into());
        self
    }

    /// Walk `root` and return candidate files, sorted by path.
    ///
    /// Unreadable directory entries are logged and skipped; they cannot be
    /// attributed to a file, so they never become file failures.
    pub fn collect(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(dir) = entry.path().parent() else {
                continue;
            };
            let name = entry.file_name().to_string_lossy();
            if self.accepts(dir, &name) {
                files.push(entry.path().to_path_buf());
            }
        }
        files.sort();
        debug!(root = %root.display(), files = files.len(), "discovered log files");
        files
    }
}

/// Lowercased path with `/` separators and a trailing `/`, so fragments
/// like `/exthost/output_logging_` match on any platform.
fn path_key(dir: &Path) -> String {
    let mut key = dir.to_string_lossy().replace('\\', "/").to_lowercase();
    if !key.ends_with('/') {
        key.push('/');
    }
    key
}

/// Validate a root and expand a roaming profile folder.
///
/// A root named `Roaming` expands to the `logs` folders of the editors that
/// exist under it. If none exist the root itself is used.
pub fn resolve_roots(root: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !root.exists() {
        return Err(IngestError::MissingRoot(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(IngestError::NotADirectory(root.to_path_buf()));
    }

    let is_roaming = root
        .file_name()
        .map(|n| n.to_string_lossy().eq_ignore_ascii_case("roaming"))
        .unwrap_or(false);

    if is_roaming {
        let expanded: Vec<PathBuf> = ROAMING_EDITORS
            .iter()
            .map(|editor| root.join(editor).join("logs"))
            .filter(|candidate| candidate.is_dir())
            .collect();
        if !expanded.is_empty() {
            debug!(root = %root.display(), roots = expanded.len(), "expanded roaming root");
            return Ok(expanded);
        }
    }

    Ok(vec![root.to_path_buf()])
}

/// `%APPDATA%/Code/logs`, the editor's default log root.
pub fn default_root() -> Result<PathBuf, IngestError> {
    default_root_from(std::env::var_os("APPDATA").map(PathBuf::from))
}

fn default_root_from(appdata: Option<PathBuf>) -> Result<PathBuf, IngestError> {
    let appdata = match appdata {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => return Err(IngestError::NoDefaultRoot),
    };
    if !appdata.is_dir() {
        return Err(IngestError::BadAppData(appdata));
    }
    Ok(appdata.join("Code").join("logs"))
}

/// Last path component, used to name per-root artifacts.
pub fn root_label(root: &Path) -> String {
    root.components()
        .next_back()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "root".to_string())
}

/// Labels for a set of roots, unique within the set.
///
/// Roaming expansion yields `Code/logs`, `Cursor/logs`, ...; when last
/// components collide the parent is prefixed (`Code_logs`).
pub fn root_labels(roots: &[PathBuf]) -> Vec<String> {
    let short: Vec<String> = roots.iter().map(|r| root_label(r)).collect();
    let unique = short.iter().collect::<BTreeSet<_>>().len() == short.len();
    if unique {
        return short;
    }
    roots
        .iter()
        .zip(short)
        .map(|(root, label)| match root.parent().filter(|p| p.file_name().is_some()) {
            Some(parent) => format!("{}_{}", root_label(parent), label),
            None => label,
        })
        .collect()
}
