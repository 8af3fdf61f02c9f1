//! Records produced by the ingest engine.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;

/// Format of folder names such as `20240115T101500`.
pub const FOLDER_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Provenance shared by every message of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// File name without directories.
    pub source_file: String,
    /// Full path as supplied to the batch.
    pub source_path: PathBuf,
    /// Host the logs were ingested on.
    pub source_host: String,
    /// Raw folder timestamp (e.g. `20240115T101500`), or empty.
    pub folder_timestamp: String,
}

impl Provenance {
    pub fn new(path: &Path, source_host: &str, folder_timestamp: String) -> Self {
        Self {
            source_file: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            source_path: path.to_path_buf(),
            source_host: source_host.to_string(),
            folder_timestamp,
        }
    }
}

/// One logical log entry, possibly spanning several physical lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogMessage {
    /// Normalised timestamp, or empty for synthetic failure records.
    pub timestamp: String,
    /// Timestamp literal exactly as matched.
    pub raw_time_fragment: String,
    /// Whitelisted tags from the first line, in first-appearance order.
    pub tags: Vec<String>,
    /// First line verbatim, followed by continuation lines joined with the
    /// profile's joiner.
    pub body: String,
    pub continuation_line_count: usize,
    #[serde(flatten)]
    pub provenance: Provenance,
}

impl LogMessage {
    pub fn is_multiline(&self) -> bool {
        self.continuation_line_count > 0
    }

    /// Synthetic record standing in for a file that failed to read.
    pub fn read_error(provenance: Provenance, description: &str) -> Self {
        Self {
            timestamp: String::new(),
            raw_time_fragment: String::new(),
            tags: vec!["error".to_string()],
            body: format!("<READ_ERROR: {}>", description),
            continuation_line_count: 0,
            provenance,
        }
    }

    /// Parse the normalised timestamp, if it is a complete date and time.
    ///
    /// Time-only timestamps (no folder date was available) yield `None`.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%d %H:%M:%S%.f").ok()
    }

    /// Parse the folder timestamp (`YYYYMMDDTHHMMSS`).
    pub fn parsed_folder_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.provenance.folder_timestamp, FOLDER_TIMESTAMP_FORMAT)
            .ok()
    }
}

/// How a single file's scan ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Ok {
        messages_emitted: usize,
        orphan_lines: usize,
    },
    Failed {
        error_description: String,
    },
}

impl FileOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FileOutcome::Ok { .. } => None,
            FileOutcome::Failed { error_description } => Some(error_description),
        }
    }
}

/// Everything learned from scanning one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
    /// Reconstructed messages in file order. For a failed file the synthetic
    /// failure record comes last.
    pub messages: Vec<LogMessage>,
    pub lines_read: usize,
    pub bytes_read: u64,
    pub orphan_lines: usize,
    /// Orphan line texts, only collected when orphan recording is on.
    pub orphans: Vec<String>,
    pub multiline_messages: usize,
    pub continuation_lines: usize,
}

impl FileReport {
    /// Messages actually reconstructed from the file, excluding any failure record.
    pub fn messages_emitted(&self) -> usize {
        if self.outcome.is_failed() {
            self.messages.len().saturating_sub(1)
        } else {
            self.messages.len()
        }
    }

    /// True when the file belongs in the error-path list.
    pub fn has_errors(&self) -> bool {
        self.orphan_lines > 0 || self.outcome.is_failed()
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            path: self.path.clone(),
            messages_ok: self.messages_emitted(),
            messages_failed: usize::from(self.outcome.is_failed()),
            error: self.outcome.error().map(str::to_string),
        }
    }
}

/// Per-file line of the file summary report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub messages_ok: usize,
    pub messages_failed: usize,
    pub error: Option<String>,
}

/// Aggregate counters for a batch. Derived data only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub lines_read: usize,
    pub bytes_read: u64,
    pub messages_emitted: usize,
    pub orphan_lines: usize,
    pub multiline_messages: usize,
    pub continuation_lines: usize,
    pub read_errors: usize,
}

impl BatchStats {
    /// Fold one file's counters in.
    pub fn record(&mut self, report: &FileReport) {
        self.files_scanned += 1;
        self.lines_read += report.lines_read;
        self.bytes_read += report.bytes_read;
        self.messages_emitted += report.messages_emitted();
        self.orphan_lines += report.orphan_lines;
        self.multiline_messages += report.multiline_messages;
        self.continuation_lines += report.continuation_lines;
        if report.outcome.is_failed() {
            self.read_errors += 1;
        }
    }

    /// Add another batch's counters to this one.
    pub fn merge(&mut self, other: &BatchStats) {
        self.files_scanned += other.files_scanned;
        self.files_skipped += other.files_skipped;
        self.lines_read += other.lines_read;
        self.bytes_read += other.bytes_read;
        self.messages_emitted += other.messages_emitted;
        self.orphan_lines += other.orphan_lines;
        self.multiline_messages += other.multiline_messages;
        self.continuation_lines += other.continuation_lines;
        self.read_errors += other.read_errors;
    }

    /// Orphan lines plus read errors.
    pub fn errors(&self) -> usize {
        self.orphan_lines + self.read_errors
    }
}

/// Counters attributed to one scan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootStats {
    pub root: PathBuf,
    #[serde(flatten)]
    pub stats: BatchStats,
}
