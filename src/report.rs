//! Report writers: messages CSV, error logs, file summaries and the console
//! summary.
//!
//! Every artifact name starts with an `ingest_` prefix that discovery skips,
//! so reports written into a scanned tree are never ingested back.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use humansize::{format_size, DECIMAL};
use serde::Serialize;

use crate::ingest::{BatchResult, SurveyRow};
use crate::model::{BatchStats, FileSummary, LogMessage};

/// Separator between tags in the CSV `tags` column.
pub const TAG_SEPARATOR: &str = ";";

/// One CSV row. Provenance is spelled out because the csv writer cannot
/// serialize flattened structs.
#[derive(Debug, Serialize)]
struct MessageRow<'a> {
    timestamp: &'a str,
    raw_time_fragment: &'a str,
    tags: String,
    body: &'a str,
    source_file: &'a str,
    source_path: String,
    source_host: &'a str,
    folder_timestamp: &'a str,
    continuation_line_count: usize,
    is_multiline: bool,
    timestamp_dt: String,
    folder_timestamp_dt: String,
}

impl<'a> From<&'a LogMessage> for MessageRow<'a> {
    fn from(m: &'a LogMessage) -> Self {
        Self {
            timestamp: &m.timestamp,
            raw_time_fragment: &m.raw_time_fragment,
            tags: m.tags.join(TAG_SEPARATOR),
            body: &m.body,
            source_file: &m.provenance.source_file,
            source_path: m.provenance.source_path.display().to_string(),
            source_host: &m.provenance.source_host,
            folder_timestamp: &m.provenance.folder_timestamp,
            continuation_line_count: m.continuation_line_count,
            is_multiline: m.is_multiline(),
            timestamp_dt: m
                .parsed_timestamp()
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string())
                .unwrap_or_default(),
            folder_timestamp_dt: m
                .parsed_folder_timestamp()
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Write messages as CSV with a header row.
pub fn write_messages_csv<W: Write>(writer: W, messages: &[LogMessage]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    if messages.is_empty() {
        // serialize() writes the header lazily; an empty table still gets one.
        csv.write_record([
            "timestamp",
            "raw_time_fragment",
            "tags",
            "body",
            "source_file",
            "source_path",
            "source_host",
            "folder_timestamp",
            "continuation_line_count",
            "is_multiline",
            "timestamp_dt",
            "folder_timestamp_dt",
        ])?;
    }
    for message in messages {
        csv.serialize(MessageRow::from(message))?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the multiline survey as CSV.
pub fn write_survey_csv<W: Write>(writer: W, rows: &[SurveyRow]) -> Result<()> {
    #[derive(Serialize)]
    struct Row<'a> {
        path: String,
        lines_read: usize,
        continuation_lines: usize,
        multiline_messages: usize,
        error: &'a str,
    }

    let mut csv = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv.write_record([
            "path",
            "lines_read",
            "continuation_lines",
            "multiline_messages",
            "error",
        ])?;
    }
    for row in rows {
        csv.serialize(Row {
            path: row.path.display().to_string(),
            lines_read: row.lines_read,
            continuation_lines: row.continuation_lines,
            multiline_messages: row.multiline_messages,
            error: row.error.as_deref().unwrap_or(""),
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// One line per entry.
pub fn write_lines<W, I, S>(mut writer: W, lines: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for line in lines {
        writeln!(writer, "{}", line.as_ref())?;
    }
    writer.flush()
}

/// `<path> | MESSAGES_OK: n | MESSAGES_FAILED: m | ERROR: e`
pub fn format_file_summary(summary: &FileSummary) -> String {
    format!(
        "{} | MESSAGES_OK: {} | MESSAGES_FAILED: {} | ERROR: {}",
        summary.path.display(),
        summary.messages_ok,
        summary.messages_failed,
        summary.error.as_deref().unwrap_or("")
    )
}

/// Console block for one root.
pub fn format_root_summary(root: &Path, stats: &BatchStats) -> String {
    let mut out = format!(
        "LOG_ROOT: {}\nLOG_FILES_INGESTED: {}\nLOG_LINES_READ: {}\nLOG_ERRORS: {}",
        root.display(),
        stats.files_scanned,
        stats.lines_read,
        stats.errors()
    );
    if stats.files_skipped > 0 {
        out.push_str(&format!("\nLOG_FILES_SKIPPED: {}", stats.files_skipped));
    }
    out
}

/// Closing console line for a profile run.
pub fn format_totals(profile: &str, stats: &BatchStats) -> String {
    format!(
        "MESSAGES: {} ({} multiline, {} scanned, profile {})",
        stats.messages_emitted,
        stats.multiline_messages,
        format_size(stats.bytes_read, DECIMAL),
        profile
    )
}

/// Where the artifacts of one profile run go.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    output_dir: PathBuf,
    profile: String,
    error_log: Option<PathBuf>,
    multi_profile: bool,
    multi_root: bool,
}

impl ArtifactPaths {
    pub fn new(output_dir: impl Into<PathBuf>, profile: &str) -> Self {
        Self {
            output_dir: output_dir.into(),
            profile: profile.to_string(),
            error_log: None,
            multi_profile: false,
            multi_root: false,
        }
    }

    /// Name the error report after `error_log` instead of `ingest_errors_*`.
    /// Only the file name is used; the report still goes to the output
    /// directory.
    pub fn with_error_log(mut self, error_log: Option<PathBuf>) -> Self {
        self.error_log = error_log;
        self
    }

    /// The run covers several profiles: the profile is appended to an
    /// overridden error report name.
    pub fn multi_profile(mut self, enabled: bool) -> Self {
        self.multi_profile = enabled;
        self
    }

    /// The run covers several roots: the root label is appended to an
    /// overridden error report name.
    pub fn multi_root(mut self, enabled: bool) -> Self {
        self.multi_root = enabled;
        self
    }

    pub fn messages(&self) -> PathBuf {
        self.output_dir
            .join(format!("ingest_messages_{}.csv", self.profile))
    }

    pub fn file_summary(&self) -> PathBuf {
        self.output_dir
            .join(format!("ingest_file_summary_{}.log", self.profile))
    }

    pub fn errors(&self, label: &str) -> PathBuf {
        let Some(name) = self.error_log_name() else {
            return self
                .output_dir
                .join(format!("ingest_errors_{}_{}.log", self.profile, label));
        };
        let mut path = self.output_dir.join(name);
        if self.multi_profile {
            path = append_to_stem(&path, &self.profile);
        }
        if self.multi_root {
            path = append_to_stem(&path, label);
        }
        path
    }

    /// File-name prefix shared by overridden error reports, which discovery
    /// must skip on top of the fixed `ingest_` prefixes.
    pub fn error_log_prefix(&self) -> Option<String> {
        let name = Path::new(self.error_log_name()?);
        name.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
    }

    fn error_log_name(&self) -> Option<&std::ffi::OsStr> {
        self.error_log.as_deref().and_then(Path::file_name)
    }

    pub fn error_paths(&self, label: &str) -> PathBuf {
        self.output_dir
            .join(format!("ingest_error_paths_{}_{}.log", self.profile, label))
    }

    pub fn survey(&self) -> PathBuf {
        self.output_dir
            .join(format!("ingest_multiline_survey_{}.csv", self.profile))
    }
}

/// `dir/name.ext` -> `dir/name_suffix.ext`
fn append_to_stem(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}_{}", stem, suffix),
    };
    path.with_file_name(name)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create report: {:?}", path))?;
    Ok(BufWriter::new(file))
}

/// Write the error report and error-path list of one root.
pub fn write_root_reports(paths: &ArtifactPaths, label: &str, result: &BatchResult) -> Result<()> {
    let errors = paths.errors(label);
    write_lines(create(&errors)?, &result.error_report)
        .with_context(|| format!("Failed to write error report: {:?}", errors))?;

    let error_paths = paths.error_paths(label);
    write_lines(
        create(&error_paths)?,
        result.error_paths.iter().map(|p| p.display().to_string()),
    )
    .with_context(|| format!("Failed to write error path list: {:?}", error_paths))?;
    Ok(())
}

/// Write the per-file summary of a whole profile run.
pub fn write_file_summary(path: &Path, summaries: &[FileSummary]) -> Result<()> {
    write_lines(create(path)?, summaries.iter().map(format_file_summary))
        .with_context(|| format!("Failed to write file summary: {:?}", path))
}

/// Write all messages of a profile run.
pub fn write_messages_file(path: &Path, messages: &[LogMessage]) -> Result<()> {
    write_messages_csv(create(path)?, messages)
        .with_context(|| format!("Failed to write messages: {:?}", path))
}

/// Write the multiline survey of a profile run.
pub fn write_survey_file(path: &Path, rows: &[SurveyRow]) -> Result<()> {
    write_survey_csv(create(path)?, rows)
        .with_context(|| format!("Failed to write multiline survey: {:?}", path))
}
