//! Batch aggregation over many files.
//!
//! Files are scanned independently, optionally on a bounded rayon pool.
//! Results are merged in input order and counters are folded on the calling
//! thread, so a parallel run is indistinguishable from a sequential one.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::discover::DiscoveryRules;
use super::file::FileScanner;
use crate::engine::Engine;
use crate::error::IngestError;
use crate::model::{BatchStats, FileReport, FileSummary, LogMessage, RootStats};

/// Per-file counters for the multiline survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveyRow {
    pub path: PathBuf,
    pub lines_read: usize,
    pub continuation_lines: usize,
    pub multiline_messages: usize,
    pub error: Option<String>,
}

impl From<&FileReport> for SurveyRow {
    fn from(report: &FileReport) -> Self {
        Self {
            path: report.path.clone(),
            lines_read: report.lines_read,
            continuation_lines: report.continuation_lines,
            multiline_messages: report.multiline_messages,
            error: report.outcome.error().map(str::to_string),
        }
    }
}

/// Everything produced by one batch.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// All messages, file by file in input order.
    pub messages: Vec<LogMessage>,
    pub stats: BatchStats,
    /// One summary per scanned file, in input order.
    pub files: Vec<FileSummary>,
    pub survey: Vec<SurveyRow>,
    /// `<path>: <content>` for every orphan line (when recorded) and failure.
    pub error_report: Vec<String>,
    /// Files with orphan lines or a read failure.
    pub error_paths: BTreeSet<PathBuf>,
}

impl BatchResult {
    fn absorb(&mut self, report: FileReport) {
        self.stats.record(&report);
        self.files.push(report.summary());
        self.survey.push(SurveyRow::from(&report));

        let shown = report.path.display().to_string();
        for orphan in &report.orphans {
            self.error_report.push(format!("{}: {}", shown, orphan));
        }
        if let Some(error) = report.outcome.error() {
            self.error_report.push(format!("{}: {}", shown, error));
        }
        if report.has_errors() {
            self.error_paths.insert(report.path.clone());
        }
        self.messages.extend(report.messages);
    }
}

/// Result for one scan root.
#[derive(Debug, Clone)]
pub struct RootResult {
    pub root: PathBuf,
    pub result: BatchResult,
}

/// Per-root results plus a combined total.
#[derive(Debug, Clone, Default)]
pub struct MultiRootResult {
    pub roots: Vec<RootResult>,
    pub total: BatchStats,
}

impl MultiRootResult {
    pub fn root_stats(&self) -> Vec<RootStats> {
        self.roots
            .iter()
            .map(|r| RootStats {
                root: r.root.clone(),
                stats: r.result.stats,
            })
            .collect()
    }

    /// Serializable view for `--json` output.
    pub fn summary(&self) -> MultiRootSummary {
        MultiRootSummary {
            roots: self.root_stats(),
            total: self.total,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiRootSummary {
    pub roots: Vec<RootStats>,
    pub total: BatchStats,
}

/// Runs a shared engine over a list of files.
#[derive(Debug, Clone)]
pub struct BatchRunner<'e> {
    engine: &'e Engine,
    source_host: String,
    jobs: usize,
    record_orphans: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'e> BatchRunner<'e> {
    pub fn new(engine: &'e Engine, source_host: impl Into<String>) -> Self {
        Self {
            engine,
            source_host: source_host.into(),
            jobs: 1,
            record_orphans: true,
            cancel: None,
        }
    }

    /// Number of files scanned concurrently. 1 scans on the calling thread.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Keep orphan line texts for the error report.
    pub fn record_orphans(mut self, enabled: bool) -> Self {
        self.record_orphans = enabled;
        self
    }

    /// Stop starting new files once `flag` is set.
    pub fn cancel_on(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Scan `files`, resolving folder timestamps relative to `root`.
    pub fn run(&self, files: &[PathBuf], root: Option<&Path>) -> Result<BatchResult, IngestError> {
        if self.jobs == 0 {
            return Err(IngestError::ZeroWorkers);
        }

        let scanner = FileScanner::new(self.engine, self.source_host.clone())
            .record_orphans(self.record_orphans);
        let scan_one = |path: &PathBuf| -> Option<FileReport> {
            if self.is_cancelled() {
                return None;
            }
            Some(scanner.scan_path(path, root))
        };

        let reports: Vec<Option<FileReport>> = if self.jobs == 1 || files.len() < 2 {
            files.iter().map(scan_one).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .thread_name(|i| format!("ingest-{}", i))
                .build()
                .map_err(|e| IngestError::WorkerPool(e.to_string()))?;
            pool.install(|| files.par_iter().map(scan_one).collect())
        };

        let mut result = BatchResult::default();
        for report in reports {
            match report {
                Some(report) => result.absorb(report),
                None => result.stats.files_skipped += 1,
            }
        }

        if result.stats.files_skipped > 0 {
            warn!(
                skipped = result.stats.files_skipped,
                "batch cancelled, remaining files skipped"
            );
        }
        debug!(
            files = result.stats.files_scanned,
            messages = result.stats.messages_emitted,
            errors = result.stats.errors(),
            "batch complete"
        );
        Ok(result)
    }

    /// Discover and scan each root independently.
    pub fn run_roots(
        &self,
        roots: &[PathBuf],
        rules: &DiscoveryRules,
    ) -> Result<MultiRootResult, IngestError> {
        let mut combined = MultiRootResult::default();
        for root in roots {
            let files = rules.collect(root);
            info!(root = %root.display(), files = files.len(), "scanning log root");
            let result = self.run(&files, Some(root))?;
            combined.total.merge(&result.stats);
            combined.roots.push(RootResult {
                root: root.clone(),
                result,
            });
        }
        Ok(combined)
    }
}
