//! Scan command handler: multiline survey of extension output channels

use anyhow::Result;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use logstitch::ingest::{local_hostname, BatchRunner, SurveyRow};
use logstitch::report::{self, ArtifactPaths};
use logstitch::{Config, Profile};

/// Handle the scan command.
#[cfg(not(tarpaulin_include))]
pub fn handle(
    root: Option<PathBuf>,
    csv: Option<PathBuf>,
    jobs: Option<usize>,
    cancel: Arc<AtomicBool>,
) -> Result<()> {
    let config = Config::load()?;
    let stdout = io::stdout();
    scan_with_config(root, csv, jobs, &config, cancel, &mut stdout.lock())?;
    Ok(())
}

/// Survey every output channel under the root and write the CSV.
pub(crate) fn scan_with_config<W: Write>(
    root: Option<PathBuf>,
    csv: Option<PathBuf>,
    jobs: Option<usize>,
    config: &Config,
    cancel: Arc<AtomicBool>,
    out: &mut W,
) -> Result<Vec<SurveyRow>> {
    config.validate()?;
    let roots = super::scan_roots(root, config)?;
    let profile = Profile::exthost();
    let mut settings = config.engine_settings(profile.name())?;
    settings.joiner = None;
    let engine = profile.engine(&settings);

    let combined = BatchRunner::new(&engine, local_hostname())
        .jobs(jobs.unwrap_or(config.ingest.jobs))
        .record_orphans(false)
        .cancel_on(cancel)
        .run_roots(&roots, profile.rules())?;

    let rows: Vec<SurveyRow> = combined
        .roots
        .iter()
        .flat_map(|r| r.result.survey.iter().cloned())
        .collect();
    writeln!(out, "LOG_FILES_FOUND: {}", rows.len())?;

    let csv_path =
        csv.unwrap_or_else(|| ArtifactPaths::new(config.output_dir(), profile.name()).survey());
    report::write_survey_file(&csv_path, &rows)?;
    writeln!(out, "CSV_WRITTEN: {}", csv_path.display())?;

    let mut files_with_multiline = 0;
    let mut total_multiline = 0;
    for row in &rows {
        if let Some(error) = &row.error {
            writeln!(out, "READ_ERROR: {} -> {}", row.path.display(), error)?;
            continue;
        }
        if row.multiline_messages > 0 {
            files_with_multiline += 1;
            total_multiline += row.multiline_messages;
            writeln!(
                out,
                "MULTILINE: {} -> {} messages, {} continuation lines",
                row.path.display(),
                row.multiline_messages,
                row.continuation_lines
            )?;
        }
    }

    if files_with_multiline == 0 {
        writeln!(out, "MULTILINE_MESSAGES: not detected")?;
    } else {
        writeln!(
            out,
            "MULTILINE_MESSAGES: detected in {} files, {} messages",
            files_with_multiline, total_multiline
        )?;
    }
    Ok(rows)
}
