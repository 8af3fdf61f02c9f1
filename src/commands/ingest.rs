//! Ingest command handler

use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

use logstitch::cli::IngestArgs;
use logstitch::engine::DecodePolicy;
use logstitch::ingest::{local_hostname, root_labels, BatchRunner, MultiRootSummary};
use logstitch::model::LogMessage;
use logstitch::report::{self, ArtifactPaths};
use logstitch::{Config, Profile};

/// Statistics of one profile run, as printed by `--json`.
#[derive(Debug, Serialize)]
pub struct ProfileRun {
    pub profile: &'static str,
    #[serde(flatten)]
    pub summary: MultiRootSummary,
}

/// Handle the ingest command.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: &IngestArgs, cancel: Arc<AtomicBool>) -> Result<()> {
    let config = Config::load()?;
    let stdout = io::stdout();
    ingest_with_config(args, &config, cancel, &mut stdout.lock())?;
    Ok(())
}

/// Run every selected profile and write its reports.
pub(crate) fn ingest_with_config<W: Write>(
    args: &IngestArgs,
    config: &Config,
    cancel: Arc<AtomicBool>,
    out: &mut W,
) -> Result<Vec<ProfileRun>> {
    config.validate()?;
    let roots = super::scan_roots(args.root.clone(), config)?;
    let output_dir = args.output_dir.clone().unwrap_or_else(|| config.output_dir());
    let jobs = args.jobs.unwrap_or(config.ingest.jobs);
    let host = local_hostname();
    let labels = root_labels(&roots);
    let profiles = Profile::from_name(args.profile.as_str())?;
    let multi_profile = profiles.len() > 1;

    let mut runs = Vec::new();
    for profile in profiles {
        let mut settings = config.engine_settings(profile.name())?;
        if let Some(joiner) = &args.joiner {
            settings.joiner = Some(joiner.clone());
        }
        if args.strict_utf8 {
            settings.decode = DecodePolicy::Strict;
        }
        let engine = profile.engine(&settings);

        let paths = ArtifactPaths::new(&output_dir, profile.name())
            .with_error_log(args.error_log.clone())
            .multi_profile(multi_profile)
            .multi_root(roots.len() > 1);
        let rules = match paths.error_log_prefix() {
            Some(prefix) => profile.rules().clone().skipping(prefix),
            None => profile.rules().clone(),
        };

        let combined = BatchRunner::new(&engine, host.clone())
            .jobs(jobs)
            .record_orphans(config.ingest.record_orphans)
            .cancel_on(cancel.clone())
            .run_roots(&roots, &rules)?;

        let mut messages: Vec<LogMessage> = Vec::new();
        let mut summaries = Vec::new();
        for (root, label) in combined.roots.iter().zip(&labels) {
            report::write_root_reports(&paths, label, &root.result)?;
            messages.extend(root.result.messages.iter().cloned());
            summaries.extend(root.result.files.iter().cloned());
        }
        report::write_messages_file(&paths.messages(), &messages)?;
        report::write_file_summary(&paths.file_summary(), &summaries)?;
        info!(
            profile = profile.name(),
            messages = messages.len(),
            output = %output_dir.display(),
            "reports written"
        );

        if !args.json {
            for root in &combined.roots {
                writeln!(out, "{}", report::format_root_summary(&root.root, &root.result.stats))?;
            }
            writeln!(out, "{}", report::format_totals(profile.name(), &combined.total))?;
        }

        runs.push(ProfileRun {
            profile: profile.name(),
            summary: combined.summary(),
        });
    }

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&runs)?)?;
    }
    Ok(runs)
}
