//! Command handlers for the logstitch CLI.
//!
//! Each submodule handles a specific CLI command or command group.
//! The main dispatch logic remains in main.rs.

pub mod completions;
pub mod config;
pub mod ingest;
pub mod scan;

use anyhow::{Context, Result};
use std::path::PathBuf;

use logstitch::ingest::{default_root, resolve_roots};
use logstitch::Config;

/// Pick the log root: command line, then config, then `%APPDATA%/Code/logs`.
pub fn resolve_root(cli_root: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    match cli_root.or_else(|| config.root()) {
        Some(root) => Ok(root),
        None => default_root().context("No log root given"),
    }
}

/// Resolve and validate the roots to scan.
pub fn scan_roots(cli_root: Option<PathBuf>, config: &Config) -> Result<Vec<PathBuf>> {
    let root = resolve_root(cli_root, config)?;
    resolve_roots(&root).with_context(|| format!("Cannot scan {:?}", root))
}
