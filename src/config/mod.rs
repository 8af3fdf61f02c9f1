//! Configuration management for logstitch

mod io;
mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::engine::TimestampGrammar;
use crate::error::IngestError;
use crate::profile::EngineSettings;

impl Config {
    /// Get the config file path (~/.config/logstitch/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        io::config_path()
    }

    /// Get the config directory path (~/.config/logstitch)
    pub fn config_dir() -> Result<PathBuf> {
        io::config_dir()
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> Result<Self> {
        io::load()
    }

    /// Load configuration from a specific file, or return defaults if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        io::load_from(path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        io::save_to(self, path)
    }

    /// Reject settings that would fail later, before any file is touched.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.ingest.jobs == 0 {
            return Err(IngestError::ZeroWorkers);
        }
        self.compiled_grammars().map(|_| ())
    }

    /// Compile the extra grammars.
    pub fn compiled_grammars(&self) -> Result<Vec<TimestampGrammar>, IngestError> {
        self.parse
            .extra_grammars
            .iter()
            .map(|g| TimestampGrammar::new(&g.name, &g.pattern, g.time_only))
            .collect()
    }

    /// Engine overrides for a profile.
    pub fn engine_settings(&self, profile: &str) -> Result<EngineSettings, IngestError> {
        Ok(EngineSettings {
            tags: Some(self.parse.tags.clone()),
            extra_grammars: self.compiled_grammars()?,
            joiner: self.joiner.for_profile(profile).map(str::to_string),
            decode: self.ingest.decode,
        })
    }

    /// Configured log root with `~` expanded.
    pub fn root(&self) -> Option<PathBuf> {
        self.ingest.root.as_deref().map(expand_home)
    }

    /// Report directory with `~` expanded, defaulting to the current directory.
    pub fn output_dir(&self) -> PathBuf {
        self.ingest
            .output_dir
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(dir: &str) -> PathBuf {
    if let Some(stripped) = dir.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(dir)
}
