//! Configuration type definitions and defaults

use serde::{Deserialize, Serialize};

use crate::engine::tags::DEFAULT_TAGS;
use crate::engine::DecodePolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default)]
    pub joiner: JoinerConfig,
}

/// Where to read from and write to, and how hard to work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Log root. Unset means `%APPDATA%/Code/logs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    /// Directory for reports. Unset means the current directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Files scanned concurrently.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Write orphan lines to the error report.
    #[serde(default = "default_record_orphans")]
    pub record_orphans: bool,
    #[serde(default)]
    pub decode: DecodePolicy,
}

pub fn default_jobs() -> usize {
    1
}

pub fn default_record_orphans() -> bool {
    true
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            root: None,
            output_dir: None,
            jobs: default_jobs(),
            record_orphans: default_record_orphans(),
            decode: DecodePolicy::default(),
        }
    }
}

/// Parsing knobs shared by every profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Tag whitelist, case-sensitive.
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    /// Additional grammars, tried after the built-in ones.
    #[serde(default)]
    pub extra_grammars: Vec<GrammarConfig>,
}

pub fn default_tags() -> Vec<String> {
    DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            tags: default_tags(),
            extra_grammars: Vec::new(),
        }
    }
}

/// A user-supplied timestamp grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarConfig {
    pub name: String,
    /// Anchored regex with `ts` and `rest` named groups.
    pub pattern: String,
    /// Whether matches carry only a time of day.
    #[serde(default)]
    pub time_only: bool,
}

/// Per-profile continuation joiners. Unset keeps the profile default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jupyter: Option<String>,
}

impl JoinerConfig {
    /// Configured joiner for a profile, if any.
    pub fn for_profile(&self, profile: &str) -> Option<&str> {
        match profile {
            "logs" => self.logs.as_deref(),
            "jupyter" => self.jupyter.as_deref(),
            _ => None,
        }
    }
}
