//! Named parameter sets for the reconstruction engine.
//!
//! Each profile says which files to pick up and how to parse them. There is
//! one engine; profiles only differ in configuration.

use crate::engine::grammar::Builtin;
use crate::engine::{DecodePolicy, Engine, FolderPolicy, GrammarSet, TagExtractor, TimestampGrammar};
use crate::error::IngestError;
use crate::ingest::discover::{DiscoveryRules, OUTPUT_LOGGING_FRAGMENT};

/// Folder-name prefix of extension-host output folders.
pub const OUTPUT_LOGGING_PREFIX: &str = "output_logging_";

/// Joiner used for extension output, a literal backslash-n between spaces.
pub const JUPYTER_JOINER: &str = " \\n ";

/// What a profile run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOutput {
    /// Reconstructed messages plus error reports.
    Messages,
    /// Per-file multiline counters only.
    Survey,
}

/// A named discovery and parsing configuration.
#[derive(Debug, Clone)]
pub struct Profile {
    name: &'static str,
    rules: DiscoveryRules,
    builtins: &'static [Builtin],
    prefix_scan: bool,
    folder_policy: FolderPolicy,
    joiner: &'static str,
    output: ProfileOutput,
}

/// Per-run overrides applied on top of a profile.
#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub tags: Option<Vec<String>>,
    /// Tried after the profile's own grammars.
    pub extra_grammars: Vec<TimestampGrammar>,
    pub joiner: Option<String>,
    pub decode: DecodePolicy,
}

impl Profile {
    /// Editor logs outside the extension output folders.
    pub fn logs() -> Self {
        Self {
            name: "logs",
            rules: DiscoveryRules {
                exclude_dir_fragment: Some(OUTPUT_LOGGING_FRAGMENT.to_string()),
                ..DiscoveryRules::default()
            },
            builtins: &Builtin::ALL,
            prefix_scan: true,
            folder_policy: FolderPolicy::RootRelative,
            joiner: crate::engine::DEFAULT_JOINER,
            output: ProfileOutput::Messages,
        }
    }

    /// Jupyter extension output channels.
    pub fn jupyter() -> Self {
        Self {
            name: "jupyter",
            rules: DiscoveryRules {
                require_dir_fragment: Some(OUTPUT_LOGGING_FRAGMENT.to_string()),
                name_contains: Some("jupyter".to_string()),
                ..DiscoveryRules::default()
            },
            builtins: &[Builtin::TimeMillis],
            prefix_scan: false,
            folder_policy: FolderPolicy::MarkerPrefix(OUTPUT_LOGGING_PREFIX.to_string()),
            joiner: JUPYTER_JOINER,
            output: ProfileOutput::Messages,
        }
    }

    /// All extension output channels, surveyed for multiline messages.
    pub fn exthost() -> Self {
        Self {
            name: "exthost",
            rules: DiscoveryRules {
                require_dir_fragment: Some(OUTPUT_LOGGING_FRAGMENT.to_string()),
                ..DiscoveryRules::default()
            },
            builtins: &Builtin::ALL,
            prefix_scan: true,
            folder_policy: FolderPolicy::MarkerPrefix(OUTPUT_LOGGING_PREFIX.to_string()),
            joiner: crate::engine::DEFAULT_JOINER,
            output: ProfileOutput::Survey,
        }
    }

    /// Look up a profile by name. `all` selects every message profile.
    pub fn from_name(name: &str) -> Result<Vec<Profile>, IngestError> {
        match name.to_ascii_lowercase().as_str() {
            "logs" => Ok(vec![Self::logs()]),
            "jupyter" => Ok(vec![Self::jupyter()]),
            "exthost" => Ok(vec![Self::exthost()]),
            "all" => Ok(vec![Self::logs(), Self::jupyter()]),
            _ => Err(IngestError::UnknownProfile(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn rules(&self) -> &DiscoveryRules {
        &self.rules
    }

    pub fn output(&self) -> ProfileOutput {
        self.output
    }

    pub fn default_joiner(&self) -> &'static str {
        self.joiner
    }

    /// Build the engine for this profile.
    pub fn engine(&self, settings: &EngineSettings) -> Engine {
        let mut grammars = GrammarSet::only(self.builtins).with_prefix_scan(self.prefix_scan);
        for grammar in &settings.extra_grammars {
            grammars.push(grammar.clone());
        }

        let tags = match &settings.tags {
            Some(tags) => TagExtractor::new(tags.iter().cloned()),
            None => TagExtractor::default(),
        };

        Engine::builder()
            .grammars(grammars)
            .tags(tags)
            .folder_policy(self.folder_policy.clone())
            .joiner(settings.joiner.as_deref().unwrap_or(self.joiner))
            .decode(settings.decode)
            .build()
    }
}
