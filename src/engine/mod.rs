//! Log-line reconstruction engine.
//!
//! One parameterised engine serves every log source. The parameters are:
//!
//! - the grammar list and candidate policy ([`GrammarSet`])
//! - the tag whitelist ([`TagExtractor`])
//! - where the folder date comes from ([`FolderPolicy`])
//! - the continuation joiner
//! - how undecodable bytes are treated ([`DecodePolicy`])
//!
//! The engine is immutable once built and holds no per-file state, so one
//! instance is shared by every worker of a batch.

pub mod folder;
pub mod grammar;
pub mod reconstruct;
pub mod tags;

pub use folder::{resolve_timestamp, FolderDate, FolderPolicy};
pub use grammar::{Builtin, GrammarMatch, GrammarSet, TimestampGrammar};
pub use reconstruct::{LineEvent, MessageReconstructor};
pub use tags::TagExtractor;

use serde::{Deserialize, Serialize};

/// Default separator between a message's physical lines.
pub const DEFAULT_JOINER: &str = "\n";

/// Treatment of byte sequences that are not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Replace invalid sequences with U+FFFD and keep going.
    #[default]
    Lossy,
    /// Treat invalid UTF-8 as a read failure for the file.
    Strict,
}

/// The configured reconstruction engine.
#[derive(Debug, Clone)]
pub struct Engine {
    grammars: GrammarSet,
    tags: TagExtractor,
    folder_policy: FolderPolicy,
    joiner: String,
    decode: DecodePolicy,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn grammars(&self) -> &GrammarSet {
        &self.grammars
    }

    pub fn tags(&self) -> &TagExtractor {
        &self.tags
    }

    pub fn folder_policy(&self) -> &FolderPolicy {
        &self.folder_policy
    }

    pub fn joiner(&self) -> &str {
        &self.joiner
    }

    pub fn decode_policy(&self) -> DecodePolicy {
        self.decode
    }
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::default().build()
    }
}

/// Builder for [`Engine`]. Unset fields take the general-log defaults.
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    grammars: Option<GrammarSet>,
    tags: Option<TagExtractor>,
    folder_policy: FolderPolicy,
    joiner: Option<String>,
    decode: DecodePolicy,
}

impl EngineBuilder {
    pub fn grammars(mut self, grammars: GrammarSet) -> Self {
        self.grammars = Some(grammars);
        self
    }

    pub fn tags(mut self, tags: TagExtractor) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn folder_policy(mut self, policy: FolderPolicy) -> Self {
        self.folder_policy = policy;
        self
    }

    pub fn joiner(mut self, joiner: impl Into<String>) -> Self {
        self.joiner = Some(joiner.into());
        self
    }

    pub fn decode(mut self, decode: DecodePolicy) -> Self {
        self.decode = decode;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            grammars: self.grammars.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            folder_policy: self.folder_policy,
            joiner: self.joiner.unwrap_or_else(|| DEFAULT_JOINER.to_string()),
            decode: self.decode,
        }
    }
}
