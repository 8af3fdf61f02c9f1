//! Bracketed tag extraction with whitelist filtering.

use regex::Regex;

/// Tags kept by default.
pub const DEFAULT_TAGS: &[&str] = &["info", "error", "warning", "Model", "doInitialScan", "main"];

/// Pulls `[token]` substrings out of a line and keeps the whitelisted ones.
#[derive(Debug, Clone)]
pub struct TagExtractor {
    whitelist: Vec<String>,
    bracket: Regex,
}

impl TagExtractor {
    pub fn new<I, S>(whitelist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            whitelist: whitelist.into_iter().map(Into::into).collect(),
            bracket: Regex::new(r"\[([^\]]+)\]").expect("static bracket pattern"),
        }
    }

    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    /// Extract whitelisted tags from a message's first line.
    ///
    /// Matching is case-sensitive. Result order follows first appearance and
    /// duplicates collapse.
    pub fn extract(&self, line: &str) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for caps in self.bracket.captures_iter(line) {
            let token = &caps[1];
            if self.whitelist.iter().any(|w| w == token) && !tags.iter().any(|t| t == token) {
                tags.push(token.to_string());
            }
        }
        tags
    }
}

impl Default for TagExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_TAGS.iter().copied())
    }
}
