//! Timestamp grammars and the line matcher.
//!
//! A grammar is one recognised textual shape for a timestamp prefix. Grammars
//! are tried in a fixed, declared order (most specific first) and the first
//! hit wins.
//!
//! # Candidates
//!
//! Some emitters put a level tag in front of the timestamp
//! (`[info] 10:15:00.123 ...`). To cover those, every line yields up to two
//! candidates:
//!
//! 1. the line with leading whitespace removed
//! 2. if (1) does not start with a digit, the text from its first digit on
//!
//! Grammars form the outer loop and candidates the inner loop. A line
//! without any digit never matches.

use regex::Regex;

use crate::error::IngestError;

/// Name of the built-in `YYYY-MM-DD HH:MM:SS.mmm` grammar.
pub const DATETIME_MILLIS: &str = "datetime_millis";
/// Name of the built-in `HH:MM:SS.mmm` grammar.
pub const TIME_MILLIS: &str = "time_millis";
/// Name of the built-in `HH:MM:SS` grammar.
pub const TIME: &str = "time";

/// One timestamp grammar.
///
/// The pattern must be anchored and expose two named groups: `ts` (the
/// timestamp literal) and `rest` (whatever follows it).
#[derive(Debug, Clone)]
pub struct TimestampGrammar {
    name: String,
    regex: Regex,
    time_only: bool,
}

impl TimestampGrammar {
    /// Build a grammar from a regex pattern.
    ///
    /// Fails with [`IngestError::InvalidGrammar`] if the pattern does not
    /// compile or lacks the `ts`/`rest` groups.
    pub fn new(name: &str, pattern: &str, time_only: bool) -> Result<Self, IngestError> {
        let regex = Regex::new(pattern).map_err(|e| IngestError::InvalidGrammar {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        let names: Vec<&str> = regex.capture_names().flatten().collect();
        for required in ["ts", "rest"] {
            if !names.contains(&required) {
                return Err(IngestError::InvalidGrammar {
                    name: name.to_string(),
                    reason: format!("missing named group `{}`", required),
                });
            }
        }

        Ok(Self {
            name: name.to_string(),
            regex,
            time_only,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the grammar carries no date, so the folder date may complete it.
    pub fn is_time_only(&self) -> bool {
        self.time_only
    }

    fn match_candidate<'l>(&self, candidate: &'l str) -> Option<(&'l str, &'l str)> {
        let caps = self.regex.captures(candidate)?;
        let ts = caps.name("ts")?.as_str();
        let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or("");
        Some((ts, rest))
    }
}

/// A successful grammar match against one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarMatch<'l> {
    /// Name of the grammar that matched.
    pub grammar: &'l str,
    /// Whether that grammar is time-only.
    pub time_only: bool,
    /// The timestamp literal exactly as it appeared in the line.
    pub timestamp: &'l str,
    /// Text after the timestamp and its separating whitespace.
    pub remainder: &'l str,
}

/// Ordered list of grammars plus the candidate policy.
#[derive(Debug, Clone)]
pub struct GrammarSet {
    grammars: Vec<TimestampGrammar>,
    prefix_scan: bool,
    first_digit: Regex,
}

impl GrammarSet {
    /// Create a set from grammars in precedence order.
    pub fn new(grammars: Vec<TimestampGrammar>) -> Self {
        Self {
            grammars,
            prefix_scan: true,
            // Same notion of "digit" as the grammars use.
            first_digit: Regex::new(r"\d").expect("static digit pattern"),
        }
    }

    /// The three built-in grammars, most specific first.
    pub fn standard() -> Self {
        Self::only(&Builtin::ALL)
    }

    /// Keep only the given built-in grammars, in the given order.
    pub fn only(builtins: &[Builtin]) -> Self {
        Self::new(builtins.iter().map(|b| b.grammar()).collect())
    }

    /// Enable or disable the shifted-to-first-digit candidate.
    pub fn with_prefix_scan(mut self, enabled: bool) -> Self {
        self.prefix_scan = enabled;
        self
    }

    /// Append a grammar after the existing ones.
    ///
    /// Appending never changes the precedence of grammars already present.
    pub fn push(&mut self, grammar: TimestampGrammar) {
        self.grammars.push(grammar);
    }

    pub fn grammars(&self) -> &[TimestampGrammar] {
        &self.grammars
    }

    pub fn prefix_scan(&self) -> bool {
        self.prefix_scan
    }

    /// Try every grammar against the line's candidates.
    ///
    /// Returns `None` for a grammar mismatch, which is ordinary control flow.
    pub fn match_line<'l>(&'l self, line: &'l str) -> Option<GrammarMatch<'l>> {
        let (primary, shifted) = if self.prefix_scan {
            let trimmed = line.trim_start();
            (trimmed, self.shifted_candidate(trimmed))
        } else {
            (line, None)
        };

        for grammar in &self.grammars {
            for candidate in std::iter::once(primary).chain(shifted) {
                if let Some((timestamp, remainder)) = grammar.match_candidate(candidate) {
                    return Some(GrammarMatch {
                        grammar: grammar.name(),
                        time_only: grammar.is_time_only(),
                        timestamp,
                        remainder,
                    });
                }
            }
        }

        None
    }

    fn shifted_candidate<'l>(&self, trimmed: &'l str) -> Option<&'l str> {
        let digit = self.first_digit.find(trimmed)?;
        if digit.start() > 0 {
            Some(&trimmed[digit.start()..])
        } else {
            None
        }
    }
}

impl Default for GrammarSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// The grammars every profile chooses from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    DatetimeMillis,
    TimeMillis,
    Time,
}

impl Builtin {
    /// Precedence order.
    pub const ALL: [Builtin; 3] = [Builtin::DatetimeMillis, Builtin::TimeMillis, Builtin::Time];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::DatetimeMillis => DATETIME_MILLIS,
            Builtin::TimeMillis => TIME_MILLIS,
            Builtin::Time => TIME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    fn pattern(self) -> &'static str {
        match self {
            Builtin::DatetimeMillis => {
                r"^(?P<ts>\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3})\s+(?P<rest>.*)$"
            }
            Builtin::TimeMillis => r"^(?P<ts>\d{2}:\d{2}:\d{2}\.\d{3})\s+(?P<rest>.*)$",
            Builtin::Time => r"^(?P<ts>\d{2}:\d{2}:\d{2})\s+(?P<rest>.*)$",
        }
    }

    pub fn grammar(self) -> TimestampGrammar {
        let time_only = self != Builtin::DatetimeMillis;
        TimestampGrammar::new(self.name(), self.pattern(), time_only)
            .expect("built-in grammar must compile")
    }
}
