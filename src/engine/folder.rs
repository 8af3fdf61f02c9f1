//! Folder timestamps: coarse dates encoded in directory names.
//!
//! Editor log folders are named like `20240115T101500`, and extension-host
//! output folders like `output_logging_20240115T101502`. Lines inside them
//! often carry only a time of day, so the folder's date completes them.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use super::grammar::GrammarMatch;

/// Where a file's folder timestamp comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "prefix")]
pub enum FolderPolicy {
    /// First path component of the file relative to its scan root.
    #[default]
    RootRelative,
    /// First path component starting with the prefix (case-insensitive),
    /// with the prefix removed.
    MarkerPrefix(String),
    /// Never derive a folder timestamp.
    Disabled,
}

impl FolderPolicy {
    /// Derive the raw folder timestamp string for a file.
    ///
    /// Returns an empty string when the policy finds nothing. With
    /// `RootRelative` and no root, the file's parent directory name is used.
    pub fn folder_timestamp(&self, root: Option<&Path>, path: &Path) -> String {
        match self {
            FolderPolicy::RootRelative => {
                let relative = root.and_then(|r| path.strip_prefix(r).ok());
                match relative {
                    // A file directly under the root has no folder component;
                    // its own name is what the root-relative walk sees first.
                    Some(rel) => first_normal_component(rel).unwrap_or_default(),
                    None => path
                        .parent()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                }
            }
            FolderPolicy::MarkerPrefix(prefix) => path
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .find_map(|part| {
                    let head = part.get(..prefix.len())?;
                    if head.eq_ignore_ascii_case(prefix) {
                        Some(part[prefix.len()..].to_string())
                    } else {
                        None
                    }
                })
                .unwrap_or_default(),
            FolderPolicy::Disabled => String::new(),
        }
    }
}

fn first_normal_component(rel: &Path) -> Option<String> {
    rel.components().find_map(|c| match c {
        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
        _ => None,
    })
}

/// A calendar date taken from a folder name, kept as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderDate(String);

impl FolderDate {
    /// Recognise an 8-digit `YYYYMMDD` prefix.
    ///
    /// Names shorter than eight characters or whose first eight characters
    /// are not all ASCII digits yield `None`.
    pub fn from_folder_name(name: &str) -> Option<Self> {
        let head = name.as_bytes().get(..8)?;
        if !head.iter().all(u8::is_ascii_digit) {
            return None;
        }
        // All eight bytes are ASCII, so these slices are on char boundaries.
        Some(Self(format!(
            "{}-{}-{}",
            &name[..4],
            &name[4..6],
            &name[6..8]
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix a time-of-day literal with this date.
    pub fn combine(&self, time: &str) -> String {
        format!("{} {}", self.0, time)
    }
}

/// Final timestamp for a grammar match.
///
/// Matches that already carry a date are returned unmodified: the embedded
/// date is more precise than the directory name. Time-only matches are
/// completed with the folder date when one is known.
pub fn resolve_timestamp(m: &GrammarMatch<'_>, folder_date: Option<&FolderDate>) -> String {
    match folder_date {
        Some(date) if m.time_only => date.combine(m.timestamp),
        _ => m.timestamp.to_string(),
    }
}
