//! Grouping and merge plan types

use mpm_common::MediaRecord;
use serde::Serialize;
use std::fmt;

/// Outcome of parsing one filename stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    /// Stem with part tokens removed and whitespace collapsed
    pub normalized_base: String,
    /// `None` exactly when no usable part token was found
    pub part_number: Option<u32>,
}

impl ParseResult {
    pub fn new(normalized_base: impl Into<String>, part_number: Option<u32>) -> Self {
        Self {
            normalized_base: normalized_base.into(),
            part_number,
        }
    }
}

/// Bucket key: directory plus lower-cased normalized base
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GroupKey {
    pub directory: String,
    pub base: String,
}

impl GroupKey {
    /// Build a key; the base is lower-cased so comparison is case-insensitive
    pub fn new(directory: impl Into<String>, normalized_base: &str) -> Self {
        Self {
            directory: directory.into(),
            base: normalized_base.to_lowercase(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :: {}", self.directory, self.base)
    }
}

/// One scene placed in a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub record: MediaRecord,
    pub part_number: u32,
    /// Basename of the file the part number was read from
    pub basename: String,
}

/// Title to set on the merge target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendedTitle {
    /// Cleaning removed nothing, or would leave the title empty
    Unchanged,
    Set(String),
}

impl RecommendedTitle {
    pub fn as_option(&self) -> Option<&str> {
        match self {
            RecommendedTitle::Unchanged => None,
            RecommendedTitle::Set(title) => Some(title),
        }
    }
}

/// Proposed consolidation of one multi-part group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    pub key: GroupKey,
    /// Lowest-numbered part; survives the merge
    pub target: MediaRecord,
    /// Remaining parts in ascending part order
    pub sources: Vec<MediaRecord>,
    /// Part numbers of target then sources
    pub part_numbers: Vec<u32>,
    /// Target's tags plus the multipart (and VR) tag, first-seen order
    pub tag_ids: Vec<String>,
    pub title: RecommendedTitle,
}

impl MergePlan {
    pub fn source_ids(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.id.clone()).collect()
    }

    /// Target id followed by source ids
    pub fn scene_ids(&self) -> Vec<String> {
        std::iter::once(&self.target)
            .chain(self.sources.iter())
            .map(|s| s.id.clone())
            .collect()
    }

    /// Target title followed by source titles
    pub fn titles(&self) -> Vec<String> {
        std::iter::once(&self.target)
            .chain(self.sources.iter())
            .map(|s| s.title.clone())
            .collect()
    }
}
