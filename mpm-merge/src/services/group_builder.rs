//! Group builder
//!
//! Buckets scenes by (directory, normalized base) of their first file.
//! Scenes without files, or whose first file carries no part token, are
//! treated as standalone and left out of every group.

use crate::models::{GroupEntry, GroupKey};
use crate::services::part_parser;
use mpm_common::MediaRecord;
use std::collections::HashMap;

/// Groups in first-seen key order
#[derive(Debug, Clone, Default)]
pub struct GroupMap {
    groups: Vec<(GroupKey, Vec<GroupEntry>)>,
    index: HashMap<GroupKey, usize>,
}

impl GroupMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` to the bucket for `key`, creating it at the end if new
    pub fn push(&mut self, key: GroupKey, entry: GroupEntry) {
        match self.index.get(&key) {
            Some(&slot) => self.groups[slot].1.push(entry),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![entry]));
            }
        }
    }

    pub fn get(&self, key: &GroupKey) -> Option<&[GroupEntry]> {
        self.index.get(key).map(|&slot| self.groups[slot].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &[GroupEntry])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Bucket scenes into part groups
///
/// Only the first file of each scene is considered; extra files on the
/// same scene do not influence grouping.
pub fn build_groups(records: &[MediaRecord]) -> GroupMap {
    let mut groups = GroupMap::new();

    for record in records {
        let Some(file) = record.primary_file() else {
            tracing::trace!(scene_id = %record.id, "Skipping scene without files");
            continue;
        };

        let parsed = part_parser::parse(&file.stem());
        let Some(part_number) = parsed.part_number else {
            continue;
        };

        let key = GroupKey::new(file.directory(), &parsed.normalized_base);
        tracing::debug!(
            scene_id = %record.id,
            basename = %file.basename,
            part = part_number,
            group = %key,
            "Scene is a part"
        );

        groups.push(
            key,
            GroupEntry {
                record: record.clone(),
                part_number,
                basename: file.basename.clone(),
            },
        );
    }

    groups
}
