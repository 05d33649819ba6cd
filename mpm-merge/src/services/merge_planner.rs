//! Merge planner
//!
//! Turns every group of two or more parts into a [`MergePlan`]: parts are
//! ordered by part number, the lowest becomes the merge target, and the
//! target gets the multipart tag plus a cleaned-up title.

use crate::models::{GroupEntry, MergePlan, RecommendedTitle};
use crate::services::group_builder::GroupMap;
use crate::services::part_parser::{collapse_whitespace, is_separator, match_keyword, run_length};
use mpm_common::MediaRecord;

/// Tag ids added to every merge target
///
/// Both ids come from the catalog; the planner never looks tags up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanTags {
    pub multipart_tag_id: String,
    pub vr_tag_id: Option<String>,
}

/// Build plans for all qualifying groups, in group order
pub fn plan_merges(groups: &GroupMap, tags: &PlanTags) -> Vec<MergePlan> {
    groups
        .iter()
        .filter_map(|(key, entries)| {
            if entries.len() < 2 {
                return None;
            }

            // Stable: equal part numbers keep discovery order
            let mut ordered: Vec<&GroupEntry> = entries.iter().collect();
            ordered.sort_by_key(|e| e.part_number);

            let target = ordered[0].record.clone();
            let sources: Vec<MediaRecord> =
                ordered[1..].iter().map(|e| e.record.clone()).collect();
            let part_numbers = ordered.iter().map(|e| e.part_number).collect();
            let tag_ids = recommended_tag_ids(&target, tags);
            let title = clean_title(&target.title);

            tracing::debug!(
                group = %key,
                target = %target.id,
                sources = sources.len(),
                "Planned merge"
            );

            Some(MergePlan {
                key: key.clone(),
                target,
                sources,
                part_numbers,
                tag_ids,
                title,
            })
        })
        .collect()
}

/// Target's tag ids followed by the multipart and VR ids, without duplicates
pub fn recommended_tag_ids(target: &MediaRecord, tags: &PlanTags) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(target.tags.len() + 2);
    let added = target
        .tag_ids()
        .chain(std::iter::once(tags.multipart_tag_id.as_str()))
        .chain(tags.vr_tag_id.as_deref());

    for id in added {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// End of a digit-numbered part token starting at `at`, if one is there
///
/// Grammar: keyword, optional separators, 1-2 digits, then a word boundary.
/// Roman numerals and A/B letters are left alone in titles.
fn match_title_token(chars: &[char], at: usize) -> Option<usize> {
    if at > 0 && is_word(chars[at - 1]) {
        return None;
    }
    let keyword_len = match_keyword(chars, at)?;
    let start = at + keyword_len + run_length(chars, at + keyword_len, usize::MAX, is_separator);
    let digits = run_length(chars, start, 2, |c| c.is_ascii_digit());

    (1..=digits)
        .rev()
        .map(|len| start + len)
        .find(|&end| end == chars.len() || !is_word(chars[end]))
}

/// Strip part tokens from a scene title
///
/// Returns [`RecommendedTitle::Unchanged`] when nothing was removed or the
/// result would be empty.
pub fn clean_title(title: &str) -> RecommendedTitle {
    let chars: Vec<char> = title.chars().collect();
    let mut stripped = String::with_capacity(title.len());
    let mut pos = 0;

    while pos < chars.len() {
        match match_title_token(&chars, pos) {
            Some(end) => pos = end,
            None => {
                stripped.push(chars[pos]);
                pos += 1;
            }
        }
    }

    let cleaned = collapse_whitespace(&stripped);
    if cleaned.is_empty() || cleaned == title {
        RecommendedTitle::Unchanged
    } else {
        RecommendedTitle::Set(cleaned)
    }
}
