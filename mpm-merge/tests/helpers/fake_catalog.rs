//! In-memory catalog double
//!
//! Serves a fixed scene list, hands out tag ids, and records every mutating
//! call in the order it was received.

use async_trait::async_trait;
use mpm_common::{FileRef, MediaRecord};
use mpm_merge::services::{PlannedCall, SceneCatalog, SceneMutator};
use mpm_merge::{MergeError, MergeResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Scene with one file under `/library`
pub fn scene(id: &str, basename: &str) -> MediaRecord {
    scene_in(id, "/library", basename)
}

/// Scene with one file in `dir`; the title is the basename without extension
pub fn scene_in(id: &str, dir: &str, basename: &str) -> MediaRecord {
    let title = basename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(basename);
    MediaRecord::new(id, title).with_file(FileRef::new(format!("{dir}/{basename}"), basename))
}

#[derive(Default)]
pub struct FakeCatalog {
    records: Vec<MediaRecord>,
    tags: Mutex<HashMap<String, String>>,
    tag_lookups: Mutex<Vec<String>>,
    calls: Mutex<Vec<PlannedCall>>,
    /// Merges into this target fail
    fail_merge_target: Option<String>,
    fail_connection: bool,
    fail_fetch: bool,
}

impl FakeCatalog {
    pub fn new(records: Vec<MediaRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    /// Pre-existing tag
    pub fn with_tag(self, id: &str, name: &str) -> Self {
        self.tags
            .lock()
            .unwrap()
            .insert(name.to_lowercase(), id.to_string());
        self
    }

    pub fn failing_merge_into(mut self, target_id: &str) -> Self {
        self.fail_merge_target = Some(target_id.to_string());
        self
    }

    pub fn failing_connection(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Mutating calls that reached the catalog
    pub fn calls(&self) -> Vec<PlannedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Tag names looked up, in order
    pub fn tag_lookups(&self) -> Vec<String> {
        self.tag_lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl SceneCatalog for FakeCatalog {
    async fn fetch_all_records(&self) -> MergeResult<Vec<MediaRecord>> {
        if self.fail_fetch {
            return Err(MergeError::Http("503 Service Unavailable".into()));
        }
        Ok(self.records.clone())
    }

    async fn resolve_tag_id(&self, name: &str) -> MergeResult<String> {
        self.tag_lookups.lock().unwrap().push(name.to_string());
        let mut tags = self.tags.lock().unwrap();
        let next_id = format!("t{}", tags.len() + 1);
        Ok(tags.entry(name.to_lowercase()).or_insert(next_id).clone())
    }

    async fn test_connection(&self) -> MergeResult<String> {
        if self.fail_connection {
            return Err(MergeError::Connection(
                "Connection refused - check URL and network".into(),
            ));
        }
        Ok("Stash v0.27.2 (built: 2024-10-01)".to_string())
    }
}

#[async_trait]
impl SceneMutator for FakeCatalog {
    async fn merge_scenes(&self, target_id: &str, source_ids: &[String]) -> MergeResult<()> {
        if self.fail_merge_target.as_deref() == Some(target_id) {
            return Err(MergeError::GraphQl(r#"[{"message":"merge refused"}]"#.into()));
        }
        self.calls.lock().unwrap().push(PlannedCall::Merge {
            target_id: target_id.to_string(),
            source_ids: source_ids.to_vec(),
        });
        Ok(())
    }

    async fn update_scene_tags(&self, scene_id: &str, tag_ids: &[String]) -> MergeResult<()> {
        self.calls.lock().unwrap().push(PlannedCall::SetTags {
            scene_id: scene_id.to_string(),
            tag_ids: tag_ids.to_vec(),
        });
        Ok(())
    }

    async fn update_scene_title(&self, scene_id: &str, title: &str) -> MergeResult<()> {
        self.calls.lock().unwrap().push(PlannedCall::SetTitle {
            scene_id: scene_id.to_string(),
            title: title.to_string(),
        });
        Ok(())
    }
}
