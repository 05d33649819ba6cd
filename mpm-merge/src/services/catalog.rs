//! Catalog collaborator interfaces
//!
//! The core never talks to the server directly. Reads go through
//! [`SceneCatalog`], writes through [`SceneMutator`]; [`StashClient`]
//! implements both over GraphQL, tests use in-memory doubles.
//!
//! [`StashClient`]: crate::services::StashClient

use crate::error::MergeResult;
use async_trait::async_trait;
use mpm_common::MediaRecord;

/// Read side of the catalog
#[async_trait]
pub trait SceneCatalog: Send + Sync {
    /// Every scene with its files and current tags
    ///
    /// Pagination and retries are the implementation's concern.
    async fn fetch_all_records(&self) -> MergeResult<Vec<MediaRecord>>;

    /// Id of the tag called `name`, creating it if needed (idempotent)
    async fn resolve_tag_id(&self, name: &str) -> MergeResult<String>;

    /// Probe the server; returns a human-readable version string
    async fn test_connection(&self) -> MergeResult<String>;
}

/// Write side of the catalog
#[async_trait]
pub trait SceneMutator: Send + Sync {
    /// Merge `source_ids` into `target_id`
    async fn merge_scenes(&self, target_id: &str, source_ids: &[String]) -> MergeResult<()>;

    /// Replace the tag set of a scene
    async fn update_scene_tags(&self, scene_id: &str, tag_ids: &[String]) -> MergeResult<()>;

    async fn update_scene_title(&self, scene_id: &str, title: &str) -> MergeResult<()>;
}
