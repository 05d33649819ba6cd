//! Per-run tag id cache
//!
//! Each tag name is resolved against the catalog at most once per
//! planning pass. Names compare case-insensitively, like the catalog's
//! own lookup.

use crate::error::MergeResult;
use crate::services::SceneCatalog;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct TagCache {
    resolved: HashMap<String, String>,
}

impl TagCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached id for `name`, asking the catalog on first use
    pub async fn resolve(&mut self, catalog: &dyn SceneCatalog, name: &str) -> MergeResult<String> {
        let key = name.to_lowercase();
        if let Some(id) = self.resolved.get(&key) {
            return Ok(id.clone());
        }

        let id = catalog.resolve_tag_id(name).await?;
        tracing::info!(tag = %name, id = %id, "Resolved tag");
        self.resolved.insert(key, id.clone());
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MergeError;
    use async_trait::async_trait;
    use mpm_common::MediaRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCatalog {
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl SceneCatalog for CountingCatalog {
        async fn fetch_all_records(&self) -> MergeResult<Vec<MediaRecord>> {
            Ok(Vec::new())
        }

        async fn resolve_tag_id(&self, name: &str) -> MergeResult<String> {
            if name == "broken" {
                return Err(MergeError::GraphQl("no such tag".into()));
            }
            let n = self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{}-{}", name.to_lowercase(), n))
        }

        async fn test_connection(&self) -> MergeResult<String> {
            Ok("test".into())
        }
    }

    #[tokio::test]
    async fn test_second_lookup_hits_cache() {
        let catalog = CountingCatalog {
            lookups: AtomicUsize::new(0),
        };
        let mut cache = TagCache::new();

        let first = cache.resolve(&catalog, "Multipart").await.unwrap();
        let second = cache.resolve(&catalog, "MULTIPART").await.unwrap();

        assert_eq!(first, "multipart-0");
        assert_eq!(first, second);
        assert_eq!(catalog.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let catalog = CountingCatalog {
            lookups: AtomicUsize::new(0),
        };
        let mut cache = TagCache::new();

        assert!(cache.resolve(&catalog, "broken").await.is_err());
        assert!(cache.is_empty());
    }
}
