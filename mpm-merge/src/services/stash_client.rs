//! Stash GraphQL client
//!
//! Implements [`SceneCatalog`] and [`SceneMutator`] over HTTP POST to the
//! server's `/graphql` endpoint.

use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};
use crate::services::{SceneCatalog, SceneMutator};
use async_trait::async_trait;
use mpm_common::MediaRecord;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Scenes requested per page
pub const SCENES_PER_PAGE: u32 = 200;
const TAGS_PER_PAGE: u32 = 100;
const CONNECTION_TEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("mpm-merge/", env!("CARGO_PKG_VERSION"));

const VERSION_QUERY: &str = r#"
query {
  version {
    version
    build_time
  }
}"#;

const FIND_SCENES_QUERY: &str = r#"
query($page: Int!, $per_page: Int!) {
  findScenes(filter: {per_page: $per_page, page: $page}) {
    count
    scenes {
      id
      title
      files { id path basename }
      tags { id name }
    }
  }
}"#;

const FIND_TAGS_QUERY: &str = r#"
query FindTags($filter: FindFilterType!) {
  findTags(filter: $filter) {
    tags { id name }
  }
}"#;

const CREATE_TAG_MUTATION: &str = r#"
mutation CreateTag($input: TagCreateInput!) {
  tagCreate(input: $input) { id name }
}"#;

const MERGE_SCENES_MUTATION: &str = r#"
mutation MergeScenes($input: SceneMergeInput!) {
  sceneMerge(input: $input) { id }
}"#;

const UPDATE_SCENE_MUTATION: &str = r#"
mutation UpdateScene($input: SceneUpdateInput!) {
  sceneUpdate(input: $input) { id }
}"#;

/// Response envelope; `data` stays untyped until `errors` has been checked
#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    errors: Option<Value>,
}

impl GraphQlResponse {
    /// Typed `data`, or the server's `errors` when any were reported
    ///
    /// Servers may send partial (even null) data alongside errors.
    fn into_data<T: DeserializeOwned>(self) -> MergeResult<T> {
        if let Some(errors) = self.errors {
            return Err(MergeError::GraphQl(errors.to_string()));
        }
        let data = self
            .data
            .filter(|d| !d.is_null())
            .ok_or_else(|| MergeError::Decode("response has no data".to_string()))?;
        serde_json::from_value(data).map_err(|e| MergeError::Decode(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct FindScenesData {
    #[serde(rename = "findScenes")]
    find_scenes: ScenePage,
}

#[derive(Debug, Deserialize)]
struct ScenePage {
    count: u64,
    scenes: Vec<MediaRecord>,
}

#[derive(Debug, Deserialize)]
struct FindTagsData {
    #[serde(rename = "findTags")]
    find_tags: TagPage,
}

#[derive(Debug, Deserialize)]
struct TagPage {
    tags: Vec<TagNode>,
}

#[derive(Debug, Deserialize)]
struct TagNode {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreateTagData {
    #[serde(rename = "tagCreate")]
    tag_create: TagNode,
}

#[derive(Debug, Deserialize)]
struct VersionData {
    version: VersionInfo,
}

#[derive(Debug, Deserialize)]
struct VersionInfo {
    version: Option<String>,
    build_time: Option<String>,
}

/// Number of pages needed for `count` items
pub fn page_count(count: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    let pages = count.div_ceil(per_page).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// GraphQL client for a Stash server
pub struct StashClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl StashClient {
    /// Build a client for the configured endpoint
    ///
    /// Sends the API key as an `ApiKey` header; without one, falls back to
    /// the host's session cookie.
    pub fn new(config: &MergeConfig) -> MergeResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| MergeError::Config(format!("Invalid API key: {}", e)))?;
            headers.insert("apikey", value);
        } else if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(&cookie.header_value())
                .map_err(|e| MergeError::Config(format!("Invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| MergeError::Http(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Run one GraphQL operation and return its `data`
    async fn gql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> MergeResult<T> {
        let body = json!({ "query": query, "variables": variables });
        tracing::trace!(endpoint = %self.endpoint, "GraphQL request");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let envelope: GraphQlResponse = response.json().await?;
        envelope.into_data()
    }

    /// Fetch one page of scenes; returns the total count and the page
    pub async fn fetch_scenes_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> MergeResult<(u64, Vec<MediaRecord>)> {
        let data: FindScenesData = self
            .gql(FIND_SCENES_QUERY, json!({ "page": page, "per_page": per_page }))
            .await?;
        Ok((data.find_scenes.count, data.find_scenes.scenes))
    }

    async fn find_tag(&self, name: &str) -> MergeResult<Option<String>> {
        let data: FindTagsData = self
            .gql(
                FIND_TAGS_QUERY,
                json!({ "filter": { "q": name, "per_page": TAGS_PER_PAGE } }),
            )
            .await?;

        Ok(data
            .find_tags
            .tags
            .into_iter()
            .find(|t| t.name.to_lowercase() == name.to_lowercase())
            .map(|t| t.id))
    }

    async fn create_tag(&self, name: &str) -> MergeResult<String> {
        let data: CreateTagData = self
            .gql(CREATE_TAG_MUTATION, json!({ "input": { "name": name } }))
            .await?;
        tracing::info!(tag = %data.tag_create.name, id = %data.tag_create.id, "Created tag");
        Ok(data.tag_create.id)
    }

    /// Describe a failed connection test the way an operator needs it
    fn describe_transport_error(e: &reqwest::Error) -> String {
        if e.is_timeout() {
            format!("Connection timeout ({}s)", CONNECTION_TEST_TIMEOUT.as_secs())
        } else if e.is_connect() {
            "Connection refused - check URL and network".to_string()
        } else if let Some(status) = e.status() {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )
        } else if e.is_decode() {
            "Invalid JSON response - not a GraphQL endpoint".to_string()
        } else {
            format!("Unexpected error: {}", e)
        }
    }
}

#[async_trait]
impl SceneCatalog for StashClient {
    async fn fetch_all_records(&self) -> MergeResult<Vec<MediaRecord>> {
        let (total, mut records) = self.fetch_scenes_page(1, SCENES_PER_PAGE).await?;
        let pages = page_count(total, SCENES_PER_PAGE);
        tracing::info!(total, pages, "Fetching scenes");

        for page in 2..=pages {
            let (_, scenes) = self.fetch_scenes_page(page, SCENES_PER_PAGE).await?;
            tracing::debug!(page, count = scenes.len(), "Fetched scene page");
            records.extend(scenes);
        }

        Ok(records)
    }

    async fn resolve_tag_id(&self, name: &str) -> MergeResult<String> {
        match self.find_tag(name).await? {
            Some(id) => Ok(id),
            None => self.create_tag(name).await,
        }
    }

    async fn test_connection(&self) -> MergeResult<String> {
        let body = json!({ "query": VERSION_QUERY, "variables": {} });
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .timeout(CONNECTION_TEST_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| MergeError::Connection(Self::describe_transport_error(&e)))?;

        let envelope: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| MergeError::Connection(Self::describe_transport_error(&e)))?;

        let info = match envelope.into_data::<VersionData>() {
            Ok(data) => Some(data.version),
            Err(MergeError::GraphQl(errors)) => {
                return Err(MergeError::Connection(format!("GraphQL errors: {}", errors)))
            }
            Err(_) => None,
        };
        let version = info
            .as_ref()
            .and_then(|v| v.version.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let build_time = info
            .and_then(|v| v.build_time)
            .unwrap_or_else(|| "unknown".to_string());

        Ok(format!("Stash v{} (built: {})", version, build_time))
    }
}

#[async_trait]
impl SceneMutator for StashClient {
    async fn merge_scenes(&self, target_id: &str, source_ids: &[String]) -> MergeResult<()> {
        if source_ids.is_empty() {
            return Ok(());
        }
        let _: Value = self
            .gql(
                MERGE_SCENES_MUTATION,
                json!({ "input": { "destination": target_id, "source": source_ids } }),
            )
            .await?;
        Ok(())
    }

    async fn update_scene_tags(&self, scene_id: &str, tag_ids: &[String]) -> MergeResult<()> {
        let _: Value = self
            .gql(
                UPDATE_SCENE_MUTATION,
                json!({ "input": { "id": scene_id, "tag_ids": tag_ids } }),
            )
            .await?;
        Ok(())
    }

    async fn update_scene_title(&self, scene_id: &str, title: &str) -> MergeResult<()> {
        let _: Value = self
            .gql(
                UPDATE_SCENE_MUTATION,
                json!({ "input": { "id": scene_id, "title": title } }),
            )
            .await?;
        Ok(())
    }
}
