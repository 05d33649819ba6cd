//! Run configuration for mpm-merge
//!
//! Everything the run needs is resolved once, up front, into a
//! [`MergeConfig`] that is passed by reference afterwards.
//!
//! **Endpoint priority:** plugin arg `stash_url` → `STASH_URL` → TOML
//! `stash_url` → host server connection → `http://localhost:9999/graphql`
//!
//! **Other settings:** plugin arg → upper-cased environment variable →
//! TOML → default

use crate::models::{PluginInput, SessionCookie};
use crate::services::ExecutionStrategy;
use mpm_common::config::{env_value, first_present, parse_flag, SettingSource, TomlConfig};
use tracing::info;

/// Endpoint used when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9999/graphql";
pub const DEFAULT_VR_TAG_NAME: &str = "VR";
pub const DEFAULT_MULTIPART_TAG_NAME: &str = "Multipart";

/// Resolved configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    /// GraphQL endpoint, always ending in `/graphql`
    pub endpoint: String,
    pub endpoint_source: SettingSource,
    pub api_key: Option<String>,
    /// Only used when no API key is configured
    pub session_cookie: Option<SessionCookie>,
    /// `None` disables VR tagging
    pub vr_tag_name: Option<String>,
    pub multipart_tag_name: String,
    pub test_connection: bool,
    /// Only group scenes already tagged VR
    pub vr_only: bool,
    pub strategy: ExecutionStrategy,
}

impl MergeConfig {
    /// Resolve configuration from plugin input and the TOML file
    pub fn resolve(input: &PluginInput, toml: &TomlConfig) -> Self {
        let (endpoint, endpoint_source) = resolve_endpoint(input, toml);

        let api_key = plugin_setting(input, toml, "api_key")
            .map(|(v, _)| v)
            .or_else(|| env_value("STASH_API_KEY"))
            .filter(|k| !k.trim().is_empty());

        let session_cookie = if api_key.is_none() {
            input
                .connection()
                .and_then(|c| c.session_cookie.clone())
        } else {
            None
        };

        let vr_tag_name = plugin_setting(input, toml, "vr_tag_name")
            .map(|(v, _)| v)
            .unwrap_or_else(|| DEFAULT_VR_TAG_NAME.to_string());
        let vr_tag_name = Some(vr_tag_name).filter(|n| !n.trim().is_empty());

        let multipart_tag_name = plugin_setting(input, toml, "multipart_tag_name")
            .map(|(v, _)| v)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MULTIPART_TAG_NAME.to_string());

        let dry_run = input.mode() == "preview" || plugin_flag(input, toml, "dry_run");
        let strategy = if dry_run {
            ExecutionStrategy::Trace
        } else {
            ExecutionStrategy::Apply
        };

        let config = Self {
            endpoint,
            endpoint_source,
            api_key,
            session_cookie,
            vr_tag_name,
            multipart_tag_name,
            test_connection: plugin_flag(input, toml, "test_connection"),
            vr_only: plugin_flag(input, toml, "vr_only"),
            strategy,
        };

        info!(
            endpoint = %config.endpoint,
            source = %config.endpoint_source,
            dry_run,
            authenticated = config.api_key.is_some() || config.session_cookie.is_some(),
            "Configuration resolved"
        );
        config
    }

    pub fn is_dry_run(&self) -> bool {
        self.strategy.is_dry_run()
    }
}

/// Ensure a user-supplied URL ends in `/graphql`
pub fn normalize_graphql_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with("/graphql") {
        trimmed.to_string()
    } else {
        format!("{}/graphql", trimmed)
    }
}

/// Resolve the GraphQL endpoint and report where it came from
pub fn resolve_endpoint(input: &PluginInput, toml: &TomlConfig) -> (String, SettingSource) {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    let user_supplied = first_present([
        (SettingSource::PluginArg, non_empty(input.arg("stash_url"))),
        (SettingSource::Environment, non_empty(env_value("STASH_URL"))),
        (SettingSource::TomlFile, non_empty(toml.stash_url.clone())),
    ]);

    if let Some((url, source)) = user_supplied {
        return (normalize_graphql_url(&url), source);
    }

    match input.connection() {
        Some(conn) => (conn.graphql_url(), SettingSource::ServerConnection),
        None => (DEFAULT_ENDPOINT.to_string(), SettingSource::Default),
    }
}

/// Plugin arg → `NAME` environment variable → TOML
pub fn plugin_setting(
    input: &PluginInput,
    toml: &TomlConfig,
    name: &str,
) -> Option<(String, SettingSource)> {
    first_present([
        (SettingSource::PluginArg, input.arg(name)),
        (SettingSource::Environment, env_value(&name.to_uppercase())),
        (SettingSource::TomlFile, toml.get_str(name)),
    ])
}

/// Boolean setting, false unless some tier says otherwise
pub fn plugin_flag(input: &PluginInput, toml: &TomlConfig, name: &str) -> bool {
    if let Some(raw) = input.arg(name) {
        return parse_flag(&raw);
    }
    if let Some(raw) = env_value(&name.to_uppercase()) {
        return parse_flag(&raw);
    }
    toml.get_bool(name).unwrap_or(false)
}
