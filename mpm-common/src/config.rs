//! Configuration loading and tiered setting resolution
//!
//! Settings are resolved from several sources, highest priority first:
//! 1. Plugin arguments (supplied by the host on stdin)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled default
//!
//! The TOML file itself is located in the same spirit:
//! command-line argument, then environment variable, then the OS config dir.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit TOML config file
pub const CONFIG_ENV_VAR: &str = "MPM_CONFIG";

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional; a missing file is equivalent to an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// GraphQL endpoint of the catalog server
    #[serde(default)]
    pub stash_url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Tag applied to merged VR scenes (empty string disables)
    #[serde(default)]
    pub vr_tag_name: Option<String>,

    #[serde(default)]
    pub multipart_tag_name: Option<String>,

    #[serde(default)]
    pub dry_run: Option<bool>,

    #[serde(default)]
    pub test_connection: Option<bool>,

    /// Only group scenes already carrying the VR tag
    #[serde(default)]
    pub vr_only: Option<bool>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Look up a string setting by its plugin name
    pub fn get_str(&self, name: &str) -> Option<String> {
        match name {
            "stash_url" => self.stash_url.clone(),
            "api_key" => self.api_key.clone(),
            "vr_tag_name" => self.vr_tag_name.clone(),
            "multipart_tag_name" => self.multipart_tag_name.clone(),
            _ => None,
        }
    }

    /// Look up a boolean setting by its plugin name
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match name {
            "dry_run" => self.dry_run,
            "test_connection" => self.test_connection,
            "vr_only" => self.vr_only,
            _ => None,
        }
    }
}

/// Where a resolved setting came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingSource {
    PluginArg,
    Environment,
    TomlFile,
    ServerConnection,
    Default,
}

impl SettingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingSource::PluginArg => "plugin arg",
            SettingSource::Environment => "environment variable",
            SettingSource::TomlFile => "TOML config",
            SettingSource::ServerConnection => "server_connection",
            SettingSource::Default => "default",
        }
    }
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the first tier that holds a value
///
/// Tiers are given highest priority first.
pub fn first_present<T>(
    tiers: impl IntoIterator<Item = (SettingSource, Option<T>)>,
) -> Option<(T, SettingSource)> {
    tiers
        .into_iter()
        .find_map(|(source, value)| value.map(|v| (v, source)))
}

/// Read an environment variable, treating unset and non-UTF-8 alike
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Parse a plugin-style boolean ("true" in any case is true, anything else false)
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Locate the TOML config file
///
/// Priority: explicit path → `MPM_CONFIG` → `<config_dir>/mpm/config.toml`.
/// Returns `None` when no candidate is known.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Some(path) = env_value(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    default_config_path()
}

/// OS-dependent default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mpm").join("config.toml"))
}

/// Load the TOML config from `path`
///
/// A missing file yields the default config; an unreadable or malformed
/// file is an error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    tracing::info!(path = %path.display(), "Loaded TOML config");
    Ok(config)
}
