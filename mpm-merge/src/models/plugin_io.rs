//! Plugin host input and output documents
//!
//! The host passes a JSON document on stdin and reads a single JSON result
//! from stdout: `{"output": {...}}` on success or `{"error": "..."}`.

use crate::models::MergePlan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Read;

/// Cookie handed over by the host when no API key is configured
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionCookie {
    #[serde(rename = "Name", default = "default_cookie_name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: String,
    #[serde(rename = "Domain", default = "default_cookie_domain")]
    pub domain: String,
    #[serde(rename = "Path", default = "default_cookie_path")]
    pub path: String,
}

fn default_cookie_name() -> String {
    "session".to_string()
}

fn default_cookie_domain() -> String {
    "localhost".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

impl SessionCookie {
    /// `Cookie` request header value
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// How the host says its server can be reached
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerConnection {
    #[serde(rename = "Scheme", default)]
    pub scheme: Option<String>,
    #[serde(rename = "Host", default)]
    pub host: Option<String>,
    #[serde(rename = "Port", default)]
    pub port: Option<u16>,
    #[serde(rename = "SessionCookie", default)]
    pub session_cookie: Option<SessionCookie>,
}

impl ServerConnection {
    /// True when the host sent an empty object
    pub fn is_empty(&self) -> bool {
        self.scheme.is_none()
            && self.host.is_none()
            && self.port.is_none()
            && self.session_cookie.is_none()
    }

    /// `scheme://host:port/graphql` with http/localhost/9999 defaults
    pub fn graphql_url(&self) -> String {
        format!(
            "{}://{}:{}/graphql",
            self.scheme.as_deref().unwrap_or("http"),
            self.host.as_deref().unwrap_or("localhost"),
            self.port.unwrap_or(9999)
        )
    }
}

/// Document the host writes to stdin
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PluginInput {
    #[serde(default)]
    pub server_connection: Option<ServerConnection>,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl PluginInput {
    /// Input assumed when the tool is run outside the host
    pub fn fallback() -> Self {
        Self {
            server_connection: Some(ServerConnection {
                scheme: Some("http".to_string()),
                port: Some(9999),
                ..Default::default()
            }),
            args: Map::new(),
        }
    }

    /// Parse plugin input, falling back to [`PluginInput::fallback`] when the
    /// document is missing or malformed
    pub fn from_reader(mut reader: impl Read) -> Self {
        let mut raw = String::new();
        if let Err(e) = reader.read_to_string(&mut raw) {
            tracing::warn!(error = %e, "Could not read plugin input, using fallback");
            return Self::fallback();
        }
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(input) => input,
            Err(e) => {
                tracing::debug!(error = %e, "Plugin input is not JSON, using fallback");
                Self::fallback()
            }
        }
    }

    /// Server connection, ignoring an empty object
    pub fn connection(&self) -> Option<&ServerConnection> {
        self.server_connection.as_ref().filter(|c| !c.is_empty())
    }

    /// Plugin argument rendered as a string; JSON null counts as absent
    pub fn arg(&self, name: &str) -> Option<String> {
        match self.args.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Task mode (`merge` unless the host says otherwise)
    pub fn mode(&self) -> String {
        self.arg("mode").unwrap_or_else(|| "merge".to_string())
    }
}

/// Per-group entry of the run summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSummaryEntry {
    /// `<dir> :: <base>`
    pub group: String,
    pub parts: Vec<u32>,
    pub scene_ids: Vec<String>,
    pub titles: Vec<String>,
    pub target_id: String,
    pub recommended_title: Option<String>,
    pub tag_ids: Vec<String>,
    /// Mutating calls in issue order, rendered
    pub trace: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MergeSummaryEntry {
    pub fn from_plan(plan: &MergePlan) -> Self {
        Self {
            group: plan.key.to_string(),
            parts: plan.part_numbers.clone(),
            scene_ids: plan.scene_ids(),
            titles: plan.titles(),
            target_id: plan.target.id.clone(),
            recommended_title: plan.title.as_option().map(str::to_string),
            tag_ids: plan.tag_ids.clone(),
            trace: Vec::new(),
            error: None,
        }
    }
}

/// Successful run result
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub message: String,
    pub merged_count: usize,
    pub failed_count: usize,
    pub merge_summary: Vec<MergeSummaryEntry>,
    pub dry_run: bool,
    pub generated_at: DateTime<Utc>,
}

/// Document written to stdout
#[derive(Debug, Clone, Serialize)]
pub struct PluginOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<RunReport>,
}

impl PluginOutput {
    pub fn success(report: RunReport) -> Self {
        Self {
            error: None,
            output: Some(report),
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            output: None,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!("{{\"error\":{}}}", Value::String(e.to_string()))
        })
    }
}
