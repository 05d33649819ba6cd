//! Catalog data model
//!
//! Scenes as the catalog returns them. The merge tooling treats these as
//! read-only input; it only recommends new titles and tag sets.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// A file attached to a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Catalog file id (not used for grouping)
    #[serde(default)]
    pub id: String,
    /// Absolute or library-relative path, including the basename
    pub path: String,
    /// Filename with extension
    pub basename: String,
}

impl FileRef {
    pub fn new(path: impl Into<String>, basename: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            path: path.into(),
            basename: basename.into(),
        }
    }

    /// Directory containing the file; `"."` when the path has no parent
    pub fn directory(&self) -> String {
        match Path::new(&self.path).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                parent.to_string_lossy().into_owned()
            }
            _ => ".".to_string(),
        }
    }

    /// Basename with its last extension removed (`a.b.mp4` -> `a.b`)
    pub fn stem(&self) -> String {
        Path::new(&self.basename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.basename.clone())
    }
}

/// A tag reference attached to a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A scene (logical recording) in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Opaque catalog identifier
    pub id: String,
    /// Display title; the catalog reports a missing title as null
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub files: Vec<FileRef>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

impl MediaRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            files: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Attach a file (builder style)
    pub fn with_file(mut self, file: FileRef) -> Self {
        self.files.push(file);
        self
    }

    /// Attach a tag (builder style)
    pub fn with_tag(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.tags.push(TagRef {
            id: id.into(),
            name: name.into(),
        });
        self
    }

    /// First attached file, the anchor used for grouping
    pub fn primary_file(&self) -> Option<&FileRef> {
        self.files.first()
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }

    pub fn tag_ids(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.id.as_str())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
