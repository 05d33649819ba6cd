//! # MPM Common Library
//!
//! Shared code for the multipart merge tooling:
//! - Catalog data model (scenes, files, tags)
//! - Bootstrap configuration loading (TOML)
//! - Tiered setting resolution
//! - Common error type

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{FileRef, MediaRecord, TagRef};
