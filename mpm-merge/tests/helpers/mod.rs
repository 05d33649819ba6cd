//! Test Helper Utilities
//!
//! Shared utilities for testing mpm-merge

#![allow(dead_code)]

pub mod fake_catalog;
pub mod log_capture;

pub use fake_catalog::{scene, scene_in, FakeCatalog};
pub use log_capture::capture_logs;
