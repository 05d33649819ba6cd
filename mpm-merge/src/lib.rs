//! mpm-merge library interface
//!
//! Finds scenes that are split parts of one recording and merges each set
//! into a single scene.
//!
//! Data flows one way:
//! scenes → [`services::group_builder`] (using [`services::part_parser`])
//! → groups → [`services::merge_planner`] → plans → [`services::plan_executor`].

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod workflow;

pub use crate::error::{MergeError, MergeResult};
