//! Data models for grouping, planning and plugin I/O

pub mod merge_plan;
pub mod plugin_io;

pub use merge_plan::{GroupEntry, GroupKey, MergePlan, ParseResult, RecommendedTitle};
pub use plugin_io::{
    MergeSummaryEntry, PluginInput, PluginOutput, RunReport, ServerConnection, SessionCookie,
};
