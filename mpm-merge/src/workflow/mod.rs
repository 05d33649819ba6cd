//! Run orchestration
//!
//! [`pipeline::run`] drives one complete pass: connection check, tag
//! resolution, fetch, grouping, planning and execution.

pub mod pipeline;

pub use pipeline::{plan_records, run};
