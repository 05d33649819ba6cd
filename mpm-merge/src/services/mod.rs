//! Services: the grouping/planning core and its collaborators

pub mod catalog;
pub mod group_builder;
pub mod merge_planner;
pub mod part_parser;
pub mod plan_executor;
pub mod stash_client;
pub mod tag_cache;

pub use catalog::{SceneCatalog, SceneMutator};
pub use group_builder::{build_groups, GroupMap};
pub use merge_planner::{clean_title, plan_merges, PlanTags};
pub use plan_executor::{ExecutionStrategy, PlanExecutor, PlanOutcome, PlannedCall};
pub use stash_client::StashClient;
pub use tag_cache::TagCache;
