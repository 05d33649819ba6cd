//! Plan executor adapter
//!
//! Maps a [`MergePlan`] to catalog calls, in this order:
//! merge, set tags, then set title (only when a new title is recommended).
//!
//! Under [`ExecutionStrategy::Trace`] nothing is mutated; the same calls
//! are recorded with the same arguments and order they would be issued with.

use crate::models::MergePlan;
use crate::services::SceneMutator;
use std::fmt;

/// How plans are carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Perform the mutations
    Apply,
    /// Record the mutations without performing them (dry run)
    Trace,
}

impl ExecutionStrategy {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, ExecutionStrategy::Trace)
    }
}

/// One mutating catalog call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedCall {
    Merge {
        target_id: String,
        source_ids: Vec<String>,
    },
    SetTags {
        scene_id: String,
        tag_ids: Vec<String>,
    },
    SetTitle {
        scene_id: String,
        title: String,
    },
}

impl PlannedCall {
    async fn perform(&self, mutator: &dyn SceneMutator) -> crate::MergeResult<()> {
        match self {
            PlannedCall::Merge {
                target_id,
                source_ids,
            } => mutator.merge_scenes(target_id, source_ids).await,
            PlannedCall::SetTags { scene_id, tag_ids } => {
                mutator.update_scene_tags(scene_id, tag_ids).await
            }
            PlannedCall::SetTitle { scene_id, title } => {
                mutator.update_scene_title(scene_id, title).await
            }
        }
    }
}

impl fmt::Display for PlannedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedCall::Merge {
                target_id,
                source_ids,
            } => write!(f, "sceneMerge target={} sources={:?}", target_id, source_ids),
            PlannedCall::SetTags { scene_id, tag_ids } => {
                write!(f, "sceneUpdate tags for {}: {:?}", scene_id, tag_ids)
            }
            PlannedCall::SetTitle { scene_id, title } => {
                write!(f, "sceneUpdate title for {}: {:?}", scene_id, title)
            }
        }
    }
}

/// Calls needed to carry out `plan`, in issue order
pub fn planned_calls(plan: &MergePlan) -> Vec<PlannedCall> {
    let mut calls = Vec::with_capacity(3);
    let source_ids = plan.source_ids();

    // A merge without sources is a no-op on the server
    if !source_ids.is_empty() {
        calls.push(PlannedCall::Merge {
            target_id: plan.target.id.clone(),
            source_ids,
        });
    }
    calls.push(PlannedCall::SetTags {
        scene_id: plan.target.id.clone(),
        tag_ids: plan.tag_ids.clone(),
    });
    if let Some(title) = plan.title.as_option() {
        calls.push(PlannedCall::SetTitle {
            scene_id: plan.target.id.clone(),
            title: title.to_string(),
        });
    }
    calls
}

/// Result of carrying out one plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    /// Every call the plan needs, in issue order
    pub calls: Vec<PlannedCall>,
    /// How many of `calls` were performed against the catalog
    pub performed: usize,
    /// First collaborator failure; later calls of the plan were skipped
    pub error: Option<String>,
}

impl PlanOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Trace lines as shown in dry-run output
    pub fn trace_lines(&self, strategy: ExecutionStrategy) -> Vec<String> {
        let prefix = if strategy.is_dry_run() { "[DRY] " } else { "" };
        self.calls.iter().map(|c| format!("{prefix}{c}")).collect()
    }
}

/// Executes or traces merge plans
#[derive(Debug, Clone, Copy)]
pub struct PlanExecutor {
    strategy: ExecutionStrategy,
}

impl PlanExecutor {
    pub fn new(strategy: ExecutionStrategy) -> Self {
        Self { strategy }
    }

    /// Carry out one plan
    ///
    /// A failing call stops this plan; plans applied earlier stay applied.
    pub async fn apply_plan(&self, plan: &MergePlan, mutator: &dyn SceneMutator) -> PlanOutcome {
        let calls = planned_calls(plan);
        let mut outcome = PlanOutcome {
            calls: Vec::with_capacity(calls.len()),
            performed: 0,
            error: None,
        };

        for call in calls {
            match self.strategy {
                ExecutionStrategy::Trace => {
                    tracing::info!("[DRY] {}", call);
                }
                ExecutionStrategy::Apply if outcome.error.is_none() => {
                    tracing::info!(group = %plan.key, "{}", call);
                    match call.perform(mutator).await {
                        Ok(()) => outcome.performed += 1,
                        Err(e) => {
                            tracing::error!(group = %plan.key, error = %e, "Catalog call failed");
                            outcome.error = Some(e.to_string());
                        }
                    }
                }
                ExecutionStrategy::Apply => {
                    tracing::warn!(group = %plan.key, "Skipped after earlier failure: {}", call);
                }
            }
            outcome.calls.push(call);
        }

        outcome
    }
}
