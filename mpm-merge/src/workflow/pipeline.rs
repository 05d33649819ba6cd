//! Merge pipeline
//!
//! One pass over the whole catalog:
//! 1. Optional connection test
//! 2. Resolve the VR and multipart tag ids (cached for the pass)
//! 3. Fetch every scene
//! 4. Group, plan, execute or trace each plan
//!
//! A plan whose catalog calls fail is reported and skipped; the pass moves
//! on to the next plan. Failures before step 4 abort the pass.

use crate::config::MergeConfig;
use crate::error::MergeResult;
use crate::models::{MergePlan, MergeSummaryEntry, RunReport};
use crate::services::{
    build_groups, plan_merges, PlanExecutor, PlanTags, SceneCatalog, SceneMutator, TagCache,
};
use chrono::Utc;
use mpm_common::MediaRecord;
use tracing::{info, warn};

const DRY_RUN_NOTICE: &str = "DRY_RUN was ON. Use 'merge_vr_videos' task to apply changes.";

/// Group and plan `records` without touching the catalog
///
/// With `vr_only`, scenes not carrying `tags.vr_tag_id` are ignored.
pub fn plan_records(records: &[MediaRecord], tags: &PlanTags, vr_only: bool) -> Vec<MergePlan> {
    let groups = match (vr_only, tags.vr_tag_id.as_deref()) {
        (true, Some(vr_id)) => {
            let vr_records: Vec<MediaRecord> = records
                .iter()
                .filter(|r| r.has_tag(vr_id))
                .cloned()
                .collect();
            info!(kept = vr_records.len(), total = records.len(), "Restricted to VR scenes");
            build_groups(&vr_records)
        }
        _ => build_groups(records),
    };

    info!(groups = groups.len(), "Built part groups");
    plan_merges(&groups, tags)
}

/// Run one full merge pass
pub async fn run(
    config: &MergeConfig,
    catalog: &dyn SceneCatalog,
    mutator: &dyn SceneMutator,
) -> MergeResult<RunReport> {
    info!("== Merge Multipart VR Scenes ==");
    info!(endpoint = %config.endpoint, source = %config.endpoint_source, "Using GraphQL endpoint");
    info!(dry_run = config.is_dry_run(), "Execution mode");

    if config.test_connection {
        info!("Testing GraphQL connection...");
        let version = catalog.test_connection().await?;
        info!("Connection successful: {}", version);
    }

    let mut tag_cache = TagCache::new();
    let vr_tag_id = match &config.vr_tag_name {
        Some(name) => Some(tag_cache.resolve(catalog, name).await?),
        None => None,
    };
    let multipart_tag_id = tag_cache.resolve(catalog, &config.multipart_tag_name).await?;
    let tags = PlanTags {
        multipart_tag_id,
        vr_tag_id,
    };

    let records = catalog.fetch_all_records().await?;
    info!(scenes = records.len(), "Fetched scenes");

    let plans = plan_records(&records, &tags, config.vr_only);
    let executor = PlanExecutor::new(config.strategy);

    let mut merged_count = 0;
    let mut failed_count = 0;
    let mut merge_summary = Vec::with_capacity(plans.len());

    for plan in &plans {
        info!(
            group = %plan.key,
            parts = ?plan.part_numbers,
            scenes = ?plan.scene_ids(),
            "Merging group"
        );

        let outcome = executor.apply_plan(plan, mutator).await;
        let mut entry = MergeSummaryEntry::from_plan(plan);
        entry.trace = outcome.trace_lines(config.strategy);

        if outcome.is_success() {
            merged_count += 1;
        } else {
            failed_count += 1;
            warn!(group = %plan.key, "Group left partially applied");
            entry.error = outcome.error;
        }
        merge_summary.push(entry);
    }

    let mut message = format!("Done. Groups merged: {}", merged_count);
    if failed_count > 0 {
        message.push_str(&format!(", failed: {}", failed_count));
    }
    info!("{}", message);
    if config.is_dry_run() {
        info!("{}", DRY_RUN_NOTICE);
        message.push('\n');
        message.push_str(DRY_RUN_NOTICE);
    }

    Ok(RunReport {
        message,
        merged_count,
        failed_count,
        merge_summary,
        dry_run: config.is_dry_run(),
        generated_at: Utc::now(),
    })
}
