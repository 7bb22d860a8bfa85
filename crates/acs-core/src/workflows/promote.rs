use super::error::WorkflowError;
use super::partition::merge_partitions;
use crate::core::models::job::{OutcomeBuckets, PostScreeningJob, ScreeningJob};
use crate::engine::config::PromotionConfig;
use crate::engine::selection::SelectionPolicy;
use tracing::{info, instrument};

/// Builds the post-screening job for a finished screening job.
///
/// Species, level of theory, solvation flag and project context are copied. Only
/// screened conformers chosen by `policy` are carried over, each queued for
/// optimization; colliding, crashing, unscreened and unselected conformers stay
/// behind. Every outcome set of the new job starts empty rather than unset.
#[instrument(skip_all, name = "promote_to_post_screening")]
pub fn promote_to_post_screening(
    job: &ScreeningJob,
    policy: &dyn SelectionPolicy,
) -> Result<PostScreeningJob, WorkflowError> {
    let candidates = job.screened_candidates();
    let selected = policy.select(&candidates);

    let mut post = PostScreeningJob::new();
    post.project = job.project.clone();
    post.project_folder_path = job.project_folder_path.clone();
    post.calc_solvation_sp_correction = job.calc_solvation_sp_correction;
    post.comment = job.comment.clone();
    post.level_of_theory = job.level_of_theory.clone();
    post.species = job.species.clone();
    for &outcome in PostScreeningJob::OUTCOMES {
        *post.bucket_slot(outcome) = Some(Vec::new());
    }

    for id in &selected {
        post.select_for_optimization(job, id)?;
    }

    info!(
        "Promoted {} of {} screened conformers ({} generated)",
        selected.len(),
        candidates.len(),
        job.conformers.len()
    );
    Ok(post)
}

/// Merges screening partitions and promotes the result according to `config`.
#[instrument(skip_all, name = "promote_partitions", fields(partitions = parts.len()))]
pub fn promote_partitions(
    parts: &[ScreeningJob],
    config: &PromotionConfig,
) -> Result<PostScreeningJob, WorkflowError> {
    let merged = merge_partitions(parts)?;
    let mut post = promote_to_post_screening(&merged, &config.selection)?;
    if let Some(folder) = &config.project_folder_path {
        post.project_folder_path = Some(folder.clone());
    }
    if let Some(comment) = &config.comment {
        post.comment = Some(comment.clone());
    }
    Ok(post)
}
