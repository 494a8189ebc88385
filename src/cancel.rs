use log::{debug, info};

use crate::error::{CiboardError, Result};
use crate::providers::gitlab::{Job, PipelineGateway, ProjectRef};

/// Finds which of `candidates` owns `pipeline_id`, probing them in order.
pub async fn locate_pipeline<G: PipelineGateway>(
    gateway: &G,
    candidates: &[ProjectRef],
    pipeline_id: u64,
) -> Result<ProjectRef> {
    for project in candidates {
        if gateway.find_pipeline(project, pipeline_id).await?.is_some() {
            debug!("Pipeline {pipeline_id} belongs to project {project}");
            return Ok(project.clone());
        }
    }

    Err(CiboardError::PipelineNotFound(pipeline_id))
}

/// Cancels every job of `pipeline_id` whose stage is exactly `stage`.
///
/// Jobs are cancelled one at a time and `on_cancel` is called after each
/// one; the first failure stops the run. Returns the cancelled jobs.
pub async fn cancel_stage<G, F>(
    gateway: &G,
    project: &ProjectRef,
    pipeline_id: u64,
    stage: &str,
    mut on_cancel: F,
) -> Result<Vec<Job>>
where
    G: PipelineGateway,
    F: FnMut(&Job),
{
    let jobs = gateway.jobs(project, pipeline_id).await?;
    let mut cancelled = Vec::new();

    for job in jobs.iter().filter(|job| job.stage == stage) {
        let job = gateway.cancel_job(project, job.id).await?;
        info!("Cancelled job {} in stage {stage}", job.id);
        on_cancel(&job);
        cancelled.push(job);
    }

    Ok(cancelled)
}
