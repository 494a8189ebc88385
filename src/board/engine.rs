use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info};

use super::aggregate::{AggregationPolicy, StageColumn};
use super::window::is_on_board;
use crate::error::Result;
use crate::providers::gitlab::{Pipeline, PipelineFilter, PipelineGateway, ProjectRef};

/// Display width of the commit title column.
pub const TITLE_WIDTH: usize = 25;
const ELLIPSIS: &str = "...";

/// Upper bound on gateway calls in flight during one board fetch.
pub const MAX_CONCURRENT_FETCHES: usize = 16;

/// One line of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    pub pipeline: Pipeline,
    pub project_name: String,
    pub columns: Vec<StageColumn>,
    pub commit_title: String,
}

#[derive(Debug, Clone)]
pub struct BoardOptions {
    pub policy: AggregationPolicy,
    pub cutoff: DateTime<Utc>,
    pub only_current_user: bool,
}

struct TrackedPipeline {
    project_name: String,
    pipeline: Pipeline,
}

/// Fetches today's pipelines for `projects` and turns them into board lines,
/// most recently updated first.
///
/// Projects and pipelines are fetched concurrently, at most
/// [`MAX_CONCURRENT_FETCHES`] at a time. The final order only depends on
/// `updated_at` and on fetch order for ties. The first gateway error aborts
/// the whole board.
pub async fn build_summaries<G: PipelineGateway>(
    gateway: &G,
    projects: &[ProjectRef],
    options: &BoardOptions,
) -> Result<Vec<PipelineSummary>> {
    let username = if options.only_current_user {
        let user = gateway.current_user().await?;
        debug!("Filtering pipelines by user {}", user.username);
        Some(user.username)
    } else {
        None
    };

    let filter = PipelineFilter {
        updated_after: Some(options.cutoff),
        username,
    };

    let per_project: Vec<Vec<TrackedPipeline>> = stream::iter(
        projects
            .iter()
            .map(|project| fetch_project_pipelines(gateway, project, &filter)),
    )
    .buffered(MAX_CONCURRENT_FETCHES)
    .try_collect()
    .await?;

    let mut tracked: Vec<TrackedPipeline> = per_project.into_iter().flatten().collect();
    sort_by_recency(&mut tracked);
    tracked.retain(|t| is_on_board(t.pipeline.updated_at, options.cutoff));

    info!(
        "Summarizing {} pipelines from {} projects",
        tracked.len(),
        projects.len()
    );

    stream::iter(
        tracked
            .into_iter()
            .map(|t| summarize(gateway, t, options.policy)),
    )
    .buffered(MAX_CONCURRENT_FETCHES)
    .try_collect()
    .await
}

async fn fetch_project_pipelines<G: PipelineGateway>(
    gateway: &G,
    project: &ProjectRef,
    filter: &PipelineFilter,
) -> Result<Vec<TrackedPipeline>> {
    let details = gateway.project(project).await?;
    let pipelines = gateway.pipelines(project, filter).await?;
    debug!("{}: {} pipelines", details.name, pipelines.len());

    Ok(pipelines
        .into_iter()
        .map(|pipeline| TrackedPipeline {
            project_name: details.name.clone(),
            pipeline,
        })
        .collect())
}

/// Newest first. `sort_by` is stable, so equal timestamps keep fetch order.
fn sort_by_recency(tracked: &mut [TrackedPipeline]) {
    tracked.sort_by(|a, b| b.pipeline.updated_at.cmp(&a.pipeline.updated_at));
}

async fn summarize<G: PipelineGateway>(
    gateway: &G,
    tracked: TrackedPipeline,
    policy: AggregationPolicy,
) -> Result<PipelineSummary> {
    let TrackedPipeline {
        project_name,
        pipeline,
    } = tracked;
    let project = ProjectRef::Id(pipeline.project_id);

    let jobs = gateway.jobs(&project, pipeline.id).await?;
    let commit = gateway.commit(&project, &pipeline.sha).await?;

    Ok(PipelineSummary {
        columns: policy.columns(&jobs),
        commit_title: truncate_title(&commit.title),
        project_name,
        pipeline,
    })
}

/// Shortens a commit title to [`TITLE_WIDTH`] characters, ellipsis included.
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() <= TITLE_WIDTH {
        return title.to_string();
    }

    let head: String = title.chars().take(TITLE_WIDTH - ELLIPSIS.len()).collect();
    format!("{head}{ELLIPSIS}")
}
