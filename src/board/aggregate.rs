use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::providers::gitlab::{CiStatus, Job};

/// Stages shown by the stage-centric board, in pipeline order.
pub const STAGE_ORDER: [&str; 10] = [
    "check", "sonar", "build", "scan", "squad1", "squad2", "dev", "prod", "roll", "secrets",
];

/// Jobs shown by the job-centric board, in pipeline order.
pub const JOB_ORDER: [&str; 9] = [
    "check",
    "sonarqube-check",
    "build",
    "vulnerability_check",
    "deploy to squad-1",
    "deploy to squad-2",
    "deploy to dev",
    "deploy to prod",
    "sentry_release",
];

/// How jobs are turned into board columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum AggregationPolicy {
    /// One column per known stage, status aggregated over the stage's jobs.
    #[default]
    #[value(name = "stage")]
    #[serde(rename = "stage")]
    StageCentric,
    /// One column per known job name, showing that job's own status.
    #[value(name = "job")]
    #[serde(rename = "job")]
    JobCentric,
}

/// Status of one board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Running,
    Pending,
    Failed,
    AllowedToFail,
    Manual,
    Passed,
    Canceled,
    Skipped,
    Other,
    Unknown,
}

impl StageStatus {
    /// Direct mapping of a single job's status, used by the job-centric board.
    pub fn of_job(job: &Job) -> Self {
        match job.status {
            CiStatus::Running => Self::Running,
            CiStatus::Pending => Self::Pending,
            CiStatus::Failed if job.allow_failure => Self::AllowedToFail,
            CiStatus::Failed => Self::Failed,
            CiStatus::Success => Self::Passed,
            CiStatus::Canceled => Self::Canceled,
            CiStatus::Skipped => Self::Skipped,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageColumn {
    pub label: String,
    pub status: StageStatus,
}

/// Folds the jobs of one stage into a single status.
///
/// Jobs are scanned once in the order the API returned them: the first
/// running, pending or failed job decides the outcome. Without one of
/// those, a stage made only of manual jobs is `Manual`, one made only of
/// successful jobs is `Passed`, and anything else is `Other`.
///
/// Returns `None` for an empty stage, which is never shown.
pub fn aggregate_stage(jobs: &[&Job]) -> Option<StageStatus> {
    if jobs.is_empty() {
        return None;
    }

    let mut all_manual = true;
    let mut all_passed = true;

    for job in jobs {
        match job.status {
            CiStatus::Running => return Some(StageStatus::Running),
            CiStatus::Pending => return Some(StageStatus::Pending),
            CiStatus::Failed if job.allow_failure => return Some(StageStatus::AllowedToFail),
            CiStatus::Failed => return Some(StageStatus::Failed),
            CiStatus::Manual => all_passed = false,
            CiStatus::Success => all_manual = false,
            _ => {
                all_manual = false;
                all_passed = false;
            }
        }
    }

    Some(if all_manual {
        StageStatus::Manual
    } else if all_passed {
        StageStatus::Passed
    } else {
        StageStatus::Other
    })
}

impl AggregationPolicy {
    /// Width the renderer pads column labels to.
    pub fn label_width(self) -> usize {
        match self {
            Self::StageCentric => 6,
            Self::JobCentric => 7,
        }
    }

    /// Builds the board columns for one pipeline's jobs, in canonical order.
    pub fn columns(self, jobs: &[Job]) -> Vec<StageColumn> {
        match self {
            Self::StageCentric => stage_columns(jobs),
            Self::JobCentric => job_columns(jobs),
        }
    }
}

fn stage_columns(jobs: &[Job]) -> Vec<StageColumn> {
    let mut by_stage: IndexMap<&str, Vec<&Job>> = IndexMap::new();
    for job in jobs {
        by_stage.entry(job.stage.as_str()).or_default().push(job);
    }

    STAGE_ORDER
        .iter()
        .filter_map(|stage| {
            let status = aggregate_stage(by_stage.get(stage)?)?;
            Some(StageColumn {
                label: (*stage).to_string(),
                status,
            })
        })
        .collect()
}

fn job_rank(name: &str) -> Option<usize> {
    JOB_ORDER.iter().position(|known| *known == name)
}

fn display_stage(stage: &str) -> &str {
    if stage == "production" {
        "prod"
    } else {
        stage
    }
}

fn job_columns(jobs: &[Job]) -> Vec<StageColumn> {
    let mut ranked: Vec<(usize, &Job)> = jobs
        .iter()
        .filter_map(|job| job_rank(&job.name).map(|rank| (rank, job)))
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);

    ranked
        .into_iter()
        .map(|(_, job)| StageColumn {
            label: display_stage(&job.stage).to_string(),
            status: StageStatus::of_job(job),
        })
        .collect()
}
