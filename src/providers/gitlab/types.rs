use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GitLab project reference, either its numeric id or its full path
/// (e.g., "group/project"). Both forms are accepted by the REST API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectRef {
    Id(u64),
    Path(String),
}

impl ProjectRef {
    /// Path segment form, URL-encoded so that "group/project" stays one segment.
    pub fn encoded(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Path(path) => urlencoding::encode(path).into_owned(),
        }
    }
}

impl FromStr for ProjectRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse::<u64>()
            .map_or_else(|_| Self::Path(s.to_string()), Self::Id))
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Path(path) => f.write_str(path),
        }
    }
}

/// Status vocabulary shared by GitLab pipelines and jobs.
///
/// Unknown values deserialize to [`CiStatus::Other`] so a new upstream status
/// never breaks the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiStatus {
    Created,
    WaitingForResource,
    Preparing,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    Scheduled,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub path_with_namespace: String,
}

/// A pipeline as listed by `GET /projects/:id/pipelines`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    pub project_id: u64,
    #[serde(rename = "ref")]
    pub ref_: String,
    pub status: CiStatus,
    pub updated_at: DateTime<Utc>,
    pub sha: String,
}

/// A job within a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    pub id: u64,
    pub stage: String,
    pub name: String,
    pub status: CiStatus,
    #[serde(default)]
    pub allow_failure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub username: String,
}

/// Server-side filters for listing a project's pipelines.
#[derive(Debug, Clone, Default)]
pub struct PipelineFilter {
    pub updated_after: Option<DateTime<Utc>>,
    pub username: Option<String>,
}
