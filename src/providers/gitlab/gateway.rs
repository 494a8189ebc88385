use super::client::GitLabClient;
use super::types::{Commit, Job, Pipeline, PipelineFilter, Project, ProjectRef, User};
use crate::error::Result;

/// Everything the board, the registry and stage cancellation need from GitLab.
///
/// [`GitLabClient`] is the production implementation; tests swap in an
/// in-memory fake so the aggregation logic runs without a network.
#[allow(async_fn_in_trait)]
pub trait PipelineGateway {
    async fn search_projects(&self, query: &str) -> Result<Vec<Project>>;

    async fn project(&self, project: &ProjectRef) -> Result<Project>;

    async fn pipelines(&self, project: &ProjectRef, filter: &PipelineFilter)
        -> Result<Vec<Pipeline>>;

    async fn find_pipeline(&self, project: &ProjectRef, pipeline_id: u64)
        -> Result<Option<Pipeline>>;

    async fn jobs(&self, project: &ProjectRef, pipeline_id: u64) -> Result<Vec<Job>>;

    async fn commit(&self, project: &ProjectRef, sha: &str) -> Result<Commit>;

    async fn current_user(&self) -> Result<User>;

    async fn cancel_job(&self, project: &ProjectRef, job_id: u64) -> Result<Job>;
}

impl PipelineGateway for GitLabClient {
    async fn search_projects(&self, query: &str) -> Result<Vec<Project>> {
        self.find_projects(query).await
    }

    async fn project(&self, project: &ProjectRef) -> Result<Project> {
        self.fetch_project(project).await
    }

    async fn pipelines(
        &self,
        project: &ProjectRef,
        filter: &PipelineFilter,
    ) -> Result<Vec<Pipeline>> {
        self.fetch_pipelines(project, filter).await
    }

    async fn find_pipeline(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
    ) -> Result<Option<Pipeline>> {
        self.fetch_pipeline(project, pipeline_id).await
    }

    async fn jobs(&self, project: &ProjectRef, pipeline_id: u64) -> Result<Vec<Job>> {
        self.fetch_pipeline_jobs(project, pipeline_id).await
    }

    async fn commit(&self, project: &ProjectRef, sha: &str) -> Result<Commit> {
        self.fetch_commit(project, sha).await
    }

    async fn current_user(&self) -> Result<User> {
        self.fetch_current_user().await
    }

    async fn cancel_job(&self, project: &ProjectRef, job_id: u64) -> Result<Job> {
        self.post_cancel_job(project, job_id).await
    }
}

#[cfg(test)]
pub mod fake {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use chrono::{DateTime, Utc};

    use super::*;
    use crate::error::CiboardError;
    use crate::providers::gitlab::types::CiStatus;

    /// In-memory GitLab used by the board, registry and cancel tests.
    #[derive(Default)]
    pub struct FakeGateway {
        pub projects: Vec<Project>,
        pub pipelines: Vec<Pipeline>,
        pub authors: HashMap<u64, String>,
        pub jobs: HashMap<u64, Vec<Job>>,
        pub commits: HashMap<String, String>,
        pub username: String,
        pub failing_job: Option<u64>,
        pub cancelled: RefCell<Vec<u64>>,
        pub filters: RefCell<Vec<PipelineFilter>>,
    }

    impl FakeGateway {
        pub fn with_project(mut self, id: u64, name: &str) -> Self {
            self.projects.push(Project {
                id,
                name: name.to_string(),
                path_with_namespace: format!("team/{name}"),
            });
            self
        }

        pub fn with_pipeline(
            mut self,
            project_id: u64,
            id: u64,
            ref_: &str,
            updated_at: DateTime<Utc>,
            jobs: Vec<Job>,
        ) -> Self {
            let sha = format!("sha-{id}");
            self.commits
                .insert(sha.clone(), format!("Commit for pipeline {id}"));
            self.pipelines.push(Pipeline {
                id,
                project_id,
                ref_: ref_.to_string(),
                status: CiStatus::Running,
                updated_at,
                sha,
            });
            self.jobs.insert(id, jobs);
            self
        }

        fn resolve(&self, project: &ProjectRef) -> Result<&Project> {
            self.projects
                .iter()
                .find(|p| match project {
                    ProjectRef::Id(id) => p.id == *id,
                    ProjectRef::Path(path) => &p.path_with_namespace == path,
                })
                .ok_or_else(|| not_found(&format!("project {project}")))
        }
    }

    fn not_found(what: &str) -> CiboardError {
        CiboardError::ApiError {
            status: 404,
            message: format!("{what} not found"),
        }
    }

    pub fn job(id: u64, stage: &str, name: &str, status: CiStatus) -> Job {
        Job {
            id,
            stage: stage.to_string(),
            name: name.to_string(),
            status,
            allow_failure: false,
        }
    }

    impl PipelineGateway for FakeGateway {
        async fn search_projects(&self, query: &str) -> Result<Vec<Project>> {
            Ok(self
                .projects
                .iter()
                .filter(|p| p.name.contains(query))
                .cloned()
                .collect())
        }

        async fn project(&self, project: &ProjectRef) -> Result<Project> {
            self.resolve(project).cloned()
        }

        async fn pipelines(
            &self,
            project: &ProjectRef,
            filter: &PipelineFilter,
        ) -> Result<Vec<Pipeline>> {
            let project_id = self.resolve(project)?.id;
            self.filters.borrow_mut().push(filter.clone());

            // `updated_after` is ignored; the engine applies its own window.
            Ok(self
                .pipelines
                .iter()
                .filter(|p| p.project_id == project_id)
                .filter(|p| match &filter.username {
                    Some(username) => self.authors.get(&p.id) == Some(username),
                    None => true,
                })
                .cloned()
                .collect())
        }

        async fn find_pipeline(
            &self,
            project: &ProjectRef,
            pipeline_id: u64,
        ) -> Result<Option<Pipeline>> {
            let project_id = self.resolve(project)?.id;
            Ok(self
                .pipelines
                .iter()
                .find(|p| p.id == pipeline_id && p.project_id == project_id)
                .cloned())
        }

        async fn jobs(&self, _project: &ProjectRef, pipeline_id: u64) -> Result<Vec<Job>> {
            self.jobs
                .get(&pipeline_id)
                .cloned()
                .ok_or_else(|| not_found(&format!("pipeline {pipeline_id}")))
        }

        async fn commit(&self, _project: &ProjectRef, sha: &str) -> Result<Commit> {
            let title = self
                .commits
                .get(sha)
                .cloned()
                .ok_or_else(|| not_found(&format!("commit {sha}")))?;
            Ok(Commit { title })
        }

        async fn current_user(&self) -> Result<User> {
            Ok(User {
                username: self.username.clone(),
            })
        }

        async fn cancel_job(&self, _project: &ProjectRef, job_id: u64) -> Result<Job> {
            if self.failing_job == Some(job_id) {
                return Err(CiboardError::ApiError {
                    status: 403,
                    message: "403 Forbidden".to_string(),
                });
            }
            self.cancelled.borrow_mut().push(job_id);

            let mut job = self
                .jobs
                .values()
                .flatten()
                .find(|j| j.id == job_id)
                .cloned()
                .ok_or_else(|| not_found(&format!("job {job_id}")))?;
            job.status = CiStatus::Canceled;
            Ok(job)
        }
    }
}
