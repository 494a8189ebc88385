use chrono::SecondsFormat;

use super::core::GitLabClient;
use crate::error::Result;
use crate::providers::gitlab::types::{Job, Pipeline, PipelineFilter, ProjectRef};

impl GitLabClient {
    /// Lists a project's pipelines, most recently updated first.
    pub async fn fetch_pipelines(
        &self,
        project: &ProjectRef,
        filter: &PipelineFilter,
    ) -> Result<Vec<Pipeline>> {
        let mut url = self.endpoint(&format!("projects/{}/pipelines", project.encoded()))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("order_by", "updated_at")
                .append_pair("sort", "desc");
            if let Some(updated_after) = filter.updated_after {
                query.append_pair(
                    "updated_after",
                    &updated_after.to_rfc3339_opts(SecondsFormat::Secs, true),
                );
            }
            if let Some(username) = &filter.username {
                query.append_pair("username", username);
            }
        }

        self.get_paginated(url).await
    }

    /// Looks a pipeline up inside one project; `None` when the project does
    /// not own it.
    pub async fn fetch_pipeline(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
    ) -> Result<Option<Pipeline>> {
        let url = self.endpoint(&format!(
            "projects/{}/pipelines/{pipeline_id}",
            project.encoded()
        ))?;
        self.get_optional_json(url).await
    }

    pub async fn fetch_pipeline_jobs(
        &self,
        project: &ProjectRef,
        pipeline_id: u64,
    ) -> Result<Vec<Job>> {
        let url = self.endpoint(&format!(
            "projects/{}/pipelines/{pipeline_id}/jobs",
            project.encoded()
        ))?;
        self.get_paginated(url).await
    }

    pub async fn post_cancel_job(&self, project: &ProjectRef, job_id: u64) -> Result<Job> {
        let url = self.endpoint(&format!(
            "projects/{}/jobs/{job_id}/cancel",
            project.encoded()
        ))?;
        let response = self.send(self.client.post(url)).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use mockito::Matcher;

    use super::*;
    use crate::auth::Token;
    use crate::providers::gitlab::types::CiStatus;

    #[tokio::test]
    async fn pipelines_are_filtered_server_side() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/7/pipelines")
            .match_header("authorization", "Bearer glpat-test")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("updated_after".into(), "2024-05-02T06:00:00Z".into()),
                Matcher::UrlEncoded("username".into(), "jdoe".into()),
                Matcher::UrlEncoded("per_page".into(), "100".into()),
            ]))
            .with_body(
                r#"[{"id": 11, "project_id": 7, "ref": "main", "status": "success",
                     "updated_at": "2024-05-02T09:00:00Z", "sha": "abc"}]"#,
            )
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), Some(Token::from("glpat-test"))).unwrap();
        let filter = PipelineFilter {
            updated_after: Some(Utc.with_ymd_and_hms(2024, 5, 2, 6, 0, 0).unwrap()),
            username: Some("jdoe".to_string()),
        };

        let pipelines = client
            .fetch_pipelines(&ProjectRef::Id(7), &filter)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(pipelines.len(), 1);
        assert_eq!(pipelines[0].status, CiStatus::Success);
    }

    #[tokio::test]
    async fn missing_pipeline_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v4/projects/7/pipelines/99")
            .with_status(404)
            .with_body(r#"{"message":"404 Not found"}"#)
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), None).unwrap();
        let pipeline = client.fetch_pipeline(&ProjectRef::Id(7), 99).await.unwrap();
        assert!(pipeline.is_none());
    }

    #[tokio::test]
    async fn jobs_are_listed_for_path_projects() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/group%2Fsvc/pipelines/11/jobs")
            .match_query(Matcher::Any)
            .with_body(
                r#"[{"id": 1, "stage": "build", "name": "build", "status": "failed", "allow_failure": true},
                    {"id": 2, "stage": "dev", "name": "deploy to dev", "status": "manual"}]"#,
            )
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), None).unwrap();
        let jobs = client
            .fetch_pipeline_jobs(&ProjectRef::Path("group/svc".to_string()), 11)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(jobs.len(), 2);
        assert!(jobs[0].allow_failure);
        assert_eq!(jobs[1].status, CiStatus::Manual);
    }

    #[tokio::test]
    async fn cancel_posts_to_job_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v4/projects/7/jobs/42/cancel")
            .with_status(201)
            .with_body(r#"{"id": 42, "stage": "dev", "name": "deploy", "status": "canceled"}"#)
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), None).unwrap();
        let job = client.post_cancel_job(&ProjectRef::Id(7), 42).await.unwrap();

        mock.assert_async().await;
        assert_eq!(job.status, CiStatus::Canceled);
    }
}
