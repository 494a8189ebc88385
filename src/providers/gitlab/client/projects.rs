use super::core::GitLabClient;
use crate::error::Result;
use crate::providers::gitlab::types::{Commit, Project, ProjectRef, User};

impl GitLabClient {
    pub async fn find_projects(&self, query: &str) -> Result<Vec<Project>> {
        let mut url = self.endpoint("projects")?;
        url.query_pairs_mut()
            .append_pair("search", query)
            .append_pair("simple", "true");
        self.get_paginated(url).await
    }

    pub async fn fetch_project(&self, project: &ProjectRef) -> Result<Project> {
        let url = self.endpoint(&format!("projects/{}", project.encoded()))?;
        self.get_json(url).await
    }

    pub async fn fetch_commit(&self, project: &ProjectRef, sha: &str) -> Result<Commit> {
        let url = self.endpoint(&format!(
            "projects/{}/repository/commits/{}",
            project.encoded(),
            urlencoding::encode(sha)
        ))?;
        self.get_json(url).await
    }

    pub async fn fetch_current_user(&self) -> Result<User> {
        let url = self.endpoint("user")?;
        self.get_json(url).await
    }
}
