use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{AutoRetryError, Result};

use super::types::{Job, Pipeline, Project, User};

/// Thin client over the GitLab REST API.
///
/// Every call is a single synchronous round trip from the daemon's point of
/// view; there is no request-level retry here, the polling loop itself is
/// the retry mechanism.
pub struct GitLabClient {
    client: Client,
    api_url: Url,
    token: String,
}

impl GitLabClient {
    pub fn new(base_url: &str, token: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("gitlab-autoretry/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AutoRetryError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(base_url)
            .map_err(|e| AutoRetryError::Config(format!("Invalid base URL: {e}")))?
            .join("api/v4/")
            .map_err(|e| AutoRetryError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| AutoRetryError::Config(format!("Invalid endpoint URL: {e}")))
    }

    /// Send an authenticated request and decode the JSON body, keeping
    /// transport failures and decode failures distinguishable.
    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.bearer_auth(&self.token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(AutoRetryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// The authenticated user.
    pub async fn current_user(&self) -> Result<User> {
        self.execute(self.client.get(self.endpoint("user")?)).await
    }

    /// All projects belonging to the given user, ascending by id so every
    /// polling cycle walks them in the same order.
    pub async fn user_projects(&self, user_id: u64) -> Result<Vec<Project>> {
        let url = self.endpoint(&format!("users/{user_id}/projects"))?;
        let mut projects: Vec<Project> = self.execute(self.client.get(url)).await?;
        projects.sort_by_key(|p| p.id);
        Ok(projects)
    }

    /// The most recent jobs for a project, newest first.
    ///
    /// GitLab caps the unpaginated listing at 20 entries; the sort makes the
    /// newest-first ordering explicit rather than trusting the response.
    pub async fn recent_jobs(&self, project_id: u64) -> Result<Vec<Job>> {
        let url = self.endpoint(&format!("projects/{project_id}/jobs"))?;
        let mut jobs: Vec<Job> = self.execute(self.client.get(url)).await?;
        jobs.sort_by_key(|j| std::cmp::Reverse(j.id));
        Ok(jobs)
    }

    /// The most recent pipelines for a project, in the newest-first order
    /// GitLab returns them, capped at 20 entries.
    pub async fn recent_pipelines(&self, project_id: u64) -> Result<Vec<Pipeline>> {
        let url = self.endpoint(&format!("projects/{project_id}/pipelines"))?;
        self.execute(self.client.get(url)).await
    }

    /// Re-run a single job. Creates a new job server-side.
    pub async fn retry_job(&self, project_id: u64, job_id: u64) -> Result<()> {
        let url = self.endpoint(&format!("projects/{project_id}/jobs/{job_id}/retry"))?;
        let _: serde_json::Value = self.execute(self.client.post(url)).await?;
        Ok(())
    }

    /// Re-run all failed jobs of a pipeline.
    pub async fn retry_pipeline(&self, project_id: u64, pipeline_id: u64) -> Result<()> {
        let url = self.endpoint(&format!("projects/{project_id}/pipelines/{pipeline_id}/retry"))?;
        let _: serde_json::Value = self.execute(self.client.post(url)).await?;
        Ok(())
    }
}
