use reqwest::Method;

use crate::api::ApiClient;
use crate::workflow::{WorkflowConfig, WorkflowDraft, WorkflowError, WorkflowPayload};

const WORKFLOWS_PATH: &str = "/api/workflow-configs";

/// CRUD client for saved workflow configurations.
#[derive(Clone)]
pub struct WorkflowClient {
    api: ApiClient,
}

impl WorkflowClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<WorkflowConfig>, WorkflowError> {
        Ok(self.api.get_data(WORKFLOWS_PATH, &[]).await?)
    }

    /// Find one workflow by id from the listing.
    pub async fn find(&self, id: &str) -> Result<WorkflowConfig, WorkflowError> {
        self.list()
            .await?
            .into_iter()
            .find(|workflow| workflow.id == id)
            .ok_or_else(|| WorkflowError::NotFound(id.to_string()))
    }

    pub async fn create(&self, payload: &WorkflowPayload) -> Result<WorkflowConfig, WorkflowError> {
        let created: WorkflowConfig = self
            .api
            .send_data(Method::POST, WORKFLOWS_PATH, payload)
            .await?;
        tracing::info!(id = %created.id, name = %created.name, "Created workflow");
        Ok(created)
    }

    pub async fn update(
        &self,
        id: &str,
        payload: &WorkflowPayload,
    ) -> Result<WorkflowConfig, WorkflowError> {
        let updated: WorkflowConfig = self
            .api
            .send_data(Method::PUT, &format!("{WORKFLOWS_PATH}/{id}"), payload)
            .await?;
        tracing::info!(id = %updated.id, name = %updated.name, "Updated workflow");
        Ok(updated)
    }

    /// Validate `draft` and create or update it depending on its target.
    ///
    /// Validation failures return before any request is made.
    pub async fn save(&self, draft: &WorkflowDraft) -> Result<WorkflowConfig, WorkflowError> {
        let payload = draft.validate()?;
        match &draft.target {
            Some(id) => self.update(id, &payload).await,
            None => self.create(&payload).await,
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), WorkflowError> {
        self.api.delete(&format!("{WORKFLOWS_PATH}/{id}")).await?;
        tracing::info!(id, "Deleted workflow");
        Ok(())
    }
}
