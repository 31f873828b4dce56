use std::sync::Arc;

use crate::application::services::SessionManager;
use crate::domain::repositories::assistant_storage::AssistantStorageError;

#[derive(Debug)]
pub enum ListUserRunsError {
    ValidationError(String),
    RepositoryError(String),
}

impl std::fmt::Display for ListUserRunsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListUserRunsError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ListUserRunsError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for ListUserRunsError {}

impl From<AssistantStorageError> for ListUserRunsError {
    fn from(error: AssistantStorageError) -> Self {
        ListUserRunsError::RepositoryError(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ListUserRunsResponse {
    pub user_id: String,
    /// Most recent first; the first entry is the run a returning user continues.
    pub run_ids: Vec<String>,
}

pub struct ListUserRunsUseCase {
    session_manager: Arc<SessionManager>,
}

impl ListUserRunsUseCase {
    pub fn new(session_manager: Arc<SessionManager>) -> Self {
        Self { session_manager }
    }

    pub async fn execute(&self, user_id: &str) -> Result<ListUserRunsResponse, ListUserRunsError> {
        if user_id.trim().is_empty() {
            return Err(ListUserRunsError::ValidationError(
                "User ID cannot be empty".to_string(),
            ));
        }

        let run_ids = self.session_manager.list_runs(user_id).await?;

        Ok(ListUserRunsResponse {
            user_id: user_id.to_string(),
            run_ids,
        })
    }
}
