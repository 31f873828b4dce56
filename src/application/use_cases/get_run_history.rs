use std::sync::Arc;

use crate::domain::entities::ChatTurn;
use crate::domain::repositories::{AssistantStorage, assistant_storage::AssistantStorageError};

#[derive(Debug)]
pub enum GetRunHistoryError {
    RunNotFound(String),
    RepositoryError(String),
}

impl std::fmt::Display for GetRunHistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GetRunHistoryError::RunNotFound(id) => write!(f, "Run not found: {}", id),
            GetRunHistoryError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for GetRunHistoryError {}

impl From<AssistantStorageError> for GetRunHistoryError {
    fn from(error: AssistantStorageError) -> Self {
        GetRunHistoryError::RepositoryError(error.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct GetRunHistoryResponse {
    pub run_id: String,
    pub user_id: String,
    pub history: Vec<ChatTurn>,
}

pub struct GetRunHistoryUseCase {
    storage: Arc<dyn AssistantStorage>,
}

impl GetRunHistoryUseCase {
    pub fn new(storage: Arc<dyn AssistantStorage>) -> Self {
        Self { storage }
    }

    pub async fn execute(&self, run_id: &str) -> Result<GetRunHistoryResponse, GetRunHistoryError> {
        let run = self
            .storage
            .read(run_id)
            .await?
            .ok_or_else(|| GetRunHistoryError::RunNotFound(run_id.to_string()))?;

        Ok(GetRunHistoryResponse {
            run_id: run.run_id().to_string(),
            user_id: run.user_id().to_string(),
            history: run.transcript().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AssistantRun;
    use crate::test_support::InMemoryAssistantStorage;

    #[tokio::test]
    async fn test_returns_stored_history() {
        let storage = Arc::new(InMemoryAssistantStorage::default());
        let mut run = AssistantRun::with_id("run-7".to_string(), "ana".to_string());
        run.push_turn(ChatTurn::user("hi"));
        storage.upsert(&run).await.unwrap();

        let response = GetRunHistoryUseCase::new(storage)
            .execute("run-7")
            .await
            .unwrap();

        assert_eq!(response.user_id, "ana");
        assert_eq!(response.history, vec![ChatTurn::user("hi")]);
    }

    #[tokio::test]
    async fn test_unknown_run() {
        let storage = Arc::new(InMemoryAssistantStorage::default());
        let result = GetRunHistoryUseCase::new(storage).execute("nope").await;

        assert!(matches!(result, Err(GetRunHistoryError::RunNotFound(id)) if id == "nope"));
    }
}
