use std::sync::Arc;

use crate::domain::repositories::{AssistantStorage, assistant_storage::AssistantStorageError};

#[derive(Debug)]
pub enum DeleteRunError {
    RunNotFound(String),
    RepositoryError(String),
}

impl std::fmt::Display for DeleteRunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteRunError::RunNotFound(id) => write!(f, "Run not found: {}", id),
            DeleteRunError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for DeleteRunError {}

impl From<AssistantStorageError> for DeleteRunError {
    fn from(error: AssistantStorageError) -> Self {
        DeleteRunError::RepositoryError(error.to_string())
    }
}

pub struct DeleteRunUseCase {
    storage: Arc<dyn AssistantStorage>,
}

impl DeleteRunUseCase {
    pub fn new(storage: Arc<dyn AssistantStorage>) -> Self {
        Self { storage }
    }

    pub async fn execute(&self, run_id: &str) -> Result<(), DeleteRunError> {
        if !self.storage.delete(run_id).await? {
            return Err(DeleteRunError::RunNotFound(run_id.to_string()));
        }

        tracing::info!("Deleted run {}", run_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AssistantRun;
    use crate::test_support::InMemoryAssistantStorage;

    #[tokio::test]
    async fn test_deletes_stored_run() {
        let storage = Arc::new(InMemoryAssistantStorage::default());
        let run = AssistantRun::with_id("run-3".to_string(), "mali".to_string());
        storage.upsert(&run).await.unwrap();

        DeleteRunUseCase::new(storage.clone())
            .execute("run-3")
            .await
            .unwrap();

        assert!(storage.read("run-3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_run() {
        let storage = Arc::new(InMemoryAssistantStorage::default());
        let result = DeleteRunUseCase::new(storage).execute("ghost").await;

        assert!(matches!(result, Err(DeleteRunError::RunNotFound(id)) if id == "ghost"));
    }
}
