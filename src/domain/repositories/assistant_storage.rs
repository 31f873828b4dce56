use async_trait::async_trait;

use crate::domain::entities::AssistantRun;

#[derive(Debug)]
pub enum AssistantStorageError {
    DatabaseError(String),
}

impl std::fmt::Display for AssistantStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssistantStorageError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for AssistantStorageError {}

/// Durable store of assistant runs, keyed by run ID and scoped to a user.
#[async_trait]
pub trait AssistantStorage: Send + Sync {
    /// Run IDs for `user_id`, most recently created first.
    async fn get_all_run_ids(&self, user_id: &str) -> Result<Vec<String>, AssistantStorageError>;
    async fn read(&self, run_id: &str) -> Result<Option<AssistantRun>, AssistantStorageError>;
    async fn upsert(&self, run: &AssistantRun) -> Result<(), AssistantStorageError>;
    async fn delete(&self, run_id: &str) -> Result<bool, AssistantStorageError>;
}
