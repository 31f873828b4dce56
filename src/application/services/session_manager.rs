use std::sync::Arc;

use crate::domain::repositories::{AssistantStorage, assistant_storage::AssistantStorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResolution {
    Continue(String),
    StartNew,
}

impl RunResolution {
    pub fn run_id(&self) -> Option<&str> {
        match self {
            RunResolution::Continue(run_id) => Some(run_id),
            RunResolution::StartNew => None,
        }
    }
}

/// Decides which stored run a user's conversation continues.
pub struct SessionManager {
    storage: Arc<dyn AssistantStorage>,
}

impl SessionManager {
    pub fn new(storage: Arc<dyn AssistantStorage>) -> Self {
        Self { storage }
    }

    /// With `new_session` set storage is not consulted at all. Otherwise the
    /// first run ID returned by storage (the most recent one) is continued.
    pub async fn resolve(
        &self,
        user_id: &str,
        new_session: bool,
    ) -> Result<RunResolution, AssistantStorageError> {
        if new_session {
            return Ok(RunResolution::StartNew);
        }

        let run_ids = self.storage.get_all_run_ids(user_id).await?;
        Ok(match run_ids.into_iter().next() {
            Some(run_id) => RunResolution::Continue(run_id),
            None => RunResolution::StartNew,
        })
    }

    pub async fn list_runs(&self, user_id: &str) -> Result<Vec<String>, AssistantStorageError> {
        self.storage.get_all_run_ids(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::AssistantRun;
    use crate::test_support::InMemoryAssistantStorage;

    #[tokio::test]
    async fn test_new_session_never_reuses() {
        let storage = Arc::new(InMemoryAssistantStorage::default());
        storage
            .upsert(&AssistantRun::new("user".to_string()))
            .await
            .unwrap();

        let manager = SessionManager::new(storage.clone());
        let resolution = manager.resolve("user", true).await.unwrap();

        assert_eq!(resolution, RunResolution::StartNew);
        assert_eq!(storage.run_id_lookups(), 0);
    }

    #[tokio::test]
    async fn test_continues_first_returned_run() {
        let storage = Arc::new(InMemoryAssistantStorage::default());
        storage.set_run_ids("user", vec!["run-b".to_string(), "run-a".to_string()]);

        let manager = SessionManager::new(storage);
        let resolution = manager.resolve("user", false).await.unwrap();

        assert_eq!(resolution, RunResolution::Continue("run-b".to_string()));
        assert_eq!(resolution.run_id(), Some("run-b"));
    }

    #[tokio::test]
    async fn test_no_prior_runs_starts_new() {
        let storage = Arc::new(InMemoryAssistantStorage::default());
        let manager = SessionManager::new(storage);

        assert_eq!(
            manager.resolve("someone", false).await.unwrap(),
            RunResolution::StartNew
        );
    }
}
