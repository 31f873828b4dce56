use async_trait::async_trait;
use diesel::prelude::*;

use crate::domain::entities::AssistantRun;
use crate::domain::repositories::{AssistantStorage, assistant_storage::AssistantStorageError};
use crate::infrastructure::config::ASSISTANT_TABLE;
use crate::infrastructure::database::models::{AssistantRunModel, NewAssistantRunModel};
use crate::infrastructure::database::schema::pdf_assistant;
use crate::infrastructure::database::{DbConnection, DbPool, get_connection_from_pool};

pub struct PostgresAssistantStorage {
    pool: DbPool,
}

impl PostgresAssistantStorage {
    pub fn new(pool: DbPool) -> Self {
        tracing::debug!("Assistant runs stored in table '{}'", ASSISTANT_TABLE);
        Self { pool }
    }

    /// Runs `query` on a pooled connection off the async runtime.
    async fn with_connection<T, F>(&self, query: F) -> Result<T, AssistantStorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut DbConnection) -> QueryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = get_connection_from_pool(&pool)
                .map_err(|e| AssistantStorageError::DatabaseError(e.to_string()))?;
            query(&mut conn).map_err(|e| AssistantStorageError::DatabaseError(e.to_string()))
        })
        .await
        .map_err(|e| AssistantStorageError::DatabaseError(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl AssistantStorage for PostgresAssistantStorage {
    async fn get_all_run_ids(&self, user: &str) -> Result<Vec<String>, AssistantStorageError> {
        let user = user.to_string();

        self.with_connection(move |conn| {
            pdf_assistant::table
                .filter(pdf_assistant::user_id.eq(user))
                .order((pdf_assistant::created_at.desc(), pdf_assistant::run_id.desc()))
                .select(pdf_assistant::run_id)
                .load::<String>(conn)
        })
        .await
    }

    async fn read(&self, id: &str) -> Result<Option<AssistantRun>, AssistantStorageError> {
        let id = id.to_string();

        let model = self
            .with_connection(move |conn| {
                pdf_assistant::table
                    .find(id)
                    .select(AssistantRunModel::as_select())
                    .first::<AssistantRunModel>(conn)
                    .optional()
            })
            .await?;

        Ok(model.map(AssistantRun::from))
    }

    async fn upsert(&self, run: &AssistantRun) -> Result<(), AssistantStorageError> {
        let model = NewAssistantRunModel::from(run);

        self.with_connection(move |conn| {
            diesel::insert_into(pdf_assistant::table)
                .values(&model)
                .on_conflict(pdf_assistant::run_id)
                .do_update()
                .set((
                    pdf_assistant::llm.eq(&model.llm),
                    pdf_assistant::memory.eq(&model.memory),
                    pdf_assistant::run_data.eq(&model.run_data),
                    pdf_assistant::updated_at.eq(model.updated_at),
                ))
                .execute(conn)
        })
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, AssistantStorageError> {
        let id = id.to_string();

        let deleted_count = self
            .with_connection(move |conn| diesel::delete(pdf_assistant::table.find(id)).execute(conn))
            .await?;

        Ok(deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::r2d2::{ConnectionManager, Pool};
    use std::time::{Duration, Instant};

    fn unreachable_pool(timeout: Duration) -> DbPool {
        let manager = ConnectionManager::<PgConnection>::new("postgres://nobody@127.0.0.1:1/none");
        Pool::builder()
            .connection_timeout(timeout)
            .build_unchecked(manager)
    }

    #[tokio::test]
    async fn test_unreachable_database_is_reported() {
        let storage = PostgresAssistantStorage::new(unreachable_pool(Duration::from_millis(200)));

        let result = storage.get_all_run_ids("user").await;

        assert!(matches!(result, Err(AssistantStorageError::DatabaseError(_))));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_waiting_for_a_connection_does_not_block_the_runtime() {
        let storage = PostgresAssistantStorage::new(unreachable_pool(Duration::from_millis(500)));

        let ticker = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Instant::now()
        };
        let (result, ticked_at) = tokio::join!(storage.read("run-1"), ticker);

        assert!(result.is_err());
        assert!(Instant::now().duration_since(ticked_at) >= Duration::from_millis(200));
    }
}
