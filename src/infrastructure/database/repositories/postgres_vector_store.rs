use async_trait::async_trait;
use diesel::prelude::*;
use pgvector::{Vector, VectorExpressionMethods};

use crate::domain::entities::ContentChunk;
use crate::domain::repositories::{
    VectorStore,
    vector_store::{InsertSummary, SimilaritySearchResult, VectorStoreError},
};
use crate::infrastructure::database::models::{DocumentModel, NewDocumentModel};
use crate::infrastructure::database::schema::knowledge_documents;
use crate::infrastructure::database::{DbConnection, DbPool, get_connection_from_pool};

// Keeps each INSERT well below the Postgres bind-parameter limit.
const INSERT_BATCH_SIZE: usize = 500;

pub struct PostgresVectorStore {
    pool: DbPool,
    dimensions: usize,
}

impl PostgresVectorStore {
    pub fn new(pool: DbPool, dimensions: usize) -> Self {
        Self { pool, dimensions }
    }

    fn validate(&self, chunk: &ContentChunk) -> Result<(), VectorStoreError> {
        let embedding = chunk.embedding().ok_or_else(|| {
            VectorStoreError::ValidationError(format!("Chunk {} has no embedding", chunk.id()))
        })?;

        let dimension = embedding.as_slice().len();
        if dimension != self.dimensions {
            return Err(VectorStoreError::VectorError(format!(
                "Chunk {} has dimension {}, expected {}",
                chunk.id(),
                dimension,
                self.dimensions
            )));
        }

        Ok(())
    }

    /// Runs `query` on a pooled connection off the async runtime.
    async fn with_connection<T, F>(&self, query: F) -> Result<T, VectorStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut DbConnection) -> QueryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = get_connection_from_pool(&pool)
                .map_err(|e| VectorStoreError::DatabaseError(e.to_string()))?;
            query(&mut conn).map_err(|e| VectorStoreError::DatabaseError(e.to_string()))
        })
        .await
        .map_err(|e| VectorStoreError::DatabaseError(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl VectorStore for PostgresVectorStore {
    async fn insert(&self, chunks: &[ContentChunk]) -> Result<InsertSummary, VectorStoreError> {
        for chunk in chunks {
            self.validate(chunk)?;
        }

        let new_documents: Vec<NewDocumentModel> =
            chunks.iter().map(NewDocumentModel::from).collect();

        let inserted = self
            .with_connection(move |conn| {
                let mut inserted = 0;
                for batch in new_documents.chunks(INSERT_BATCH_SIZE) {
                    inserted += diesel::insert_into(knowledge_documents::table)
                        .values(batch)
                        .on_conflict((
                            knowledge_documents::collection,
                            knowledge_documents::content_hash,
                        ))
                        .do_nothing()
                        .execute(conn)?;
                }
                Ok(inserted)
            })
            .await?;

        Ok(InsertSummary {
            inserted,
            skipped: chunks.len() - inserted,
        })
    }

    async fn search(
        &self,
        collection: &str,
        query_vector: &Vector,
        limit: i64,
    ) -> Result<Vec<SimilaritySearchResult>, VectorStoreError> {
        if query_vector.as_slice().len() != self.dimensions {
            return Err(VectorStoreError::VectorError(format!(
                "Query has dimension {}, expected {}",
                query_vector.as_slice().len(),
                self.dimensions
            )));
        }

        let collection = collection.to_string();
        let query = query_vector.clone();
        let models = self
            .with_connection(move |conn| {
                knowledge_documents::table
                    .filter(knowledge_documents::collection.eq(collection))
                    .filter(knowledge_documents::embedding.is_not_null())
                    .order(knowledge_documents::embedding.cosine_distance(query))
                    .limit(limit)
                    .select(DocumentModel::as_select())
                    .load::<DocumentModel>(conn)
            })
            .await?;

        let mut results = Vec::with_capacity(models.len());
        for model in models {
            let similarity_score = model
                .embedding
                .as_ref()
                .map(|stored| calculate_cosine_similarity(query_vector, stored))
                .unwrap_or(0.0);

            let chunk = ContentChunk::try_from(model).map_err(VectorStoreError::ValidationError)?;
            results.push(SimilaritySearchResult {
                chunk,
                similarity_score,
            });
        }

        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<i64, VectorStoreError> {
        let collection = collection.to_string();

        self.with_connection(move |conn| {
            knowledge_documents::table
                .filter(knowledge_documents::collection.eq(collection))
                .count()
                .get_result(conn)
        })
        .await
    }
}

// Postgres orders by distance; the score handed back is the matching similarity.
pub fn calculate_cosine_similarity(a: &Vector, b: &Vector) -> f32 {
    let a_slice = a.as_slice();
    let b_slice = b.as_slice();

    if a_slice.len() != b_slice.len() {
        return 0.0;
    }

    let dot_product: f32 = a_slice.iter().zip(b_slice.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a_slice.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b_slice.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
