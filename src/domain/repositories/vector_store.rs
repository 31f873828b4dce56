use async_trait::async_trait;
use pgvector::Vector;

use crate::domain::entities::ContentChunk;

#[derive(Debug)]
pub enum VectorStoreError {
    DatabaseError(String),
    ValidationError(String),
    VectorError(String),
}

impl std::fmt::Display for VectorStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorStoreError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            VectorStoreError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            VectorStoreError::VectorError(msg) => write!(f, "Vector error: {}", msg),
        }
    }
}

impl std::error::Error for VectorStoreError {}

#[derive(Debug, Clone)]
pub struct SimilaritySearchResult {
    pub chunk: ContentChunk,
    pub similarity_score: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    pub skipped: usize,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts embedded chunks, skipping any whose content hash already exists
    /// in the chunk's collection.
    async fn insert(&self, chunks: &[ContentChunk]) -> Result<InsertSummary, VectorStoreError>;
    async fn search(
        &self,
        collection: &str,
        query_vector: &Vector,
        limit: i64,
    ) -> Result<Vec<SimilaritySearchResult>, VectorStoreError>;
    async fn count(&self, collection: &str) -> Result<i64, VectorStoreError>;
}
