use std::sync::Arc;

use crate::application::ports::embedding_provider::{EmbeddingProvider, EmbeddingRequest};
use crate::domain::repositories::{VectorStore, vector_store::SimilaritySearchResult};

#[derive(Debug)]
pub enum SearchServiceError {
    ValidationError(String),
    EmbeddingError(String),
    RepositoryError(String),
}

impl std::fmt::Display for SearchServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            SearchServiceError::EmbeddingError(msg) => write!(f, "Embedding error: {}", msg),
            SearchServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for SearchServiceError {}

pub struct SearchService {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl SearchService {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            embedding_provider,
            vector_store,
        }
    }

    /// Returns the `limit` chunks of `collection` closest to `query`, best match first.
    pub async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: i64,
    ) -> Result<Vec<SimilaritySearchResult>, SearchServiceError> {
        if query.trim().is_empty() {
            return Err(SearchServiceError::ValidationError(
                "Query cannot be empty".to_string(),
            ));
        }

        if !(1..=100).contains(&limit) {
            return Err(SearchServiceError::ValidationError(
                "Limit must be between 1 and 100".to_string(),
            ));
        }

        let embedding_response = self
            .embedding_provider
            .generate_embedding(EmbeddingRequest {
                text: query.to_string(),
            })
            .await
            .map_err(|e| SearchServiceError::EmbeddingError(e.to_string()))?;

        let results = self
            .vector_store
            .search(collection, &embedding_response.embedding, limit)
            .await
            .map_err(|e| SearchServiceError::RepositoryError(e.to_string()))?;

        tracing::debug!(
            "Search in '{}' for {:?} returned {} results (query embedded with {}, {:?} tokens)",
            collection,
            query,
            results.len(),
            embedding_response.model_name,
            embedding_response.token_count
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ContentChunk;
    use crate::domain::value_objects::DocumentMetadata;
    use crate::test_support::{FakeEmbeddingProvider, InMemoryVectorStore};

    async fn seeded_store(provider: &FakeEmbeddingProvider) -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::default());
        let mut chunks = Vec::new();
        for (collection, text) in [
            ("recipes", "green curry paste"),
            ("recipes", "mango sticky rice"),
            ("other", "green curry paste"),
        ] {
            let mut chunk = ContentChunk::new(
                collection.to_string(),
                "doc".to_string(),
                text.to_string(),
                DocumentMetadata::new(),
            );
            chunk.set_embedding(provider.embed_text(text));
            chunks.push(chunk);
        }
        store.insert(&chunks).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_search_ranks_exact_match_first() {
        let provider = FakeEmbeddingProvider::new(64);
        let store = seeded_store(&provider).await;
        let service = SearchService::new(Arc::new(provider), store);

        let results = service
            .search("recipes", "mango sticky rice", 5)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content(), "mango sticky rice");
        assert!(results.iter().all(|r| r.chunk.collection() == "recipes"));
        assert!(results[0].similarity_score >= results[1].similarity_score);
    }

    #[tokio::test]
    async fn test_search_validates_input() {
        let provider = FakeEmbeddingProvider::new(64);
        let store = seeded_store(&provider).await;
        let service = SearchService::new(Arc::new(provider), store);

        assert!(matches!(
            service.search("recipes", "  ", 5).await,
            Err(SearchServiceError::ValidationError(_))
        ));
        assert!(matches!(
            service.search("recipes", "curry", 0).await,
            Err(SearchServiceError::ValidationError(_))
        ));
    }
}
