use futures::{StreamExt, TryStreamExt, stream};
use std::sync::Arc;
use url::Url;

use crate::application::ports::{
    DocumentExtractor, EmbeddingProvider, TextSplitter,
    document_extractor::{ExtractedContent, ExtractionOptions},
    embedding_provider::BatchEmbeddingRequest,
};
use crate::domain::entities::{ContentChunk, KnowledgeBase};
use crate::domain::repositories::VectorStore;

const EMBEDDING_BATCH_SIZE: usize = 10;
const EMBEDDING_CONCURRENCY: usize = 4;

#[derive(Debug)]
pub enum KnowledgeBaseError {
    InvalidUrl(String),
    ExtractionError(String),
    EmptyDocument(String),
    EmbeddingError(String),
    StoreError(String),
}

impl std::fmt::Display for KnowledgeBaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KnowledgeBaseError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            KnowledgeBaseError::ExtractionError(msg) => write!(f, "Extraction error: {}", msg),
            KnowledgeBaseError::EmptyDocument(url) => write!(
                f,
                "No text could be extracted from {}. It might be an image-based PDF that requires OCR.",
                url
            ),
            KnowledgeBaseError::EmbeddingError(msg) => write!(f, "Embedding error: {}", msg),
            KnowledgeBaseError::StoreError(msg) => write!(f, "Vector store error: {}", msg),
        }
    }
}

impl std::error::Error for KnowledgeBaseError {}

/// Builds a knowledge base from a PDF URL: download, extract, chunk, embed, store.
pub struct KnowledgeBaseService {
    document_extractor: Arc<dyn DocumentExtractor>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    text_splitter: Arc<dyn TextSplitter>,
    vector_store: Arc<dyn VectorStore>,
    collection: String,
    chunk_size: usize,
}

impl KnowledgeBaseService {
    pub fn new(
        document_extractor: Arc<dyn DocumentExtractor>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        text_splitter: Arc<dyn TextSplitter>,
        vector_store: Arc<dyn VectorStore>,
        collection: String,
        chunk_size: usize,
    ) -> Self {
        Self {
            document_extractor,
            embedding_provider,
            text_splitter,
            vector_store,
            collection,
            chunk_size,
        }
    }

    pub async fn load(&self, url: &str) -> Result<KnowledgeBase, KnowledgeBaseError> {
        let url = validate_url(url)?;

        tracing::info!("Loading knowledge base '{}' from {}", self.collection, url);

        let extracted = self
            .document_extractor
            .extract_from_url(url.as_str(), ExtractionOptions::default())
            .await
            .map_err(|e| KnowledgeBaseError::ExtractionError(e.to_string()))?;

        if extracted.is_blank() {
            return Err(KnowledgeBaseError::EmptyDocument(url.to_string()));
        }

        let mut chunks = self.create_chunks(&extracted, url.as_str());
        tracing::debug!(
            "Extracted {} pages into {} chunks",
            extracted.page_count(),
            chunks.len()
        );

        self.embed_chunks(&mut chunks).await?;

        let summary = self
            .vector_store
            .insert(&chunks)
            .await
            .map_err(|e| KnowledgeBaseError::StoreError(e.to_string()))?;

        tracing::info!(
            "Knowledge base '{}' loaded: {} documents inserted, {} already present",
            self.collection,
            summary.inserted,
            summary.skipped
        );

        Ok(KnowledgeBase::new(
            self.collection.clone(),
            url.to_string(),
            summary.inserted,
            summary.skipped,
        ))
    }

    fn create_chunks(&self, extracted: &ExtractedContent, source_url: &str) -> Vec<ContentChunk> {
        let mut chunks = Vec::new();

        for page in &extracted.pages {
            let pieces = self.text_splitter.split_text(&page.text, self.chunk_size);

            for (index, piece) in pieces.into_iter().enumerate() {
                if piece.trim().is_empty() {
                    continue;
                }

                let mut metadata = extracted.metadata.clone();
                metadata.set_page(page.page_number);
                metadata.set_chunk(index + 1, piece.len());
                metadata.set_source_url(source_url);

                chunks.push(ContentChunk::new(
                    self.collection.clone(),
                    extracted.name.clone(),
                    piece,
                    metadata,
                ));
            }
        }

        chunks
    }

    async fn embed_chunks(&self, chunks: &mut [ContentChunk]) -> Result<(), KnowledgeBaseError> {
        let batches: Vec<Vec<String>> = chunks
            .chunks(EMBEDDING_BATCH_SIZE)
            .map(|batch| batch.iter().map(|c| c.content().to_string()).collect())
            .collect();

        let provider = self.embedding_provider.clone();
        let responses: Vec<_> = stream::iter(batches)
            .map(|texts| {
                let provider = provider.clone();
                async move {
                    let expected = texts.len();
                    let response = provider
                        .generate_embeddings(BatchEmbeddingRequest { texts })
                        .await
                        .map_err(|e| KnowledgeBaseError::EmbeddingError(e.to_string()))?;

                    if response.embeddings.len() != expected {
                        return Err(KnowledgeBaseError::EmbeddingError(format!(
                            "expected {} embeddings, got {}",
                            expected,
                            response.embeddings.len()
                        )));
                    }

                    tracing::debug!(
                        "Embedded {} chunks with {} ({:?} tokens)",
                        expected,
                        response.model_name,
                        response.total_tokens
                    );
                    Ok::<_, KnowledgeBaseError>(response.embeddings)
                }
            })
            .buffered(EMBEDDING_CONCURRENCY)
            .try_collect()
            .await?;

        for (chunk, embedding) in chunks.iter_mut().zip(responses.into_iter().flatten()) {
            chunk.set_embedding(embedding);
        }

        Ok(())
    }
}

pub fn validate_url(raw: &str) -> Result<Url, KnowledgeBaseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(KnowledgeBaseError::InvalidUrl("URL cannot be empty".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| KnowledgeBaseError::InvalidUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(KnowledgeBaseError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            other
        ))),
    }
}
