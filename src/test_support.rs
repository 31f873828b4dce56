//! In-memory stand-ins for the port traits, shared by unit tests.

use async_trait::async_trait;
use pgvector::Vector;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::chat_model::{
    ChatCompletion, ChatModel, ChatModelError, ChatRequest,
};
use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentExtractor, ExtractedContent, ExtractedPage,
    ExtractionOptions,
};
use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingProvider, EmbeddingProviderError,
    EmbeddingRequest, EmbeddingResponse,
};
use crate::domain::entities::{AssistantRun, ContentChunk};
use crate::domain::repositories::assistant_storage::AssistantStorageError;
use crate::domain::repositories::vector_store::{
    InsertSummary, SimilaritySearchResult, VectorStoreError,
};
use crate::domain::repositories::{AssistantStorage, VectorStore};
use crate::domain::value_objects::DocumentMetadata;
use crate::infrastructure::database::repositories::postgres_vector_store::calculate_cosine_similarity;

pub struct FakeDocumentExtractor {
    pages: Vec<String>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl FakeDocumentExtractor {
    pub fn with_pages(pages: &[&str]) -> Self {
        Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            pages: Vec::new(),
            failure: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn extract_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentExtractor for FakeDocumentExtractor {
    async fn extract_from_url(
        &self,
        url: &str,
        _options: ExtractionOptions,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(DocumentExtractionError::DownloadFailed(message.clone()));
        }

        let mut metadata = DocumentMetadata::new();
        metadata.set_source_url(url);

        Ok(ExtractedContent {
            name: "fake".to_string(),
            pages: self
                .pages
                .iter()
                .enumerate()
                .map(|(i, text)| ExtractedPage {
                    page_number: i as u32 + 1,
                    text: text.clone(),
                })
                .collect(),
            metadata,
        })
    }
}

/// Bag-of-words embeddings: each lowercase word is hashed (FNV-1a) into one
/// of `dimensions` buckets. Identical texts always embed identically.
pub struct FakeEmbeddingProvider {
    dimensions: usize,
}

impl FakeEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    pub fn embed_text(&self, text: &str) -> Vector {
        let mut values = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
            for byte in word.to_lowercase().bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
            }
            values[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        Vector::from(values)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbeddingProvider {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError> {
        Ok(EmbeddingResponse {
            embedding: self.embed_text(&request.text),
            model_name: "fake".to_string(),
            token_count: None,
        })
    }

    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        Ok(BatchEmbeddingResponse {
            embeddings: request.texts.iter().map(|t| self.embed_text(t)).collect(),
            model_name: "fake".to_string(),
            total_tokens: None,
        })
    }

    fn model_name(&self) -> &str {
        "fake"
    }

    fn embedding_dimension(&self) -> usize {
        self.dimensions
    }
}

#[derive(Default)]
pub struct InMemoryVectorStore {
    chunks: Mutex<Vec<ContentChunk>>,
}

impl InMemoryVectorStore {
    pub fn chunks(&self) -> Vec<ContentChunk> {
        self.chunks.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn insert(&self, chunks: &[ContentChunk]) -> Result<InsertSummary, VectorStoreError> {
        let mut stored = self.chunks.lock().unwrap();
        let mut seen: HashSet<(String, String)> = stored
            .iter()
            .map(|c| (c.collection().to_string(), c.content_hash().as_str().to_string()))
            .collect();

        let mut summary = InsertSummary::default();
        for chunk in chunks {
            let key = (
                chunk.collection().to_string(),
                chunk.content_hash().as_str().to_string(),
            );
            if seen.insert(key) {
                stored.push(chunk.clone());
                summary.inserted += 1;
            } else {
                summary.skipped += 1;
            }
        }
        Ok(summary)
    }

    async fn search(
        &self,
        collection: &str,
        query: &Vector,
        limit: i64,
    ) -> Result<Vec<SimilaritySearchResult>, VectorStoreError> {
        let stored = self.chunks.lock().unwrap();
        let mut results: Vec<SimilaritySearchResult> = stored
            .iter()
            .filter(|c| c.collection() == collection)
            .filter_map(|c| {
                c.embedding().map(|embedding| SimilaritySearchResult {
                    chunk: c.clone(),
                    similarity_score: calculate_cosine_similarity(embedding, query),
                })
            })
            .collect();

        results.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        results.truncate(limit.max(0) as usize);
        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<i64, VectorStoreError> {
        let stored = self.chunks.lock().unwrap();
        Ok(stored.iter().filter(|c| c.collection() == collection).count() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryAssistantStorage {
    runs: Mutex<Vec<AssistantRun>>,
    run_id_overrides: Mutex<HashMap<String, Vec<String>>>,
    upsert_failure: Mutex<Option<String>>,
    lookups: AtomicUsize,
}

impl InMemoryAssistantStorage {
    /// Makes `get_all_run_ids(user_id)` return exactly `run_ids`.
    pub fn set_run_ids(&self, user_id: &str, run_ids: Vec<String>) {
        self.run_id_overrides
            .lock()
            .unwrap()
            .insert(user_id.to_string(), run_ids);
    }

    /// Makes every later `upsert` fail with `message`.
    pub fn fail_upserts(&self, message: &str) {
        *self.upsert_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn run_id_lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssistantStorage for InMemoryAssistantStorage {
    async fn get_all_run_ids(&self, user_id: &str) -> Result<Vec<String>, AssistantStorageError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if let Some(run_ids) = self.run_id_overrides.lock().unwrap().get(user_id) {
            return Ok(run_ids.clone());
        }

        let mut runs: Vec<AssistantRun> = self
            .runs
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id() == user_id)
            .cloned()
            .collect();
        runs.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.run_id().cmp(a.run_id()))
        });
        Ok(runs.iter().map(|r| r.run_id().to_string()).collect())
    }

    async fn read(&self, run_id: &str) -> Result<Option<AssistantRun>, AssistantStorageError> {
        Ok(self
            .runs
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.run_id() == run_id)
            .cloned())
    }

    async fn upsert(&self, run: &AssistantRun) -> Result<(), AssistantStorageError> {
        if let Some(message) = self.upsert_failure.lock().unwrap().clone() {
            return Err(AssistantStorageError::DatabaseError(message));
        }

        let mut runs = self.runs.lock().unwrap();
        match runs.iter_mut().find(|r| r.run_id() == run.run_id()) {
            Some(existing) => *existing = run.clone(),
            None => runs.push(run.clone()),
        }
        Ok(())
    }

    async fn delete(&self, run_id: &str) -> Result<bool, AssistantStorageError> {
        let mut runs = self.runs.lock().unwrap();
        let before = runs.len();
        runs.retain(|r| r.run_id() != run_id);
        Ok(runs.len() != before)
    }
}

/// Replays canned completions in order and records every request.
pub struct ScriptedChatModel {
    script: Mutex<Vec<Result<ChatCompletion, ChatModelError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChatModel {
    pub fn new(mut script: Vec<Result<ChatCompletion, ChatModelError>>) -> Self {
        script.reverse();
        Self {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, ChatModelError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(ChatModelError::ApiError("script exhausted".to_string())))
    }

    fn model_info(&self) -> (String, String) {
        ("scripted".to_string(), "scripted".to_string())
    }
}
