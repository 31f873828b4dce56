use chrono::{DateTime, Utc};
use serde::Serialize;

/// Handle to a loaded retrieval index. Cheap to clone; the chunks themselves
/// live in the vector store under `collection`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeBase {
    collection: String,
    source_url: String,
    documents_loaded: usize,
    documents_skipped: usize,
    loaded_at: DateTime<Utc>,
}

impl KnowledgeBase {
    pub fn new(
        collection: String,
        source_url: String,
        documents_loaded: usize,
        documents_skipped: usize,
    ) -> Self {
        Self {
            collection,
            source_url,
            documents_loaded,
            documents_skipped,
            loaded_at: Utc::now(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn documents_loaded(&self) -> usize {
        self.documents_loaded
    }

    pub fn documents_skipped(&self) -> usize {
        self.documents_skipped
    }
}
