use chrono::{DateTime, Utc};
use pgvector::Vector;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{ContentHash, DocumentMetadata};

/// One embedded passage of a source document, stored in a vector-store collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentChunk {
    id: Uuid,
    collection: String,
    name: String,
    meta_data: DocumentMetadata,
    content: String,
    content_hash: ContentHash,
    embedding: Option<Vector>,
    created_at: DateTime<Utc>,
}

impl ContentChunk {
    pub fn new(
        collection: String,
        name: String,
        content: String,
        meta_data: DocumentMetadata,
    ) -> Self {
        let content_hash = ContentHash::of_content(&content);
        Self {
            id: Uuid::new_v4(),
            collection,
            name,
            meta_data,
            content,
            content_hash,
            embedding: None,
            created_at: Utc::now(),
        }
    }

    pub fn from_stored(
        id: Uuid,
        collection: String,
        name: String,
        meta_data: DocumentMetadata,
        content: String,
        content_hash: ContentHash,
        embedding: Option<Vector>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            collection,
            name,
            meta_data,
            content,
            content_hash,
            embedding,
            created_at,
        }
    }

    // Getters
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta_data(&self) -> &DocumentMetadata {
        &self.meta_data
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    pub fn embedding(&self) -> Option<&Vector> {
        self.embedding.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_embedding(&mut self, embedding: Vector) {
        self.embedding = Some(embedding);
    }

    pub fn is_embedded(&self) -> bool {
        self.embedding.is_some()
    }
}
