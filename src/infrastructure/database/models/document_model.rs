use chrono::{DateTime, Utc};
use diesel::prelude::*;
use pgvector::Vector;
use uuid::Uuid;

use crate::domain::entities::ContentChunk;
use crate::domain::value_objects::{ContentHash, DocumentMetadata};
use crate::infrastructure::database::schema::knowledge_documents;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = knowledge_documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentModel {
    pub id: Uuid,
    pub collection: String,
    pub name: String,
    pub meta_data: serde_json::Value,
    pub content: String,
    pub content_hash: String,
    pub embedding: Option<Vector>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = knowledge_documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentModel {
    pub id: Uuid,
    pub collection: String,
    pub name: String,
    pub meta_data: serde_json::Value,
    pub content: String,
    pub content_hash: String,
    pub embedding: Option<Vector>,
    pub created_at: DateTime<Utc>,
}

impl From<&ContentChunk> for NewDocumentModel {
    fn from(chunk: &ContentChunk) -> Self {
        Self {
            id: chunk.id(),
            collection: chunk.collection().to_string(),
            name: chunk.name().to_string(),
            meta_data: chunk.meta_data().to_json(),
            content: chunk.content().to_string(),
            content_hash: chunk.content_hash().to_string(),
            embedding: chunk.embedding().cloned(),
            created_at: chunk.created_at(),
        }
    }
}

impl TryFrom<DocumentModel> for ContentChunk {
    type Error = String;

    fn try_from(model: DocumentModel) -> Result<Self, Self::Error> {
        let content_hash = ContentHash::new(model.content_hash)?;

        Ok(ContentChunk::from_stored(
            model.id,
            model.collection,
            model.name,
            DocumentMetadata::from_json(model.meta_data),
            model.content,
            content_hash,
            model.embedding,
            model.created_at,
        ))
    }
}
