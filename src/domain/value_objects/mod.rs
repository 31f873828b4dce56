pub mod content_hash;
pub mod document_metadata;

pub use content_hash::ContentHash;
pub use document_metadata::DocumentMetadata;
