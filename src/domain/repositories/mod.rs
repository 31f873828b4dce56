pub mod assistant_storage;
pub mod vector_store;

pub use assistant_storage::AssistantStorage;
pub use vector_store::VectorStore;
