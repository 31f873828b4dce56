pub mod postgres_assistant_storage;
pub mod postgres_vector_store;

pub use postgres_assistant_storage::PostgresAssistantStorage;
pub use postgres_vector_store::PostgresVectorStore;
