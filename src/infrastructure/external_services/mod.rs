pub mod chat_client;
pub mod document_extractors;
pub mod embeddings_client;
pub mod retry;
pub mod text_chunking;

pub use chat_client::OpenAiCompatibleChatModel;
pub use document_extractors::PdfUrlExtractor;
pub use embeddings_client::OpenAiEmbeddingProvider;
pub use text_chunking::RecursiveSplitter;
