pub mod assistant_run;
pub mod chat_turn;
pub mod content_chunk;
pub mod knowledge_base;

pub use assistant_run::AssistantRun;
pub use chat_turn::ChatTurn;
pub use content_chunk::ContentChunk;
pub use knowledge_base::KnowledgeBase;
