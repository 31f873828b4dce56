pub mod assistant;
pub mod knowledge_base_service;
pub mod search_service;
pub mod session_manager;

pub use assistant::{Assistant, AssistantDeps, AssistantSettings};
pub use knowledge_base_service::KnowledgeBaseService;
pub use search_service::SearchService;
pub use session_manager::{RunResolution, SessionManager};
