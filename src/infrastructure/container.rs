use std::sync::Arc;

use crate::{
    application::{
        ports::{ChatModel, DocumentExtractor, EmbeddingProvider, TextSplitter},
        services::{
            AssistantDeps, AssistantSettings, KnowledgeBaseService, SearchService, SessionManager,
        },
        use_cases::{DeleteRunUseCase, GetRunHistoryUseCase, ListUserRunsUseCase},
    },
    domain::repositories::{AssistantStorage, VectorStore},
    infrastructure::{
        config::AppConfig,
        database::{
            create_connection_pool, get_database_connection,
            repositories::{PostgresAssistantStorage, PostgresVectorStore},
            run_migrations,
        },
        external_services::{
            OpenAiCompatibleChatModel, OpenAiEmbeddingProvider, PdfUrlExtractor, RecursiveSplitter,
        },
    },
    presentation::{
        http::handlers::{PageHandler, RunHandler},
        ui::{SessionStore, UiController},
    },
};

pub struct AppContainer {
    pub vector_store: Arc<dyn VectorStore>,
    pub collection: String,

    // HTTP Handlers
    pub page_handler: Arc<PageHandler>,
    pub run_handler: Arc<RunHandler>,
}

impl AppContainer {
    pub async fn new(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        // Create database connection pool
        let db_pool = create_connection_pool(&config.database_url)?;
        let mut conn = get_database_connection(&config.database_url)
            .map_err(|e| format!("Failed to create database connection: {}", e))?;
        run_migrations(&mut conn).map_err(|e| format!("Failed to run database migrations: {}", e))?;

        // Create stores
        let vector_store: Arc<dyn VectorStore> = Arc::new(PostgresVectorStore::new(
            db_pool.clone(),
            config.embedder.dimensions,
        ));
        let assistant_storage: Arc<dyn AssistantStorage> =
            Arc::new(PostgresAssistantStorage::new(db_pool));

        // Create external services
        if config.embedder.api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; embedding requests will be rejected");
        }
        if config.chat.api_key.is_none() {
            tracing::warn!(
                "No API key set for chat provider '{}'; chat requests will be rejected",
                config.chat.provider.name()
            );
        }

        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(
            OpenAiEmbeddingProvider::new(config.embedder.clone())
                .map_err(|e| format!("Failed to create embedding client: {}", e))?,
        );
        tracing::info!(
            "Embedding with {} ({} dimensions)",
            embedding_provider.model_name(),
            embedding_provider.embedding_dimension()
        );
        let chat_model: Arc<dyn ChatModel> = Arc::new(
            OpenAiCompatibleChatModel::new(config.chat.clone())
                .map_err(|e| format!("Failed to create chat client: {}", e))?,
        );
        let document_extractor: Arc<dyn DocumentExtractor> = Arc::new(
            PdfUrlExtractor::new(config.http_timeout_secs)
                .map_err(|e| format!("Failed to create document extractor: {}", e))?,
        );
        let text_splitter: Arc<dyn TextSplitter> = Arc::new(RecursiveSplitter::default());

        // Create application services
        let knowledge_base_service = Arc::new(KnowledgeBaseService::new(
            document_extractor,
            embedding_provider.clone(),
            text_splitter,
            vector_store.clone(),
            config.collection.clone(),
            config.chunk_size,
        ));
        let search_service = Arc::new(SearchService::new(embedding_provider, vector_store.clone()));
        let session_manager = Arc::new(SessionManager::new(assistant_storage.clone()));

        // Create use cases
        let list_user_runs_use_case = Arc::new(ListUserRunsUseCase::new(session_manager));
        let get_run_history_use_case =
            Arc::new(GetRunHistoryUseCase::new(assistant_storage.clone()));
        let delete_run_use_case = Arc::new(DeleteRunUseCase::new(assistant_storage.clone()));

        // Create UI controller
        let assistant_deps = AssistantDeps {
            chat_model,
            search_service,
            settings: AssistantSettings::default(),
        };
        let ui_controller = Arc::new(UiController::new(
            knowledge_base_service,
            assistant_storage,
            assistant_deps,
        ));
        let sessions = Arc::new(SessionStore::new());

        // Create handlers
        let page_handler = Arc::new(PageHandler::new(ui_controller, sessions));
        let run_handler = Arc::new(RunHandler::new(
            list_user_runs_use_case,
            get_run_history_use_case,
            delete_run_use_case,
        ));

        tracing::info!(
            "Container ready: chat {} ({}), collection '{}'",
            config.chat.provider.name(),
            config.chat.model,
            config.collection
        );

        Ok(Self {
            vector_store,
            collection: config.collection.clone(),
            page_handler,
            run_handler,
        })
    }
}
