use std::sync::Arc;

use super::session_state::UiSessionState;
use super::view::{
    Notice, PageView, QUESTION_HEADING, RESPONSE_HEADING, ResponseView, render_history,
};
use crate::application::services::{
    Assistant, AssistantDeps, KnowledgeBaseService, RunResolution, SessionManager,
};
use crate::domain::repositories::AssistantStorage;

pub const LOADING_KNOWLEDGE_BASE: &str = "Loading knowledge base...";
pub const KNOWLEDGE_BASE_LOADED: &str = "Knowledge base loaded successfully!";
pub const MISSING_PDF_URL: &str = "Please enter a valid PDF URL to initialize the knowledge base.";
pub const PROCESSING: &str = "Processing...";
pub const CHAT_FALLBACK: &str = "The assistant encountered an error while processing your query.";

/// The inputs a user can set on the page.
#[derive(Debug, Clone)]
pub struct PageInput {
    pub pdf_url: Option<String>,
    pub user_id: String,
    pub new_session: bool,
    pub question: Option<String>,
}

impl Default for PageInput {
    fn default() -> Self {
        Self {
            pdf_url: None,
            user_id: "user".to_string(),
            new_session: false,
            question: None,
        }
    }
}

/// Runs one render pass of the assistant page against a UI session's state.
pub struct UiController {
    knowledge_base_service: Arc<KnowledgeBaseService>,
    storage: Arc<dyn AssistantStorage>,
    assistant_deps: AssistantDeps,
}

impl UiController {
    pub fn new(
        knowledge_base_service: Arc<KnowledgeBaseService>,
        storage: Arc<dyn AssistantStorage>,
        assistant_deps: AssistantDeps,
    ) -> Self {
        Self {
            knowledge_base_service,
            storage,
            assistant_deps,
        }
    }

    pub async fn render(&self, input: &PageInput, state: &mut UiSessionState) -> PageView {
        let mut page = PageView::default();

        let pdf_url = non_blank(input.pdf_url.as_deref());
        if state.knowledge_base.is_none() {
            if let Some(url) = pdf_url {
                page.spinners.push(LOADING_KNOWLEDGE_BASE.to_string());
                match self.knowledge_base_service.load(url).await {
                    Ok(knowledge_base) => {
                        tracing::info!(
                            "Knowledge base for {} ready ({} new, {} already stored)",
                            knowledge_base.source_url(),
                            knowledge_base.documents_loaded(),
                            knowledge_base.documents_skipped()
                        );
                        state.knowledge_base = Some(Arc::new(knowledge_base));
                        state.storage = Some(self.storage.clone());
                        page.push_notice(Notice::Success(KNOWLEDGE_BASE_LOADED.to_string()));
                    }
                    Err(e) => {
                        tracing::error!("Failed to load knowledge base from {}: {}", url, e);
                        page.push_notice(Notice::Error(format!(
                            "Failed to load knowledge base: {}",
                            e
                        )));
                        return page;
                    }
                }
            }
        }

        let (Some(knowledge_base), Some(storage)) =
            (state.knowledge_base.clone(), state.storage.clone())
        else {
            page.push_notice(Notice::Warning(MISSING_PDF_URL.to_string()));
            return page;
        };

        let session_manager = SessionManager::new(storage.clone());
        let resolution = match session_manager
            .resolve(&input.user_id, input.new_session)
            .await
        {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::error!("Failed to look up runs for {}: {}", input.user_id, e);
                page.push_notice(Notice::Error(format!("Error: {}", e)));
                return page;
            }
        };

        let mut assistant = match Assistant::start(
            resolution.run_id().map(str::to_string),
            &input.user_id,
            knowledge_base,
            storage,
            self.assistant_deps.clone(),
        )
        .await
        {
            Ok(assistant) => assistant,
            Err(e) => {
                tracing::error!("Failed to start assistant: {}", e);
                page.push_notice(Notice::Error(format!("Error: {}", e)));
                return page;
            }
        };

        let run_id = assistant.run_id().to_string();
        page.sidebar.lines.push(match resolution {
            RunResolution::StartNew => format!("Started new session: {}", run_id),
            RunResolution::Continue(_) => format!("Continuing session: {}", run_id),
        });
        page.run_id = Some(run_id);

        page.question_heading = Some(QUESTION_HEADING.to_string());
        if let Some(question) = non_blank(input.question.as_deref()) {
            page.spinners.push(PROCESSING.to_string());
            let text = match assistant.chat(question).await {
                Ok(answer) => answer,
                Err(e) => {
                    tracing::error!("Chat failed for run {}: {}", assistant.run_id(), e);
                    page.push_notice(Notice::Error(format!("Error: {}", e)));
                    CHAT_FALLBACK.to_string()
                }
            };
            page.response = Some(ResponseView {
                heading: RESPONSE_HEADING.to_string(),
                text,
            });
        }

        if assistant.reads_chat_history() {
            page.sidebar.chat_history = render_history(&assistant.get_chat_history());
        }

        page
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::application::ports::ChatModel;
    use crate::application::ports::chat_model::{ChatCompletion, ChatModelError};
    use crate::application::services::{AssistantSettings, SearchService};
    use crate::domain::entities::{AssistantRun, ChatTurn};
    use crate::infrastructure::external_services::RecursiveSplitter;
    use crate::test_support::{
        FakeDocumentExtractor, FakeEmbeddingProvider, InMemoryAssistantStorage,
        InMemoryVectorStore, ScriptedChatModel,
    };

    struct Harness {
        controller: UiController,
        extractor: Arc<FakeDocumentExtractor>,
        storage: Arc<InMemoryAssistantStorage>,
    }

    fn harness_with(extractor: FakeDocumentExtractor, chat_model: Arc<dyn ChatModel>) -> Harness {
        let extractor = Arc::new(extractor);
        let embedding_provider = Arc::new(FakeEmbeddingProvider::new(16));
        let vector_store = Arc::new(InMemoryVectorStore::default());
        let storage = Arc::new(InMemoryAssistantStorage::default());

        let knowledge_base_service = Arc::new(KnowledgeBaseService::new(
            extractor.clone(),
            embedding_provider.clone(),
            Arc::new(RecursiveSplitter::default()),
            vector_store.clone(),
            "recipes".to_string(),
            200,
        ));
        let search_service = Arc::new(SearchService::new(embedding_provider, vector_store));

        let controller = UiController::new(
            knowledge_base_service,
            storage.clone(),
            AssistantDeps {
                chat_model,
                search_service,
                settings: AssistantSettings::default(),
            },
        );

        Harness {
            controller,
            extractor,
            storage,
        }
    }

    fn harness(chat_model: ScriptedChatModel) -> Harness {
        harness_with(
            FakeDocumentExtractor::with_pages(&["Green curry needs green chilies and coconut milk"]),
            Arc::new(chat_model),
        )
    }

    fn input(pdf_url: Option<&str>, question: Option<&str>, new_session: bool) -> PageInput {
        PageInput {
            pdf_url: pdf_url.map(str::to_string),
            user_id: "user".to_string(),
            new_session,
            question: question.map(str::to_string),
        }
    }

    const URL: &str = "https://example.com/ThaiRecipes.pdf";

    #[tokio::test]
    async fn test_missing_url_only_warns() {
        let h = harness(ScriptedChatModel::new(vec![]));
        let mut state = UiSessionState::default();

        let page = h
            .controller
            .render(&input(None, Some("hello?"), false), &mut state)
            .await;

        assert_eq!(page.title, "PDF Assistant");
        assert_eq!(page.sidebar.title, "Session Settings");
        assert_eq!(
            page.notices,
            vec![Notice::Warning(MISSING_PDF_URL.to_string())]
        );
        assert!(page.run_id.is_none());
        assert!(page.response.is_none());
        assert_eq!(h.extractor.extract_calls(), 0);
        assert!(!state.is_ready());
    }

    #[tokio::test]
    async fn test_knowledge_base_is_built_once_per_session() {
        let h = harness(ScriptedChatModel::new(vec![]));
        let mut state = UiSessionState::default();

        let first = h
            .controller
            .render(&input(Some(URL), None, false), &mut state)
            .await;
        assert!(first.has_notice(KNOWLEDGE_BASE_LOADED));
        assert_eq!(first.spinners, vec![LOADING_KNOWLEDGE_BASE.to_string()]);
        assert!(state.is_ready());

        let second = h
            .controller
            .render(&input(Some(URL), None, false), &mut state)
            .await;
        assert!(!second.has_notice(KNOWLEDGE_BASE_LOADED));
        assert!(second.spinners.is_empty());
        assert_eq!(h.extractor.extract_calls(), 1);

        // Cleared URL keeps using the cached knowledge base.
        let third = h
            .controller
            .render(&input(None, None, false), &mut state)
            .await;
        assert!(third.run_id.is_some());
        assert_eq!(h.extractor.extract_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_reported_and_not_cached() {
        let h = harness_with(
            FakeDocumentExtractor::failing("HTTP 404 Not Found"),
            Arc::new(ScriptedChatModel::new(vec![])),
        );
        let mut state = UiSessionState::default();

        let page = h
            .controller
            .render(&input(Some(URL), Some("anything"), false), &mut state)
            .await;

        assert_eq!(page.notices.len(), 1);
        match &page.notices[0] {
            Notice::Error(text) => {
                assert!(text.starts_with("Failed to load knowledge base: "));
                assert!(text.contains("HTTP 404 Not Found"));
            }
            other => panic!("unexpected notice: {:?}", other),
        }
        assert!(page.run_id.is_none());
        assert!(state.knowledge_base.is_none());
        assert!(state.storage.is_none());
    }

    #[tokio::test]
    async fn test_new_session_always_mints_a_run() {
        let h = harness(ScriptedChatModel::new(vec![]));
        let mut state = UiSessionState::default();
        h.storage
            .upsert(&AssistantRun::new("user".to_string()))
            .await
            .unwrap();

        let first = h
            .controller
            .render(&input(Some(URL), None, true), &mut state)
            .await;
        let second = h
            .controller
            .render(&input(Some(URL), None, true), &mut state)
            .await;

        let first_id = first.run_id.unwrap();
        let second_id = second.run_id.unwrap();
        assert_ne!(first_id, second_id);
        assert_eq!(
            first.sidebar.lines,
            vec![format!("Started new session: {}", first_id)]
        );
        assert_eq!(h.storage.run_id_lookups(), 0);
    }

    #[tokio::test]
    async fn test_continues_first_returned_run() {
        let h = harness(ScriptedChatModel::new(vec![]));
        let mut state = UiSessionState::default();
        h.storage.set_run_ids(
            "user",
            vec!["run-newest".to_string(), "run-older".to_string()],
        );

        let page = h
            .controller
            .render(&input(Some(URL), None, false), &mut state)
            .await;

        assert_eq!(page.run_id.as_deref(), Some("run-newest"));
        assert_eq!(
            page.sidebar.lines,
            vec!["Continuing session: run-newest".to_string()]
        );
    }

    #[tokio::test]
    async fn test_chat_answer_and_history() {
        let h = harness(ScriptedChatModel::new(vec![Ok(ChatCompletion::Message(
            "Green chilies and coconut milk.".to_string(),
        ))]));
        let mut state = UiSessionState::default();

        let page = h
            .controller
            .render(
                &input(Some(URL), Some("What is in green curry?"), false),
                &mut state,
            )
            .await;

        assert_eq!(
            page.response,
            Some(ResponseView {
                heading: "Response".to_string(),
                text: "Green chilies and coconut milk.".to_string(),
            })
        );
        assert_eq!(
            page.sidebar.chat_history,
            vec![
                "**You:** What is in green curry?".to_string(),
                "**Assistant:** Green chilies and coconut milk.".to_string(),
            ]
        );
        assert_eq!(page.spinners.last().map(String::as_str), Some(PROCESSING));
    }

    #[tokio::test]
    async fn test_failing_chat_shows_fallback() {
        let h = harness(ScriptedChatModel::new(vec![Err(
            ChatModelError::ServiceUnavailable,
        )]));
        let mut state = UiSessionState::default();

        let page = h
            .controller
            .render(&input(Some(URL), Some("Any dessert?"), false), &mut state)
            .await;

        assert_eq!(
            page.response.map(|r| r.text),
            Some(CHAT_FALLBACK.to_string())
        );
        assert!(
            page.notices
                .iter()
                .any(|n| matches!(n, Notice::Error(text) if text.starts_with("Error: ")))
        );
        assert!(page.sidebar.chat_history.is_empty());
    }

    #[tokio::test]
    async fn test_unsaved_exchange_is_not_shown_in_history() {
        let h = harness(ScriptedChatModel::new(vec![Ok(ChatCompletion::Message(
            "answer".to_string(),
        ))]));
        let mut state = UiSessionState::default();
        h.storage.fail_upserts("db down");

        let page = h
            .controller
            .render(&input(Some(URL), Some("q"), false), &mut state)
            .await;

        assert_eq!(
            page.response.map(|r| r.text),
            Some(CHAT_FALLBACK.to_string())
        );
        assert!(page.notices.contains(&Notice::Error(
            "Error: Storage error: Database error: db down".to_string()
        )));
        assert!(page.sidebar.chat_history.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_history_entry_is_rendered() {
        let h = harness(ScriptedChatModel::new(vec![]));
        let mut state = UiSessionState::default();

        let mut run = AssistantRun::with_id("run-1".to_string(), "user".to_string());
        run.push_turn(ChatTurn::user("Is mango sticky rice sweet?"));
        run.push_turn(ChatTurn::Malformed {
            raw: json!(["not", "a", "turn"]),
        });
        h.storage.upsert(&run).await.unwrap();

        let page = h
            .controller
            .render(&input(Some(URL), None, false), &mut state)
            .await;

        assert_eq!(page.run_id.as_deref(), Some("run-1"));
        assert_eq!(
            page.sidebar.chat_history,
            vec![
                "**You:** Is mango sticky rice sweet?".to_string(),
                "Unexpected chat entry format: [\"not\",\"a\",\"turn\"]".to_string(),
            ]
        );
    }
}
