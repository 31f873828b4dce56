use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::application::ports::{
    ChatModel,
    chat_model::{ChatCompletion, ChatMessage, ChatRequest, ToolCall, ToolDefinition},
};
use crate::application::services::SearchService;
use crate::domain::entities::{AssistantRun, ChatTurn, KnowledgeBase};
use crate::domain::repositories::AssistantStorage;

const SEARCH_KNOWLEDGE_BASE: &str = "search_knowledge_base";
const GET_CHAT_HISTORY: &str = "get_chat_history";

#[derive(Debug)]
pub enum AssistantError {
    StorageError(String),
    ModelError(String),
}

impl std::fmt::Display for AssistantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssistantError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            AssistantError::ModelError(msg) => write!(f, "Model error: {}", msg),
        }
    }
}

impl std::error::Error for AssistantError {}

/// Behaviour switches for an assistant run.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub use_tools: bool,
    pub show_tool_calls: bool,
    pub search_knowledge: bool,
    pub read_chat_history: bool,
    /// Also send prior turns inline with each request, not only via the tool.
    pub add_chat_history_to_messages: bool,
    pub num_history_messages: usize,
    pub num_documents: i64,
    pub max_tool_rounds: usize,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            use_tools: true,
            show_tool_calls: true,
            search_knowledge: true,
            read_chat_history: true,
            add_chat_history_to_messages: false,
            num_history_messages: 6,
            num_documents: 5,
            max_tool_rounds: 5,
        }
    }
}

/// Collaborators shared by every assistant built during a process lifetime.
#[derive(Clone)]
pub struct AssistantDeps {
    pub chat_model: Arc<dyn ChatModel>,
    pub search_service: Arc<SearchService>,
    pub settings: AssistantSettings,
}

pub struct Assistant {
    run: AssistantRun,
    knowledge_base: Arc<KnowledgeBase>,
    storage: Arc<dyn AssistantStorage>,
    deps: AssistantDeps,
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
}

#[derive(Deserialize)]
struct HistoryArgs {
    #[serde(default = "default_num_chats")]
    num_chats: usize,
}

fn default_num_chats() -> usize {
    3
}

impl Assistant {
    /// Binds an assistant to a run. `run_id = None` mints a new run; a given ID
    /// is loaded from storage, or started empty when storage has no record of it.
    pub async fn start(
        run_id: Option<String>,
        user_id: &str,
        knowledge_base: Arc<KnowledgeBase>,
        storage: Arc<dyn AssistantStorage>,
        deps: AssistantDeps,
    ) -> Result<Self, AssistantError> {
        let run = match run_id {
            None => AssistantRun::new(user_id.to_string()),
            Some(run_id) => match storage
                .read(&run_id)
                .await
                .map_err(|e| AssistantError::StorageError(e.to_string()))?
            {
                Some(run) => run,
                None => {
                    tracing::warn!("Run {} not found in storage, starting it empty", run_id);
                    AssistantRun::with_id(run_id, user_id.to_string())
                }
            },
        };

        Ok(Self {
            run,
            knowledge_base,
            storage,
            deps,
        })
    }

    pub fn run_id(&self) -> &str {
        self.run.run_id()
    }

    pub fn reads_chat_history(&self) -> bool {
        self.deps.settings.read_chat_history
    }

    pub fn get_chat_history(&self) -> Vec<ChatTurn> {
        self.run.transcript().to_vec()
    }

    /// Answers `message`, running any tool calls the model requests, and
    /// persists the exchange. The transcript is left untouched on failure.
    pub async fn chat(&mut self, message: &str) -> Result<String, AssistantError> {
        let settings = &self.deps.settings;
        let tools = self.tool_definitions();

        let mut messages = vec![ChatMessage::system(self.system_prompt())];
        if settings.add_chat_history_to_messages {
            messages.extend(self.history_messages(settings.num_history_messages));
        }
        messages.push(ChatMessage::user(message));

        let mut tool_call_log = Vec::new();
        let mut rounds = 0;

        let answer = loop {
            let offered_tools = if rounds < settings.max_tool_rounds {
                tools.clone()
            } else {
                tracing::warn!(
                    "Run {} reached {} tool rounds, requesting a final answer",
                    self.run.run_id(),
                    rounds
                );
                Vec::new()
            };

            let completion = self
                .deps
                .chat_model
                .complete(ChatRequest {
                    messages: messages.clone(),
                    tools: offered_tools,
                })
                .await
                .map_err(|e| AssistantError::ModelError(e.to_string()))?;

            match completion {
                ChatCompletion::Message(content) => break content,
                ChatCompletion::ToolCalls { content, calls } => {
                    if rounds >= settings.max_tool_rounds {
                        // Tools were withheld; take whatever text came back.
                        break content.unwrap_or_default();
                    }

                    messages.push(ChatMessage::assistant_tool_calls(content, calls.clone()));
                    for call in &calls {
                        tool_call_log.push(format_tool_call(call));
                        let result = self.run_tool(call).await;
                        messages.push(ChatMessage::tool_result(call.id.clone(), result));
                    }
                    rounds += 1;
                }
            }
        };

        let response = if settings.show_tool_calls && !tool_call_log.is_empty() {
            let calls: Vec<String> = tool_call_log
                .iter()
                .map(|call| format!(" - Running: {}", call))
                .collect();
            format!("{}\n\n{}", calls.join("\n"), answer)
        } else {
            answer.clone()
        };

        let (provider, model) = self.deps.chat_model.model_info();
        let mut updated = self.run.clone();
        updated.set_llm(json!({ "provider": provider, "model": model }));
        updated.push_turn(ChatTurn::user(message));
        updated.push_turn(ChatTurn::assistant(answer));
        self.storage
            .upsert(&updated)
            .await
            .map_err(|e| AssistantError::StorageError(e.to_string()))?;
        self.run = updated;

        Ok(response)
    }

    fn system_prompt(&self) -> String {
        let settings = &self.deps.settings;
        let mut instructions = vec![
            "You are a helpful assistant that answers questions about a PDF document.".to_string(),
        ];
        if settings.use_tools && settings.search_knowledge {
            instructions.push(format!(
                "Always use the `{}` tool to find relevant passages before answering, and base \
                 your answer on what it returns.",
                SEARCH_KNOWLEDGE_BASE
            ));
        }
        if settings.use_tools && settings.read_chat_history {
            instructions.push(format!(
                "If the question refers to earlier parts of the conversation, use the `{}` tool.",
                GET_CHAT_HISTORY
            ));
        }
        instructions.push(
            "If the document does not contain the answer, say so instead of guessing.".to_string(),
        );
        instructions.push("Use markdown to format your answers.".to_string());

        instructions.join("\n")
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let settings = &self.deps.settings;
        let mut tools = Vec::new();
        if !settings.use_tools {
            return tools;
        }

        if settings.search_knowledge {
            tools.push(ToolDefinition {
                name: SEARCH_KNOWLEDGE_BASE.to_string(),
                description: "Search the knowledge base built from the PDF for passages relevant \
                              to a query. Returns a JSON list of documents."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "The search query." }
                    },
                    "required": ["query"]
                }),
            });
        }

        if settings.read_chat_history {
            tools.push(ToolDefinition {
                name: GET_CHAT_HISTORY.to_string(),
                description: "Returns the previous questions and answers of this conversation \
                              as a JSON list, oldest first."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "num_chats": {
                            "type": "integer",
                            "description": "Number of previous exchanges to return.",
                            "default": 3
                        }
                    }
                }),
            });
        }

        tools
    }

    fn history_messages(&self, limit: usize) -> Vec<ChatMessage> {
        let turns: Vec<ChatMessage> = self
            .run
            .transcript()
            .iter()
            .filter_map(|turn| match turn {
                ChatTurn::User { content } => Some(ChatMessage::user(content.clone())),
                ChatTurn::Assistant { content } => Some(ChatMessage::assistant(content.clone())),
                ChatTurn::Malformed { .. } => None,
            })
            .collect();
        let skip = turns.len().saturating_sub(limit);
        turns.into_iter().skip(skip).collect()
    }

    /// Tool failures are reported back to the model as text, never raised.
    async fn run_tool(&self, call: &ToolCall) -> String {
        tracing::debug!("Run {} calling {}", self.run.run_id(), format_tool_call(call));

        match call.name.as_str() {
            SEARCH_KNOWLEDGE_BASE => {
                let args: SearchArgs = match serde_json::from_str(&call.arguments) {
                    Ok(args) => args,
                    Err(e) => return format!("Invalid arguments for {}: {}", call.name, e),
                };

                match self
                    .deps
                    .search_service
                    .search(
                        self.knowledge_base.collection(),
                        &args.query,
                        self.deps.settings.num_documents,
                    )
                    .await
                {
                    Ok(results) => {
                        let documents: Vec<Value> = results
                            .iter()
                            .map(|result| {
                                json!({
                                    "name": result.chunk.name(),
                                    "meta_data": result.chunk.meta_data().to_json(),
                                    "content": result.chunk.content(),
                                    "similarity": result.similarity_score,
                                })
                            })
                            .collect();
                        Value::Array(documents).to_string()
                    }
                    Err(e) => {
                        tracing::warn!("Knowledge search failed: {}", e);
                        format!("Knowledge search failed: {}", e)
                    }
                }
            }
            GET_CHAT_HISTORY => {
                let args: HistoryArgs = if call.arguments.trim().is_empty() {
                    HistoryArgs {
                        num_chats: default_num_chats(),
                    }
                } else {
                    match serde_json::from_str(&call.arguments) {
                        Ok(args) => args,
                        Err(e) => return format!("Invalid arguments for {}: {}", call.name, e),
                    }
                };

                let history: Vec<Value> = self
                    .run
                    .recent_pairs(args.num_chats)
                    .into_iter()
                    .flat_map(|(question, answer)| {
                        [
                            json!({ "role": "user", "content": question }),
                            json!({ "role": "assistant", "content": answer }),
                        ]
                    })
                    .collect();
                Value::Array(history).to_string()
            }
            other => format!("Unknown tool: {}", other),
        }
    }
}

/// Renders a call as `name(key=value, ...)`.
fn format_tool_call(call: &ToolCall) -> String {
    let args = match serde_json::from_str::<Value>(&call.arguments) {
        Ok(Value::Object(map)) => map
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{}={}", key, s),
                other => format!("{}={}", key, other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        _ => call.arguments.clone(),
    };
    format!("{}({})", call.name, args)
}
