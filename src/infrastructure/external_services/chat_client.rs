use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::{RetryPolicy, Transient, send_with_retries};
use crate::application::ports::chat_model::{
    ChatCompletion, ChatMessage, ChatModel, ChatModelError, ChatRequest, ChatRole, ToolCall,
    ToolDefinition,
};
use crate::infrastructure::config::ChatModelConfig;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: ChatRole,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolDefinition,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: WireMessage,
}

fn function_type() -> String {
    "function".to_string()
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: call.id.clone(),
                    kind: function_type(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
                .collect(),
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

impl From<WireMessage> for ChatCompletion {
    fn from(message: WireMessage) -> Self {
        if message.tool_calls.is_empty() {
            return ChatCompletion::Message(message.content.unwrap_or_default());
        }

        ChatCompletion::ToolCalls {
            content: message.content.filter(|c| !c.trim().is_empty()),
            calls: message
                .tool_calls
                .into_iter()
                .map(|call| ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: call.function.arguments,
                })
                .collect(),
        }
    }
}

#[derive(Debug)]
enum CompletionError {
    Request(String),
    Status(StatusCode, String),
    Parse(String),
}

impl std::fmt::Display for CompletionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionError::Request(msg) => write!(f, "Request error: {}", msg),
            CompletionError::Status(status, body) => write!(f, "HTTP {}: {}", status, body),
            CompletionError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl Transient for CompletionError {
    fn is_transient(&self) -> bool {
        match self {
            CompletionError::Request(_) => true,
            CompletionError::Status(status, _) => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            CompletionError::Parse(_) => false,
        }
    }
}

impl From<CompletionError> for ChatModelError {
    fn from(error: CompletionError) -> Self {
        match error {
            CompletionError::Request(msg) => ChatModelError::NetworkError(msg),
            CompletionError::Status(StatusCode::UNAUTHORIZED, body)
            | CompletionError::Status(StatusCode::FORBIDDEN, body) => {
                ChatModelError::AuthenticationFailed(body)
            }
            CompletionError::Status(StatusCode::TOO_MANY_REQUESTS, _) => {
                ChatModelError::RateLimitExceeded
            }
            CompletionError::Status(status, _) if status.is_server_error() => {
                ChatModelError::ServiceUnavailable
            }
            CompletionError::Status(status, body) => {
                ChatModelError::ApiError(format!("HTTP {}: {}", status, body))
            }
            CompletionError::Parse(msg) => ChatModelError::ParseError(msg),
        }
    }
}

/// Chat model behind an OpenAI-compatible `/chat/completions` endpoint
/// (OpenAI itself or Groq).
pub struct OpenAiCompatibleChatModel {
    client: Client,
    config: ChatModelConfig,
}

impl OpenAiCompatibleChatModel {
    pub fn new(config: ChatModelConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    async fn execute_request(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<CompletionResponse, CompletionError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let mut builder = self.client.post(&url).json(request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CompletionError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status(status, body));
        }

        response
            .json::<CompletionResponse>()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))
    }
}

fn build_request<'a>(model: &'a str, request: &'a ChatRequest) -> CompletionRequest<'a> {
    CompletionRequest {
        model,
        messages: request.messages.iter().map(WireMessage::from).collect(),
        tools: request
            .tools
            .iter()
            .map(|tool| WireTool {
                kind: "function",
                function: tool,
            })
            .collect(),
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, ChatModelError> {
        let body = build_request(&self.config.model, &request);
        let policy = RetryPolicy::new(self.config.max_retries, self.config.backoff_factor);

        let response = send_with_retries(policy, || self.execute_request(&body)).await?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            ChatModelError::ParseError("Completion contained no choices".to_string())
        })?;

        Ok(ChatCompletion::from(choice.message))
    }

    fn model_info(&self) -> (String, String) {
        (
            self.config.provider.name().to_string(),
            self.config.model.clone(),
        )
    }
}
