use std::collections::HashMap;
use std::env;

pub const DEFAULT_DATABASE_URL: &str = "postgres://ai:ai@localhost:5532/ai";
pub const KNOWLEDGE_COLLECTION: &str = "recipes";
pub const ASSISTANT_TABLE: &str = "pdf_assistant";
/// Width of the `embedding` column created by the migrations.
pub const STORED_EMBEDDING_DIMENSIONS: usize = 1536;

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { key: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { key, message } => {
                write!(f, "Invalid value for {}: {}", key, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Groq,
}

impl LlmProvider {
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Groq => "groq",
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "https://api.openai.com/v1",
            LlmProvider::Groq => "https://api.groq.com/openai/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "gpt-4o",
            LlmProvider::Groq => "llama3-70b-8192",
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "groq" => Ok(LlmProvider::Groq),
            other => Err(format!("unknown provider '{}', expected openai or groq", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatModelConfig {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_factor: f64,
}

#[derive(Debug, Clone)]
pub struct EmbedderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub dimensions: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_factor: f64,
}

/// Everything the service reads from its environment, resolved once at startup
/// and handed to the components that need it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub collection: String,
    pub chunk_size: usize,
    pub port: u16,
    pub http_timeout_secs: u64,
    pub chat: ChatModelConfig,
    pub embedder: EmbedderConfig,
}

impl AppConfig {
    /// Reads the process environment; `.env` is loaded by `main` beforehand.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let http_timeout_secs = parse_or(&get, "HTTP_TIMEOUT_SECS", 60u64)?;

        let provider = match get("LLM_PROVIDER") {
            Some(raw) => raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: "LLM_PROVIDER".to_string(),
                message,
            })?,
            None => LlmProvider::OpenAi,
        };

        let openai_api_key = get("OPENAI_API_KEY");
        let chat_api_key = match provider {
            LlmProvider::OpenAi => openai_api_key.clone(),
            LlmProvider::Groq => get("GROQ_API_KEY"),
        };

        let chat = ChatModelConfig {
            provider,
            api_key: chat_api_key,
            base_url: get("LLM_BASE_URL").unwrap_or_else(|| provider.base_url().to_string()),
            model: get("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            timeout_secs: http_timeout_secs,
            max_retries: 3,
            backoff_factor: 1.5,
        };

        let embedder = EmbedderConfig {
            api_key: openai_api_key,
            base_url: get("EMBEDDING_BASE_URL")
                .unwrap_or_else(|| LlmProvider::OpenAi.base_url().to_string()),
            model: get("EMBEDDING_MODEL").unwrap_or_else(|| "text-embedding-ada-002".to_string()),
            dimensions: parse_or(&get, "EMBEDDING_DIMENSIONS", STORED_EMBEDDING_DIMENSIONS)?,
            timeout_secs: http_timeout_secs,
            max_retries: 3,
            backoff_factor: 1.5,
        };

        if embedder.dimensions != STORED_EMBEDDING_DIMENSIONS {
            return Err(ConfigError::InvalidValue {
                key: "EMBEDDING_DIMENSIONS".to_string(),
                message: format!(
                    "the knowledge_documents table stores {}-dimensional vectors",
                    STORED_EMBEDDING_DIMENSIONS
                ),
            });
        }

        let chunk_size = parse_or(&get, "CHUNK_SIZE", 5000usize)?;
        if chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CHUNK_SIZE".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            collection: KNOWLEDGE_COLLECTION.to_string(),
            chunk_size,
            port: parse_or(&get, "PORT", 3000u16)?,
            http_timeout_secs,
            chat,
            embedder,
        })
    }
}

fn parse_or<T, F>(get: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
