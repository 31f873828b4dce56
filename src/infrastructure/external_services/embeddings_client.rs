use async_trait::async_trait;
use pgvector::Vector;
use reqwest::{Client, Error as ReqwestError, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::{RetryPolicy, Transient, send_with_retries};
use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingProvider, EmbeddingProviderError,
    EmbeddingRequest, EmbeddingResponse,
};
use crate::infrastructure::config::EmbedderConfig;

#[derive(Serialize)]
pub struct EmbeddingsRequest<'a> {
    pub model: &'a str,
    pub input: &'a [String],
}

#[derive(Deserialize)]
pub struct EmbeddingsResponse {
    pub data: Vec<EmbeddingData>,
    pub model: String,
    pub usage: Option<EmbeddingsUsage>,
}

#[derive(Deserialize)]
pub struct EmbeddingData {
    pub index: usize,
    pub embedding: Vec<f32>,
}

#[derive(Deserialize)]
pub struct EmbeddingsUsage {
    pub total_tokens: i32,
}

#[derive(Debug)]
pub enum EmbeddingsError {
    RequestError(String),
    StatusError(StatusCode, String),
    ParseError(String),
}

impl std::fmt::Display for EmbeddingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingsError::RequestError(msg) => write!(f, "Request error: {}", msg),
            EmbeddingsError::StatusError(status, body) => write!(f, "HTTP {}: {}", status, body),
            EmbeddingsError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl Transient for EmbeddingsError {
    fn is_transient(&self) -> bool {
        match self {
            EmbeddingsError::RequestError(_) => true,
            EmbeddingsError::StatusError(status, _) => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            EmbeddingsError::ParseError(_) => false,
        }
    }
}

impl From<EmbeddingsError> for EmbeddingProviderError {
    fn from(error: EmbeddingsError) -> Self {
        match error {
            EmbeddingsError::RequestError(msg) => EmbeddingProviderError::NetworkError(msg),
            EmbeddingsError::StatusError(StatusCode::UNAUTHORIZED, body)
            | EmbeddingsError::StatusError(StatusCode::FORBIDDEN, body) => {
                EmbeddingProviderError::AuthenticationFailed(body)
            }
            EmbeddingsError::StatusError(StatusCode::TOO_MANY_REQUESTS, _) => {
                EmbeddingProviderError::RateLimitExceeded
            }
            EmbeddingsError::StatusError(status, _) if status.is_server_error() => {
                EmbeddingProviderError::ServiceUnavailable
            }
            EmbeddingsError::StatusError(status, body) => {
                EmbeddingProviderError::ApiError(format!("HTTP {}: {}", status, body))
            }
            EmbeddingsError::ParseError(msg) => EmbeddingProviderError::ApiError(msg),
        }
    }
}

/// Client for an OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct EmbeddingsClient {
    client: Client,
    config: EmbedderConfig,
}

impl EmbeddingsClient {
    pub fn new(config: EmbedderConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn get_embeddings(
        &self,
        texts: &[String],
    ) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let policy = RetryPolicy::new(self.config.max_retries, self.config.backoff_factor);
        let request = EmbeddingsRequest {
            model: &self.config.model,
            input: texts,
        };

        send_with_retries(policy, || self.execute_request(&request)).await
    }

    async fn execute_request(
        &self,
        request: &EmbeddingsRequest<'_>,
    ) -> Result<EmbeddingsResponse, EmbeddingsError> {
        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));
        let mut builder = self.client.post(&url).json(request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| EmbeddingsError::RequestError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingsError::StatusError(status, body));
        }

        response
            .json::<EmbeddingsResponse>()
            .await
            .map_err(|e| EmbeddingsError::ParseError(e.to_string()))
    }
}

/// Puts the returned vectors back in input order.
fn into_vectors(mut response: EmbeddingsResponse, expected: usize) -> Result<Vec<Vector>, EmbeddingProviderError> {
    if response.data.len() != expected {
        return Err(EmbeddingProviderError::ApiError(format!(
            "Expected {} embeddings, got {}",
            expected,
            response.data.len()
        )));
    }

    response.data.sort_by_key(|d| d.index);
    Ok(response
        .data
        .into_iter()
        .map(|d| Vector::from(d.embedding))
        .collect())
}

// Adapter to implement the EmbeddingProvider trait
pub struct OpenAiEmbeddingProvider {
    client: EmbeddingsClient,
    model_name: String,
    dimensions: usize,
}

impl OpenAiEmbeddingProvider {
    pub fn new(config: EmbedderConfig) -> Result<Self, ReqwestError> {
        let model_name = config.model.clone();
        let dimensions = config.dimensions;
        let client = EmbeddingsClient::new(config)?;
        Ok(Self {
            client,
            model_name,
            dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError> {
        if request.text.trim().is_empty() {
            return Err(EmbeddingProviderError::InvalidInput(
                "Cannot embed empty text".to_string(),
            ));
        }

        let response = self.client.get_embeddings(&[request.text]).await?;
        let token_count = response.usage.as_ref().map(|u| u.total_tokens);
        let model_name = response.model.clone();
        let embedding = into_vectors(response, 1)?
            .pop()
            .ok_or_else(|| EmbeddingProviderError::ApiError("No embeddings returned".to_string()))?;

        Ok(EmbeddingResponse {
            embedding,
            model_name,
            token_count,
        })
    }

    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        if request.texts.is_empty() {
            return Ok(BatchEmbeddingResponse {
                embeddings: Vec::new(),
                model_name: self.model_name.clone(),
                total_tokens: None,
            });
        }

        let response = self.client.get_embeddings(&request.texts).await?;
        let total_tokens = response.usage.as_ref().map(|u| u.total_tokens);
        let model_name = response.model.clone();

        Ok(BatchEmbeddingResponse {
            embeddings: into_vectors(response, request.texts.len())?,
            model_name,
            total_tokens,
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn embedding_dimension(&self) -> usize {
        self.dimensions
    }
}
