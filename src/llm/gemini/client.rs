//! Gemini client implementation

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, Response};
use std::time::Duration;

use crate::llm::core::{error::LlmError, provider::GenerationTransport};
use crate::llm::fallback::ModelCandidate;

use super::types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

/// Public Generative Language API endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for the Generative Language API, authenticated by API key
#[derive(Clone)]
pub struct GeminiClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Scheme and host, without a trailing slash
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client against the public endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at another host, e.g. a local stub (builder pattern)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the endpoint URL for one candidate, without the key
    fn build_endpoint_url(&self, candidate: &ModelCandidate) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, candidate.api_version, candidate.model
        )
    }

    async fn error_from_response(response: Response, candidate: &ModelCandidate) -> LlmError {
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let raw = response.text().await.unwrap_or_default();
        classify_error(status, &raw, candidate, retry_after)
    }
}

/// Turn an error response into an `LlmError`
///
/// An invalid key is reported as 400 `API_KEY_INVALID`, not 401, so it is
/// promoted to an authentication error.
fn classify_error(
    status: u16,
    raw: &str,
    candidate: &ModelCandidate,
    retry_after: Option<Duration>,
) -> LlmError {
    let is_invalid_key = status == 400 && raw.contains("API_KEY_INVALID");
    let body = serde_json::from_str::<ErrorEnvelope>(raw)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| raw.to_string());

    if is_invalid_key {
        return LlmError::AuthenticationError {
            status,
            message: body,
        };
    }

    LlmError::from_status(
        status,
        body,
        &candidate.api_version,
        &candidate.model,
        retry_after,
    )
}

#[async_trait]
impl GenerationTransport for GeminiClient {
    async fn generate_content(
        &self,
        api_key: &str,
        candidate: &ModelCandidate,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        let url = self.build_endpoint_url(candidate);
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, candidate).await);
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
