//! Seams between the fallback loop and the wire

use async_trait::async_trait;

use super::{
    error::LlmError,
    types::{GenerateRequest, Generation},
};
use crate::llm::fallback::ModelCandidate;
use crate::llm::gemini::types::{GenerateContentRequest, GenerateContentResponse};

/// Anything that can produce the next AI reply for a conversation
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<Generation, LlmError>;
}

/// A single `generateContent` call against one key and one candidate
///
/// Implemented by [`crate::llm::gemini::GeminiClient`]; tests substitute
/// scripted transports.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate_content(
        &self,
        api_key: &str,
        candidate: &ModelCandidate,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError>;
}
