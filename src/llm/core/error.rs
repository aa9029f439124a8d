//! Error types for the LLM layer

use std::time::Duration;
use thiserror::Error;

/// One failed try against a (key, api version, model) combination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub key_index: usize,
    pub api_version: String,
    pub model: String,
    /// HTTP status, 0 when the request never got a response
    pub status: u16,
}

/// Errors that can occur when generating a reply
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key was configured at all
    #[error("No API key configured")]
    NoApiKeys,

    /// The key was refused (401/403)
    #[error("Authentication error (status {status}): {message}")]
    AuthenticationError { status: u16, message: String },

    /// The (api version, model) pair doesn't exist (404)
    #[error("Model not found: {api_version}/{model}")]
    ModelNotFound { api_version: String, model: String },

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded (retry after {retry_after:?})")]
    RateLimitExceeded { retry_after: Option<Duration> },

    /// Any other non-success HTTP status
    #[error("HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// The request never produced a response (DNS, TLS, timeout, ...)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// JSON encoding/decoding issues
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The prompt or reply was withheld by the provider's safety filter
    #[error("Response blocked: {0}")]
    Blocked(String),

    /// The provider answered without any text
    #[error("Empty response from model")]
    EmptyResponse,

    /// Every key and every candidate failed with a "try next" error
    #[error("All models failed after {} attempts", .attempts.len())]
    Exhausted { attempts: Vec<Attempt> },
}

impl LlmError {
    /// HTTP status behind this error, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::AuthenticationError { status, .. } | LlmError::HttpError { status, .. } => {
                Some(*status)
            }
            LlmError::ModelNotFound { .. } => Some(404),
            LlmError::RateLimitExceeded { .. } => Some(429),
            _ => None,
        }
    }

    /// Classify a non-success response
    pub fn from_status(
        status: u16,
        body: String,
        api_version: &str,
        model: &str,
        retry_after: Option<Duration>,
    ) -> Self {
        match status {
            401 | 403 => LlmError::AuthenticationError {
                status,
                message: body,
            },
            404 => LlmError::ModelNotFound {
                api_version: api_version.to_string(),
                model: model.to_string(),
            },
            429 => LlmError::RateLimitExceeded { retry_after },
            _ => LlmError::HttpError { status, body },
        }
    }

    /// Text suitable for showing in the chat window instead of a reply
    pub fn user_message(&self) -> &'static str {
        match self {
            LlmError::NoApiKeys => "No API key is configured. Add a Gemini API key in settings.",
            LlmError::AuthenticationError { .. } => {
                "Your API key was rejected. Please check it in settings."
            }
            LlmError::ModelNotFound { .. } | LlmError::Exhausted { .. } => {
                "None of the available AI models could answer right now. Please try again later."
            }
            LlmError::RateLimitExceeded { .. } => {
                "Too many requests. Please wait a moment and try again."
            }
            LlmError::HttpError { status, .. } if *status >= 500 => {
                "The AI service is having trouble. Please try again shortly."
            }
            LlmError::NetworkError(_) => {
                "Couldn't reach the AI service. Check your internet connection."
            }
            LlmError::Blocked(_) => "That message couldn't be answered. Try rephrasing it.",
            LlmError::EmptyResponse => "The AI returned an empty reply. Please try again.",
            _ => "Something went wrong while generating a reply.",
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            LlmError::HttpError {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else if err.is_decode() {
            LlmError::SerializationError(err.to_string())
        } else {
            LlmError::NetworkError(err.to_string())
        }
    }
}
