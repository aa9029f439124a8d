//! Model fallback and API-key rotation
//!
//! Not every API version serves every model name, and a configured key may
//! be revoked. [`ModelFallback`] walks the key ring in order and, for each
//! key, the ordered candidate list until one call succeeds.
//!
//! # Behavior
//!
//! * 404 → try the next candidate with the same key
//! * 401/403 → abandon this key, restart the candidates with the next key
//! * anything else (429, 5xx, network, blocked) → returned immediately
//! * nothing left → [`LlmError::Exhausted`] listing every attempt

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::llm::core::{
    error::{Attempt, LlmError},
    provider::{GenerationTransport, LlmProvider},
    types::{GenerateRequest, Generation},
};
use crate::llm::gemini::mapper::{from_gemini_response, to_gemini_request};

/// An (API version, model name) pair to try
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    pub api_version: String,
    pub model: String,
}

impl ModelCandidate {
    pub fn new(api_version: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            model: model.into(),
        }
    }
}

/// The candidates tried when nothing else is configured, newest first
pub fn default_candidates() -> Vec<ModelCandidate> {
    vec![
        ModelCandidate::new("v1beta", "gemini-2.0-flash"),
        ModelCandidate::new("v1beta", "gemini-1.5-flash"),
        ModelCandidate::new("v1", "gemini-1.5-flash"),
        ModelCandidate::new("v1beta", "gemini-pro"),
        ModelCandidate::new("v1", "gemini-pro"),
    ]
}

/// Ordered list of API keys; blank entries are dropped
#[derive(Clone, Default)]
pub struct KeyRing {
    keys: Vec<String>,
}

impl KeyRing {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|k| {
                    let k: String = k.into();
                    k.trim().to_string()
                })
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated list, e.g. from `GEMINI_API_KEYS`
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRing").field("len", &self.keys.len()).finish()
    }
}

/// [`LlmProvider`] that retries across keys and candidates
pub struct ModelFallback<T> {
    transport: T,
    keys: KeyRing,
    candidates: Vec<ModelCandidate>,
}

impl<T: GenerationTransport> ModelFallback<T> {
    pub fn new(transport: T, keys: KeyRing) -> Self {
        Self {
            transport,
            keys,
            candidates: default_candidates(),
        }
    }

    /// Replace the candidate list (builder pattern)
    pub fn with_candidates(mut self, candidates: Vec<ModelCandidate>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Try `model` first on every API version it appears in (builder pattern)
    ///
    /// A model that isn't in the list is tried on each known API version
    /// ahead of the rest.
    pub fn with_preferred_model(mut self, model: &str) -> Self {
        let model = model.trim();
        if model.is_empty() {
            return self;
        }

        let (mut preferred, rest): (Vec<_>, Vec<_>) =
            self.candidates.into_iter().partition(|c| c.model == model);

        if preferred.is_empty() {
            let mut versions: Vec<String> = Vec::new();
            for c in &rest {
                if !versions.contains(&c.api_version) {
                    versions.push(c.api_version.clone());
                }
            }
            preferred = versions
                .into_iter()
                .map(|v| ModelCandidate::new(v, model))
                .collect();
        }

        preferred.extend(rest);
        self.candidates = preferred;
        self
    }

    pub fn candidates(&self) -> &[ModelCandidate] {
        &self.candidates
    }
}

#[async_trait]
impl<T: GenerationTransport> LlmProvider for ModelFallback<T> {
    async fn generate(&self, request: &GenerateRequest) -> Result<Generation, LlmError> {
        if self.keys.is_empty() {
            return Err(LlmError::NoApiKeys);
        }
        if request.turns.is_empty() {
            return Err(LlmError::InvalidRequest(
                "Conversation has no messages".to_string(),
            ));
        }

        let body = to_gemini_request(request);
        let mut attempts: Vec<Attempt> = Vec::new();

        'keys: for (key_index, key) in self.keys.iter().enumerate() {
            for candidate in &self.candidates {
                debug!(
                    key_index,
                    api_version = %candidate.api_version,
                    model = %candidate.model,
                    "Trying model"
                );

                match self.transport.generate_content(key, candidate, &body).await {
                    Ok(response) => {
                        let (text, finish_reason) = from_gemini_response(response)?;
                        info!(
                            key_index,
                            api_version = %candidate.api_version,
                            model = %candidate.model,
                            attempts = attempts.len() + 1,
                            "Generated reply"
                        );
                        return Ok(Generation {
                            text,
                            model: candidate.model.clone(),
                            api_version: candidate.api_version.clone(),
                            key_index,
                            finish_reason,
                        });
                    }
                    Err(LlmError::ModelNotFound { .. }) => {
                        debug!(model = %candidate.model, "Model not available, trying next");
                        attempts.push(Attempt {
                            key_index,
                            api_version: candidate.api_version.clone(),
                            model: candidate.model.clone(),
                            status: 404,
                        });
                    }
                    Err(LlmError::AuthenticationError { status, .. }) => {
                        warn!(key_index, status, "API key rejected, falling back to next key");
                        attempts.push(Attempt {
                            key_index,
                            api_version: candidate.api_version.clone(),
                            model: candidate.model.clone(),
                            status,
                        });
                        continue 'keys;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        warn!(attempts = attempts.len(), "All model candidates failed");
        Err(LlmError::Exhausted { attempts })
    }
}
