//! LLM Abstraction Layer
//!
//! Generates AI replies with Google Gemini through the public Generative
//! Language API. [`ModelFallback`] wraps a [`GenerationTransport`] (normally
//! [`GeminiClient`]) and walks model candidates and API keys until one
//! answers.
//!
//! # Example
//!
//! ```rust,no_run
//! use emochat::llm::{ChatTurn, GeminiClient, GenerateRequest, KeyRing, LlmProvider, ModelFallback};
//! use emochat::store::Role;
//!
//! # async fn example() -> Result<(), emochat::llm::LlmError> {
//! let provider = ModelFallback::new(GeminiClient::new()?, KeyRing::from_csv("key-1,key-2"))
//!     .with_preferred_model("gemini-pro");
//! let reply = provider
//!     .generate(&GenerateRequest::new(vec![ChatTurn::new(Role::User, "I had a rough day")]))
//!     .await?;
//! println!("{}", reply.text);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod fallback;
pub mod gemini;

pub use core::{
    config::GenerationConfig,
    error::{Attempt, LlmError},
    provider::{GenerationTransport, LlmProvider},
    types::{ChatTurn, GenerateRequest, Generation},
};
pub use fallback::{default_candidates, KeyRing, ModelCandidate, ModelFallback};
pub use gemini::GeminiClient;
