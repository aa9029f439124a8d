//! Client side of the chat
//!
//! [`ChatApiClient`] speaks the REST API, [`MessageBatcher`] coalesces
//! bursts of user messages, [`LocalHistory`] keeps an on-device copy for
//! when the server is down, and [`ChatSession`] ties them to an
//! [`LlmProvider`](crate::llm::LlmProvider).

pub mod api;
pub mod batcher;
pub mod error;
pub mod local;
pub mod session;

pub use api::ChatApiClient;
pub use batcher::{MessageBatcher, DEFAULT_BATCH_DELAY};
pub use error::ClientError;
pub use local::{LocalConversation, LocalError, LocalHistory, LocalMessage};
pub use session::{ChatSession, Persisted, Reply, SessionError, DEFAULT_PERSONA};
