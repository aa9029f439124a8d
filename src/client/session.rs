//! One conversation as seen from the chat window

use futures::future::{AbortHandle, Abortable, Aborted};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm::{ChatTurn, GenerateRequest, Generation, LlmError, LlmProvider};
use crate::models::AddMessageRequest;
use crate::store::Role;

use super::api::ChatApiClient;
use super::error::ClientError;
use super::local::{LocalError, LocalHistory, LocalMessage};

/// Persona sent ahead of every conversation
pub const DEFAULT_PERSONA: &str = "You are a warm, empathetic companion. Listen carefully, \
acknowledge how the user feels, and answer in a kind, conversational tone.";

#[derive(Debug, Error)]
pub enum SessionError {
    /// A reply is already being generated for this conversation
    #[error("A reply is already being generated")]
    Busy,

    #[error("Generation was cancelled")]
    Cancelled,

    #[error("Empty message batch")]
    EmptyBatch,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Api(#[from] ClientError),

    #[error(transparent)]
    Local(#[from] LocalError),
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Llm(e) => e.user_message().to_string(),
            SessionError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Where a finished exchange was stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persisted {
    Server,
    Local,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub generation: Generation,
    pub persisted: Persisted,
}

/// Clears the in-flight flag however `send` exits
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Ties a conversation's history to a reply generator and to storage
///
/// At most one generation runs at a time. Each exchange (the user batch plus
/// the reply) is saved through the bulk endpoint; when the server can't be
/// reached it goes to the local history instead.
pub struct ChatSession<P> {
    conversation_id: Uuid,
    api: ChatApiClient,
    provider: P,
    local: tokio::sync::Mutex<LocalHistory>,
    history: Mutex<Vec<ChatTurn>>,
    persona: String,
    in_flight: AtomicBool,
    abort: Mutex<Option<AbortHandle>>,
}

impl<P: LlmProvider> ChatSession<P> {
    pub fn new(conversation_id: Uuid, api: ChatApiClient, provider: P, local: LocalHistory) -> Self {
        Self {
            conversation_id,
            api,
            provider,
            local: tokio::sync::Mutex::new(local),
            history: Mutex::new(Vec::new()),
            persona: DEFAULT_PERSONA.to_string(),
            in_flight: AtomicBool::new(false),
            abort: Mutex::new(None),
        }
    }

    /// Replace the persona (builder pattern)
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Turns sent so far, oldest first
    pub fn history(&self) -> Vec<ChatTurn> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Load earlier messages from the server, or the local copy when offline
    pub async fn load_history(&self) -> Result<usize, SessionError> {
        let turns: Vec<ChatTurn> = match self.api.list_messages(self.conversation_id).await {
            Ok(messages) => messages
                .into_iter()
                .map(|m| ChatTurn::new(m.role, m.content))
                .collect(),
            Err(e) if e.is_network() => {
                warn!(error = %e, "Server unreachable, loading local history");
                let local = self.local.lock().await;
                local
                    .get(self.conversation_id)
                    .map(|c| {
                        c.messages
                            .iter()
                            .map(|m| ChatTurn::new(m.role, m.content.clone()))
                            .collect()
                    })
                    .unwrap_or_default()
            }
            Err(e) => return Err(e.into()),
        };

        let count = turns.len();
        if let Ok(mut history) = self.history.lock() {
            *history = turns;
        }
        Ok(count)
    }

    /// Generate one reply for a batch of user messages and store the exchange
    ///
    /// # Errors
    ///
    /// * `SessionError::Busy` - If another reply is still being generated
    /// * `SessionError::Cancelled` - If [`cancel`](Self::cancel) was called
    /// * `SessionError::Llm` - If no model produced a reply
    /// * `SessionError::Api` - If the server rejected the save
    ///
    /// On any error the batch is not added to the history.
    pub async fn send(&self, batch: Vec<String>) -> Result<Reply, SessionError> {
        let batch: Vec<String> = batch
            .into_iter()
            .filter(|m| !m.trim().is_empty())
            .collect();
        if batch.is_empty() {
            return Err(SessionError::EmptyBatch);
        }

        let (handle, registration) = AbortHandle::new_pair();
        let _guard = {
            // Flag and handle change under one lock so cancel sees both or neither
            let mut abort = self.abort.lock().unwrap_or_else(PoisonError::into_inner);
            if self
                .in_flight
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return Err(SessionError::Busy);
            }
            *abort = Some(handle);
            InFlight(&self.in_flight)
        };

        let mut turns = self.history();
        turns.extend(batch.iter().map(|m| ChatTurn::new(Role::User, m.clone())));
        let request = GenerateRequest::new(turns).with_system(self.persona.clone());

        let outcome = Abortable::new(self.provider.generate(&request), registration).await;
        if let Ok(mut abort) = self.abort.lock() {
            *abort = None;
        }

        let generation = match outcome {
            Ok(result) => result?,
            Err(Aborted) => return Err(SessionError::Cancelled),
        };

        let persisted = self.persist(&batch, &generation.text).await?;

        if let Ok(mut history) = self.history.lock() {
            history.extend(batch.into_iter().map(|m| ChatTurn::new(Role::User, m)));
            history.push(ChatTurn::new(Role::Ai, generation.text.clone()));
        }

        Ok(Reply {
            generation,
            persisted,
        })
    }

    /// Abort the generation in flight; returns false if there was none
    pub fn cancel(&self) -> bool {
        match self.abort.lock().ok().and_then(|mut a| a.take()) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    async fn persist(&self, batch: &[String], reply: &str) -> Result<Persisted, SessionError> {
        let mut messages: Vec<AddMessageRequest> = batch
            .iter()
            .map(|m| AddMessageRequest::new(Role::User, m.as_str()))
            .collect();
        messages.push(AddMessageRequest::new(Role::Ai, reply));

        match self.api.add_messages(self.conversation_id, messages).await {
            Ok(saved) => {
                info!(
                    conversation_id = %self.conversation_id,
                    count = saved.messages.len(),
                    "Saved exchange"
                );
                Ok(Persisted::Server)
            }
            Err(e) if e.is_network() => {
                warn!(error = %e, "Server unreachable, saving exchange locally");
                let mut local = self.local.lock().await;
                let mut entries: Vec<LocalMessage> = batch
                    .iter()
                    .map(|m| LocalMessage::new(Role::User, m.as_str()))
                    .collect();
                entries.push(LocalMessage::new(Role::Ai, reply));
                local.append(self.conversation_id, entries);
                local.save().await?;
                Ok(Persisted::Local)
            }
            Err(e) => Err(e.into()),
        }
    }
}
