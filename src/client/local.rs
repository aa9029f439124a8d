//! On-device conversation history
//!
//! Keeps conversations in a single JSON file so a chat can continue while
//! the server is unreachable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::store::{title_preview, Role, DEFAULT_TITLE};

#[derive(Debug, Error)]
pub enum LocalError {
    #[error("Local history I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Local history is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalMessage {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl LocalMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalConversation {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<LocalMessage>,
}

impl LocalConversation {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }
}

/// JSON-file store of local conversations, most recently updated first
#[derive(Debug)]
pub struct LocalHistory {
    path: PathBuf,
    conversations: Vec<LocalConversation>,
}

impl LocalHistory {
    /// Load the file at `path`; a missing file is an empty history
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but can't be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LocalError> {
        let path = path.as_ref().to_path_buf();
        let conversations = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            conversations,
        })
    }

    /// Write the whole history, replacing the file atomically
    pub async fn save(&self) -> Result<(), LocalError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&self.conversations)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub fn conversations(&self) -> &[LocalConversation] {
        &self.conversations
    }

    pub fn get(&self, id: Uuid) -> Option<&LocalConversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Insert or replace a conversation and move it to the front
    pub fn upsert(&mut self, conversation: LocalConversation) {
        self.conversations.retain(|c| c.id != conversation.id);
        self.conversations.insert(0, conversation);
    }

    /// Append messages, creating the conversation if needed
    ///
    /// The first user message of an untitled conversation becomes its title.
    pub fn append(&mut self, id: Uuid, messages: impl IntoIterator<Item = LocalMessage>) {
        let mut conversation = match self.conversations.iter().position(|c| c.id == id) {
            Some(index) => self.conversations.remove(index),
            None => LocalConversation::new(id),
        };

        for message in messages {
            if conversation.messages.is_empty()
                && message.role == Role::User
                && conversation.title == DEFAULT_TITLE
            {
                conversation.title = title_preview(&message.content);
            }
            conversation.messages.push(message);
        }
        conversation.updated_at = Utc::now();
        self.conversations.insert(0, conversation);
    }

    /// Returns true if a conversation was removed
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        self.conversations.len() != before
    }
}
