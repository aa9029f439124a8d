use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Title given to conversations created without one
pub const DEFAULT_TITLE: &str = "New Chat";

/// A conversation owned by a user
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_archived: bool,
}

/// A conversation as shown in the sidebar listing
#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: i64,
}

/// Fields a user may change on an existing conversation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationPatch {
    pub title: Option<String>,
    pub is_archived: Option<bool>,
}

impl ConversationPatch {
    /// Set the title (builder pattern)
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the archived flag (builder pattern)
    pub fn with_archived(mut self, archived: bool) -> Self {
        self.is_archived = Some(archived);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.is_archived.is_none()
    }
}
