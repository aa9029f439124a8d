// Request and response bodies of the REST API (shared by the server and the client)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Claims;
use crate::store::{self, Role};

// Request Types

/// Fields are optional so a missing field is a 400 with a useful message,
/// not a body-deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConversationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddMessageRequest {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl AddMessageRequest {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role: Some(role.as_str().to_string()),
            content: Some(content.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkMessagesRequest {
    pub messages: Option<Vec<AddMessageRequest>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_builtin_key: Option<bool>,
}

// Response Types

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub user: Claims,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<MessageResponse>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub message_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkMessagesResponse {
    pub success: bool,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// Conversions from store rows

impl From<&store::User> for UserResponse {
    fn from(user: &store::User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: Some(user.created_at),
        }
    }
}

impl From<store::ConversationSummary> for ConversationSummaryResponse {
    fn from(summary: store::ConversationSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
            message_count: summary.message_count,
        }
    }
}

impl ConversationResponse {
    pub fn new(conversation: store::Conversation, messages: Option<Vec<store::Message>>) -> Self {
        Self {
            id: conversation.id,
            title: conversation.title,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
            is_archived: conversation.is_archived,
            messages: messages.map(|m| m.into_iter().map(MessageResponse::from).collect()),
        }
    }
}

impl From<store::Message> for MessageResponse {
    fn from(message: store::Message) -> Self {
        Self {
            id: message.id,
            role: message.role,
            content: message.content,
            created_at: message.created_at,
            message_order: message.message_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signup_request_tolerates_missing_fields() {
        let request: SignupRequest = serde_json::from_str(r#"{"email":"a@b.c"}"#).unwrap();
        assert_eq!(request.email.as_deref(), Some("a@b.c"));
        assert!(request.name.is_none());
        assert!(request.password.is_none());
    }

    #[test]
    fn test_update_conversation_request_camel_case() {
        let request: UpdateConversationRequest =
            serde_json::from_value(json!({ "isArchived": true })).unwrap();
        assert_eq!(request.is_archived, Some(true));
        assert!(request.title.is_none());
    }

    #[test]
    fn test_bulk_request_deserialization() {
        let request: BulkMessagesRequest = serde_json::from_value(json!({
            "messages": [
                { "role": "user", "content": "hi" },
                { "role": "ai", "content": "hello" }
            ]
        }))
        .unwrap();
        let messages = request.messages.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role.as_deref(), Some("ai"));
    }

    #[test]
    fn test_message_response_serialization() {
        let response = MessageResponse {
            id: Uuid::new_v4(),
            role: Role::Ai,
            content: "Hello".to_string(),
            created_at: Utc::now(),
            message_order: 3,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["role"], "ai");
        assert_eq!(value["messageOrder"], 3);
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_conversation_response_omits_messages_when_absent() {
        let now = Utc::now();
        let response = ConversationResponse {
            id: Uuid::new_v4(),
            title: "New Chat".to_string(),
            created_at: now,
            updated_at: now,
            is_archived: false,
            messages: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("messages").is_none());
        assert_eq!(value["isArchived"], false);
    }

    #[test]
    fn test_user_response_without_created_at() {
        let value = json!({
            "id": Uuid::nil(),
            "name": "Ada",
            "email": "ada@example.com"
        });
        let user: UserResponse = serde_json::from_value(value).unwrap();
        assert!(user.created_at.is_none());
    }

    #[test]
    fn test_health_response_error_shape() {
        let response = HealthResponse {
            status: "error".to_string(),
            database: None,
            timestamp: None,
            message: Some("connection refused".to_string()),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "status": "error", "message": "connection refused" }));
    }
}
