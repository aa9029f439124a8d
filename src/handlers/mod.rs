// Handlers module

pub mod auth;
pub mod conversations;
pub mod health;
pub mod messages;
pub mod settings;

pub use auth::{login_handler, signup_handler, verify_handler};
pub use conversations::{
    create_conversation_handler, delete_conversation_handler, get_conversation_handler,
    list_conversations_handler, update_conversation_handler,
};
pub use health::health_handler;
pub use messages::{add_message_handler, bulk_add_messages_handler, list_messages_handler};
pub use settings::{get_settings_handler, update_settings_handler};

/// Trimmed value of an optional field, `None` when absent or blank
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
