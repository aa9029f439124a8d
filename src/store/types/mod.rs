//! Row types for the chat store

pub mod conversation;
pub mod message;
pub mod session;
pub mod settings;
pub mod user;

pub use conversation::{Conversation, ConversationPatch, ConversationSummary, DEFAULT_TITLE};
pub use message::{title_preview, Message, NewMessage, Role};
pub use session::Session;
pub use settings::{UserSettings, DEFAULT_PREFERRED_MODEL};
pub use user::User;
