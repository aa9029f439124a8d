//! SQL operations, one module per table
//!
//! Every function takes the pool directly; [`crate::store::ChatStore`] wraps
//! them behind a clonable handle.

pub mod admin;
pub mod conversations;
pub mod messages;
pub mod sessions;
pub mod settings;
pub mod users;

pub use admin::{
    apply_schema, describe_tables, server_time, table_row_counts, ColumnDescription,
    TableDescription, SCHEMA_SQL,
};
pub use conversations::{
    create_conversation, delete_conversation, get_conversation, list_conversations,
    update_conversation,
};
pub use messages::{add_message, add_messages, list_messages};
pub use sessions::{create_session, delete_expired_sessions, touch_session};
pub use settings::{get_settings, upsert_settings};
pub use users::{create_user, email_exists, find_active_user_by_email, find_user_by_id, record_login};
