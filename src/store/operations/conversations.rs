use crate::store::{
    error::{Error, Result},
    types::{Conversation, ConversationPatch, ConversationSummary},
};
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

const CONVERSATION_COLUMNS: &str = "id, user_id, title, created_at, updated_at, is_archived";

pub(crate) fn parse_conversation_row(row: &Row) -> Result<Conversation> {
    Ok(Conversation {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        is_archived: row.try_get("is_archived")?,
    })
}

fn parse_summary_row(row: &Row) -> Result<ConversationSummary> {
    Ok(ConversationSummary {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        message_count: row.try_get("message_count")?,
    })
}

/// List a user's non-archived conversations, most recently updated first
pub async fn list_conversations(pool: &Pool, user_id: Uuid) -> Result<Vec<ConversationSummary>> {
    let conn = pool.get().await?;

    let rows = conn
        .query(
            "SELECT c.id, c.title, c.created_at, c.updated_at, COUNT(m.id) AS message_count
             FROM conversations c
             LEFT JOIN messages m ON c.id = m.conversation_id
             WHERE c.user_id = $1 AND c.is_archived = false
             GROUP BY c.id, c.title, c.created_at, c.updated_at
             ORDER BY c.updated_at DESC",
            &[&user_id],
        )
        .await?;

    rows.iter().map(parse_summary_row).collect()
}

pub async fn create_conversation(pool: &Pool, user_id: Uuid, title: &str) -> Result<Conversation> {
    let conn = pool.get().await?;

    let sql = format!(
        "INSERT INTO conversations (user_id, title) VALUES ($1, $2) RETURNING {}",
        CONVERSATION_COLUMNS
    );

    let row = conn.query_one(&sql, &[&user_id, &title]).await?;
    parse_conversation_row(&row)
}

/// Fetch a conversation if it exists and belongs to `user_id`
pub async fn get_conversation(
    pool: &Pool,
    user_id: Uuid,
    conversation_id: Uuid,
) -> Result<Option<Conversation>> {
    let conn = pool.get().await?;

    let sql = format!(
        "SELECT {} FROM conversations WHERE id = $1 AND user_id = $2",
        CONVERSATION_COLUMNS
    );

    conn.query_opt(&sql, &[&conversation_id, &user_id])
        .await?
        .map(|row| parse_conversation_row(&row))
        .transpose()
}

/// Apply a patch to an owned conversation
///
/// # Errors
///
/// * `Error::ValidationError` - If the patch changes nothing or the title is blank
/// * `Error::NotFoundError` - If the conversation doesn't exist or isn't owned
pub async fn update_conversation(
    pool: &Pool,
    user_id: Uuid,
    conversation_id: Uuid,
    patch: ConversationPatch,
) -> Result<Conversation> {
    if patch.is_empty() {
        return Err(Error::ValidationError("Title is required".to_string()));
    }
    if matches!(patch.title.as_deref(), Some(t) if t.trim().is_empty()) {
        return Err(Error::ValidationError("Title is required".to_string()));
    }

    let conn = pool.get().await?;

    let sql = format!(
        "UPDATE conversations
         SET title = COALESCE($3, title),
             is_archived = COALESCE($4, is_archived),
             updated_at = NOW()
         WHERE id = $1 AND user_id = $2
         RETURNING {}",
        CONVERSATION_COLUMNS
    );

    let row = conn
        .query_opt(
            &sql,
            &[&conversation_id, &user_id, &patch.title, &patch.is_archived],
        )
        .await?
        .ok_or_else(|| Error::NotFoundError(format!("conversation {}", conversation_id)))?;

    parse_conversation_row(&row)
}

/// Delete an owned conversation; its messages go with it (ON DELETE CASCADE)
///
/// Returns false when nothing was deleted.
pub async fn delete_conversation(pool: &Pool, user_id: Uuid, conversation_id: Uuid) -> Result<bool> {
    let conn = pool.get().await?;
    let deleted = conn
        .execute(
            "DELETE FROM conversations WHERE id = $1 AND user_id = $2",
            &[&conversation_id, &user_id],
        )
        .await?;
    Ok(deleted > 0)
}
