use crate::store::{
    error::{Error, Result},
    types::{title_preview, Message, NewMessage, Role, DEFAULT_TITLE},
};
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

pub(crate) fn parse_message_row(row: &Row) -> Result<Message> {
    let role: String = row.try_get("role")?;

    Ok(Message {
        id: row.try_get("id")?,
        conversation_id: row.try_get("conversation_id")?,
        role: role.parse()?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        message_order: row.try_get("message_order")?,
    })
}

/// List the messages of an owned conversation in `message_order`
///
/// # Errors
///
/// * `Error::NotFoundError` - If the conversation doesn't exist or isn't owned
pub async fn list_messages(
    pool: &Pool,
    user_id: Uuid,
    conversation_id: Uuid,
) -> Result<Vec<Message>> {
    let conn = pool.get().await?;

    let owned = conn
        .query_opt(
            "SELECT 1 FROM conversations WHERE id = $1 AND user_id = $2",
            &[&conversation_id, &user_id],
        )
        .await?;
    if owned.is_none() {
        return Err(Error::NotFoundError(format!("conversation {}", conversation_id)));
    }

    let rows = conn
        .query(
            "SELECT id, conversation_id, role, content, created_at, message_order
             FROM messages
             WHERE conversation_id = $1
             ORDER BY message_order ASC",
            &[&conversation_id],
        )
        .await?;

    rows.iter().map(parse_message_row).collect()
}

/// Append one message to an owned conversation
///
/// See [`add_messages`] for ordering and titling behavior.
pub async fn add_message(
    pool: &Pool,
    user_id: Uuid,
    conversation_id: Uuid,
    message: NewMessage,
) -> Result<Message> {
    add_messages(pool, user_id, conversation_id, vec![message])
        .await?
        .pop()
        .ok_or_else(|| Error::DatabaseError("insert returned no message".to_string()))
}

/// Append messages to an owned conversation in one transaction
///
/// # Behavior
///
/// 1. **Ordering**: messages receive `max(message_order) + 1, + 2, ...` in
///    input order. The parent conversation row is locked for the duration of
///    the transaction, so concurrent appends serialize and never reuse or
///    skip an order.
/// 2. **Titling**: if a `user` message lands at order 1 while the title is
///    still the default, the title becomes a preview of that message.
/// 3. **Freshness**: the conversation's `updated_at` is bumped.
/// 4. **Atomic**: either every message is stored or none is.
///
/// # Errors
///
/// * `Error::ValidationError` - If `messages` is empty or a content is blank
/// * `Error::NotFoundError` - If the conversation doesn't exist or isn't owned
/// * `Error::TransactionError` - If the transaction can't begin or commit
pub async fn add_messages(
    pool: &Pool,
    user_id: Uuid,
    conversation_id: Uuid,
    messages: Vec<NewMessage>,
) -> Result<Vec<Message>> {
    if messages.is_empty() {
        return Err(Error::ValidationError("Messages array is required".to_string()));
    }
    if messages.iter().any(|m| m.content.trim().is_empty()) {
        return Err(Error::ValidationError("Role and content are required".to_string()));
    }

    let mut conn = pool.get().await?;
    let tx = conn
        .transaction()
        .await
        .map_err(|e| Error::TransactionError(format!("Failed to begin transaction: {:?}", e)))?;

    let title: String = tx
        .query_opt(
            "SELECT title FROM conversations WHERE id = $1 AND user_id = $2 FOR UPDATE",
            &[&conversation_id, &user_id],
        )
        .await?
        .ok_or_else(|| Error::NotFoundError(format!("conversation {}", conversation_id)))?
        .try_get("title")?;

    let max_order: i32 = tx
        .query_one(
            "SELECT COALESCE(MAX(message_order), 0) FROM messages WHERE conversation_id = $1",
            &[&conversation_id],
        )
        .await?
        .try_get(0)?;

    let insert = tx
        .prepare(
            "INSERT INTO messages (conversation_id, role, content, message_order)
             VALUES ($1, $2, $3, $4)
             RETURNING id, conversation_id, role, content, created_at, message_order",
        )
        .await?;

    let mut inserted = Vec::with_capacity(messages.len());
    let mut new_title = None;

    for (offset, message) in messages.iter().enumerate() {
        let order = max_order + offset as i32 + 1;
        let row = tx
            .query_one(
                &insert,
                &[&conversation_id, &message.role.as_str(), &message.content, &order],
            )
            .await?;

        if order == 1 && message.role == Role::User && title == DEFAULT_TITLE {
            new_title = Some(title_preview(&message.content));
        }

        inserted.push(parse_message_row(&row)?);
    }

    tx.execute(
        "UPDATE conversations SET title = COALESCE($2, title), updated_at = NOW() WHERE id = $1",
        &[&conversation_id, &new_title],
    )
    .await?;

    tx.commit()
        .await
        .map_err(|e| Error::TransactionError(format!("Failed to commit transaction: {:?}", e)))?;

    Ok(inserted)
}
