use crate::store::{error::Result, types::Session};
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

fn parse_session_row(row: &Row) -> Result<Session> {
    Ok(Session {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        token: row.try_get("token")?,
        expires_at: row.try_get("expires_at")?,
        created_at: row.try_get("created_at")?,
        last_accessed: row.try_get("last_accessed")?,
    })
}

/// Record an issued token
///
/// Re-recording the same token refreshes its expiry instead of failing.
pub async fn create_session(
    pool: &Pool,
    user_id: Uuid,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<Session> {
    let conn = pool.get().await?;
    let row = conn
        .query_one(
            "INSERT INTO sessions (user_id, token, expires_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (token) DO UPDATE SET expires_at = EXCLUDED.expires_at
             RETURNING id, user_id, token, expires_at, created_at, last_accessed",
            &[&user_id, &token, &expires_at],
        )
        .await?;
    parse_session_row(&row)
}

/// Mark a session as just used; false when the token was never recorded or has expired
pub async fn touch_session(pool: &Pool, token: &str) -> Result<bool> {
    let conn = pool.get().await?;
    let updated = conn
        .execute(
            "UPDATE sessions SET last_accessed = NOW() WHERE token = $1 AND expires_at > NOW()",
            &[&token],
        )
        .await?;
    Ok(updated > 0)
}

/// Remove expired sessions, returning how many were deleted
pub async fn delete_expired_sessions(pool: &Pool) -> Result<u64> {
    let conn = pool.get().await?;
    let deleted = conn
        .execute("DELETE FROM sessions WHERE expires_at <= NOW()", &[])
        .await?;
    Ok(deleted)
}
