use crate::store::{error::Result, types::UserSettings};
use deadpool_postgres::Pool;
use uuid::Uuid;

/// Read a user's settings, falling back to defaults when none were saved
pub async fn get_settings(pool: &Pool, user_id: Uuid) -> Result<UserSettings> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt(
            "SELECT preferred_model, use_builtin_key FROM user_settings WHERE user_id = $1",
            &[&user_id],
        )
        .await?;

    match row {
        Some(row) => Ok(UserSettings {
            preferred_model: row.try_get("preferred_model")?,
            use_builtin_key: row.try_get("use_builtin_key")?,
        }),
        None => Ok(UserSettings::default()),
    }
}

/// Insert or replace a user's settings (one row per user)
pub async fn upsert_settings(
    pool: &Pool,
    user_id: Uuid,
    settings: &UserSettings,
) -> Result<UserSettings> {
    let conn = pool.get().await?;

    let row = conn
        .query_one(
            "INSERT INTO user_settings (user_id, preferred_model, use_builtin_key)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id)
             DO UPDATE SET preferred_model = EXCLUDED.preferred_model,
                           use_builtin_key = EXCLUDED.use_builtin_key,
                           updated_at = NOW()
             RETURNING preferred_model, use_builtin_key",
            &[&user_id, &settings.preferred_model, &settings.use_builtin_key],
        )
        .await?;

    Ok(UserSettings {
        preferred_model: row.try_get("preferred_model")?,
        use_builtin_key: row.try_get("use_builtin_key")?,
    })
}
