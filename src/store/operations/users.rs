use crate::store::{
    error::{Error, Result},
    types::User,
};
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, email, password_hash, name, created_at, updated_at, last_login, is_active";

pub(crate) fn parse_user_row(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_login: row.try_get("last_login")?,
        is_active: row.try_get("is_active")?,
    })
}

/// Insert a new user
///
/// # Errors
///
/// * `Error::DuplicateError` - If the email is already registered
/// * `Error::DatabaseError` - For database connection or SQL errors
pub async fn create_user(
    pool: &Pool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<User> {
    let conn = pool.get().await?;

    let sql = format!(
        "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
        USER_COLUMNS
    );

    let row = conn
        .query_one(&sql, &[&name, &email, &password_hash])
        .await
        .map_err(|e| match Error::from(e) {
            Error::DuplicateError(_) => {
                Error::DuplicateError(format!("User with email '{}' already exists", email))
            }
            other => other,
        })?;

    parse_user_row(&row)
}

/// Look up an active user by email (used by login)
pub async fn find_active_user_by_email(pool: &Pool, email: &str) -> Result<Option<User>> {
    let conn = pool.get().await?;

    let sql = format!(
        "SELECT {} FROM users WHERE email = $1 AND is_active = true",
        USER_COLUMNS
    );

    conn.query_opt(&sql, &[&email])
        .await?
        .map(|row| parse_user_row(&row))
        .transpose()
}

/// True when any user, active or not, holds this email
pub async fn email_exists(pool: &Pool, email: &str) -> Result<bool> {
    let conn = pool.get().await?;
    let row = conn
        .query_one(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)",
            &[&email],
        )
        .await?;
    Ok(row.try_get(0)?)
}

pub async fn find_user_by_id(pool: &Pool, user_id: Uuid) -> Result<Option<User>> {
    let conn = pool.get().await?;

    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

    conn.query_opt(&sql, &[&user_id])
        .await?
        .map(|row| parse_user_row(&row))
        .transpose()
}

/// Stamp `last_login` after a successful password check
pub async fn record_login(pool: &Pool, user_id: Uuid) -> Result<()> {
    let conn = pool.get().await?;
    let updated = conn
        .execute("UPDATE users SET last_login = NOW() WHERE id = $1", &[&user_id])
        .await?;

    if updated == 0 {
        return Err(Error::NotFoundError(format!("user {}", user_id)));
    }
    Ok(())
}
