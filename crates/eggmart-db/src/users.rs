//! Database operations for the `users` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The subset of `users` the auth middleware needs per request.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserAuthRow {
    pub id: i64,
    pub role: String,
}

/// Fetches the id and role for a user, or `None` if the user does not exist.
///
/// Used by the auth middleware to resolve a decoded token into an auth
/// context exactly once per request.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_user_auth(pool: &PgPool, user_id: i64) -> Result<Option<UserAuthRow>, DbError> {
    let row = sqlx::query_as::<_, UserAuthRow>("SELECT id, role FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Creates a user row and returns it. Used by seed tooling and tests.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a duplicate email).
pub async fn create_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    phone: Option<&str>,
    address: Option<&str>,
    role: &str,
) -> Result<UserRow, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (name, email, phone, address, role) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, public_id, name, email, phone, address, role, created_at, updated_at",
    )
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(address)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
