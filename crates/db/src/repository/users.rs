//! User records.
//!
//! Users exist so that groups and fields have an owner to reference; there
//! is no login flow behind them.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    DbError,
    models::{NewUser, UserRow},
};

/// Insert a new user.  A duplicate email fails with a unique violation.
pub async fn create_user(pool: &SqlitePool, new: NewUser) -> Result<UserRow, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (email, hashed_password, verified, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, email, hashed_password, verified, created_at
        "#,
    )
    .bind(new.email)
    .bind(new.hashed_password)
    .bind(new.verified)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"SELECT id, email, hashed_password, verified, created_at FROM users WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Return all users ordered by creation time (newest first).
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<UserRow>, DbError> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, email, hashed_password, verified, created_at FROM users
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
