//! Group CRUD operations.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::{
    DbError,
    models::{GroupPatch, GroupRow, NewGroup},
};

/// Insert a new group owned by `new.user_id`.
pub async fn create_group(pool: &SqlitePool, new: NewGroup) -> Result<GroupRow, DbError> {
    let now = Utc::now();

    let row = sqlx::query_as::<_, GroupRow>(
        r#"
        INSERT INTO "groups" (user_id, name, created_at)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, name, created_at
        "#,
    )
    .bind(new.user_id)
    .bind(new.name)
    .bind(now)
    .fetch_one(pool)
    .await?;

    debug!(group_id = row.id, user_id = row.user_id, "group created");
    Ok(row)
}

/// Return groups ordered by creation time (newest first), optionally only
/// those owned by `user_id`.
pub async fn list_groups(pool: &SqlitePool, user_id: Option<i64>) -> Result<Vec<GroupRow>, DbError> {
    let rows = sqlx::query_as::<_, GroupRow>(
        r#"
        SELECT id, user_id, name, created_at FROM "groups"
        WHERE ($1 IS NULL OR user_id = $1)
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch a single group by its primary key.
pub async fn get_group(pool: &SqlitePool, id: i64) -> Result<Option<GroupRow>, DbError> {
    let row = sqlx::query_as::<_, GroupRow>(
        r#"SELECT id, user_id, name, created_at FROM "groups" WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Apply `patch` on top of `existing` and write the result back.
///
/// Returns `DbError::NotFound` if the row disappeared in the meantime.
pub async fn update_group(
    pool: &SqlitePool,
    existing: GroupRow,
    patch: GroupPatch,
) -> Result<GroupRow, DbError> {
    let mut group = existing;
    patch.apply(&mut group);

    let row = sqlx::query_as::<_, GroupRow>(
        r#"
        UPDATE "groups" SET name = $1
        WHERE id = $2
        RETURNING id, user_id, name, created_at
        "#,
    )
    .bind(group.name)
    .bind(group.id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Permanently delete a group by its primary key.
///
/// Fields in the group are kept and detached (`group_id` becomes NULL).
/// Returns `DbError::NotFound` if no row was deleted.
pub async fn delete_group(pool: &SqlitePool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(r#"DELETE FROM "groups" WHERE id = $1"#)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    debug!(group_id = id, "group deleted");
    Ok(())
}
