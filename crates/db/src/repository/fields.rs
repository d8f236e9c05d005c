//! Field CRUD operations.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;
use tracing::debug;

use crate::{
    DbError,
    models::{FieldPatch, FieldRow, NewField},
};

/// Insert a new field.
///
/// `attributes_json` is stored verbatim; `group_id` may be absent.
pub async fn create_field(pool: &SqlitePool, new: NewField) -> Result<FieldRow, DbError> {
    let now = Utc::now();

    let row = sqlx::query_as::<_, FieldRow>(
        r#"
        INSERT INTO fields
            (user_id, group_id, field_name, geometry_wkt, source_file_name, attributes_json, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, user_id, group_id, field_name, geometry_wkt, source_file_name, attributes_json, created_at
        "#,
    )
    .bind(new.user_id)
    .bind(new.group_id)
    .bind(new.field_name)
    .bind(new.geometry_wkt)
    .bind(new.source_file_name)
    .bind(new.attributes_json.map(Json))
    .bind(now)
    .fetch_one(pool)
    .await?;

    debug!(field_id = row.id, user_id = row.user_id, "field created");
    Ok(row)
}

/// Return fields ordered by creation time (newest first), optionally only
/// those owned by `user_id`.
pub async fn list_fields(pool: &SqlitePool, user_id: Option<i64>) -> Result<Vec<FieldRow>, DbError> {
    let rows = sqlx::query_as::<_, FieldRow>(
        r#"
        SELECT id, user_id, group_id, field_name, geometry_wkt, source_file_name, attributes_json, created_at
        FROM fields
        WHERE ($1 IS NULL OR user_id = $1)
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch a single field by its primary key.
pub async fn get_field(pool: &SqlitePool, id: i64) -> Result<Option<FieldRow>, DbError> {
    let row = sqlx::query_as::<_, FieldRow>(
        r#"
        SELECT id, user_id, group_id, field_name, geometry_wkt, source_file_name, attributes_json, created_at
        FROM fields
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Apply `patch` on top of `existing` and write every mutable column back.
///
/// Returns `DbError::NotFound` if the row disappeared in the meantime.
pub async fn update_field(
    pool: &SqlitePool,
    existing: FieldRow,
    patch: FieldPatch,
) -> Result<FieldRow, DbError> {
    let mut field = existing;
    patch.apply(&mut field);

    let row = sqlx::query_as::<_, FieldRow>(
        r#"
        UPDATE fields
        SET group_id = $1, field_name = $2, geometry_wkt = $3, source_file_name = $4, attributes_json = $5
        WHERE id = $6
        RETURNING id, user_id, group_id, field_name, geometry_wkt, source_file_name, attributes_json, created_at
        "#,
    )
    .bind(field.group_id)
    .bind(field.field_name)
    .bind(field.geometry_wkt)
    .bind(field.source_file_name)
    .bind(field.attributes_json)
    .bind(field.id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Permanently delete a field by its primary key.
///
/// A field that still owns sampling plans cannot be deleted; the foreign key
/// refuses the statement and the error is returned unchanged.
/// Returns `DbError::NotFound` if no row was deleted.
pub async fn delete_field(pool: &SqlitePool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM fields WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    debug!(field_id = id, "field deleted");
    Ok(())
}
