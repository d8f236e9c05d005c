//! Lab upload records.
//!
//! Only metadata is stored; the uploaded file itself is never parsed here.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::{
    DbError,
    models::{LabUploadRow, NewLabUpload},
};

pub async fn create_lab_upload(
    pool: &SqlitePool,
    plan_id: i64,
    new: NewLabUpload,
) -> Result<LabUploadRow, DbError> {
    let row = sqlx::query_as::<_, LabUploadRow>(
        r#"
        INSERT INTO lab_uploads (sampling_plan_id, original_filename, mapping_json, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, sampling_plan_id, original_filename, mapping_json, created_at
        "#,
    )
    .bind(plan_id)
    .bind(new.original_filename)
    .bind(new.mapping_json.map(Json))
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Return the uploads of one plan, newest first.
pub async fn list_lab_uploads(
    pool: &SqlitePool,
    plan_id: i64,
) -> Result<Vec<LabUploadRow>, DbError> {
    let rows = sqlx::query_as::<_, LabUploadRow>(
        r#"
        SELECT id, sampling_plan_id, original_filename, mapping_json, created_at
        FROM lab_uploads
        WHERE sampling_plan_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
