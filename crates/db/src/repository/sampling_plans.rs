//! Sampling plan operations.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::{
    DbError,
    models::{NewSamplingPlan, SamplingPlanRow},
};

/// Insert a new sampling plan for `field_id`.
///
/// A second plan with the same name on the same field fails with a unique
/// violation.
pub async fn create_sampling_plan(
    pool: &SqlitePool,
    field_id: i64,
    new: NewSamplingPlan,
) -> Result<SamplingPlanRow, DbError> {
    let now = Utc::now();

    let row = sqlx::query_as::<_, SamplingPlanRow>(
        r#"
        INSERT INTO sampling_plans
            (field_id, name, grid_size_acres, grid_offset_x, grid_offset_y, numbering_method, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, field_id, name, grid_size_acres, grid_offset_x, grid_offset_y, numbering_method, created_at
        "#,
    )
    .bind(field_id)
    .bind(new.name)
    .bind(new.grid_size_acres)
    .bind(new.grid_offset_x)
    .bind(new.grid_offset_y)
    .bind(new.numbering_method)
    .bind(now)
    .fetch_one(pool)
    .await?;

    debug!(plan_id = row.id, field_id, "sampling plan created");
    Ok(row)
}

/// Return the plans of one field, newest first.
pub async fn list_sampling_plans(
    pool: &SqlitePool,
    field_id: i64,
) -> Result<Vec<SamplingPlanRow>, DbError> {
    let rows = sqlx::query_as::<_, SamplingPlanRow>(
        r#"
        SELECT id, field_id, name, grid_size_acres, grid_offset_x, grid_offset_y, numbering_method, created_at
        FROM sampling_plans
        WHERE field_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(field_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn get_sampling_plan(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<SamplingPlanRow>, DbError> {
    let row = sqlx::query_as::<_, SamplingPlanRow>(
        r#"
        SELECT id, field_id, name, grid_size_acres, grid_offset_x, grid_offset_y, numbering_method, created_at
        FROM sampling_plans
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
