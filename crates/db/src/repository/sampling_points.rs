//! Sampling point operations.

use sqlx::types::Json;
use sqlx::SqlitePool;
use tracing::debug;

use crate::{
    DbError,
    models::{NewSamplingPoint, SamplingPointRow},
};

/// Insert a batch of points for one plan inside a single transaction.
///
/// Rows come back in the order they were given.  If any insert fails (for
/// example a repeated `point_index`) the transaction is rolled back on drop
/// and nothing from the batch is persisted.
pub async fn create_sampling_points(
    pool: &SqlitePool,
    plan_id: i64,
    points: Vec<NewSamplingPoint>,
) -> Result<Vec<SamplingPointRow>, DbError> {
    let mut tx = pool.begin().await?;
    let mut rows = Vec::with_capacity(points.len());

    for point in points {
        let row = sqlx::query_as::<_, SamplingPointRow>(
            r#"
            INSERT INTO sampling_points (sampling_plan_id, point_index, geometry_wkt, properties_json)
            VALUES ($1, $2, $3, $4)
            RETURNING id, sampling_plan_id, point_index, geometry_wkt, properties_json
            "#,
        )
        .bind(plan_id)
        .bind(point.point_index)
        .bind(point.geometry_wkt)
        .bind(point.properties_json.map(Json))
        .fetch_one(&mut *tx)
        .await?;
        rows.push(row);
    }

    tx.commit().await?;

    debug!(plan_id, count = rows.len(), "sampling points created");
    Ok(rows)
}

/// Return the points of one plan ordered by `point_index` ascending.
pub async fn list_sampling_points(
    pool: &SqlitePool,
    plan_id: i64,
) -> Result<Vec<SamplingPointRow>, DbError> {
    let rows = sqlx::query_as::<_, SamplingPointRow>(
        r#"
        SELECT id, sampling_plan_id, point_index, geometry_wkt, properties_json
        FROM sampling_points
        WHERE sampling_plan_id = $1
        ORDER BY point_index ASC
        "#,
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
