use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    Json,
};
use super::AppState;
use crate::{
    dto::{SamplingPointCreate, Validate},
    ApiError,
};
use db::{
    models::SamplingPointRow,
    repository::{sampling_plans as plan_repo, sampling_points as point_repo},
};

/// `POST /sampling-plans/{id}/points` — the whole batch is stored or none of it.
pub async fn create(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<Vec<SamplingPointCreate>>, JsonRejection>,
) -> Result<Json<Vec<SamplingPointRow>>, ApiError> {
    let Path(plan_id) = path?;
    let Json(payload) = payload?;
    payload.validate().map_err(ApiError::Validation)?;

    let plan = plan_repo::get_sampling_plan(&state.pool, plan_id)
        .await?
        .ok_or(ApiError::NotFound("Sampling plan"))?;

    let points = payload.into_iter().map(Into::into).collect();
    let rows = point_repo::create_sampling_points(&state.pool, plan.id, points).await?;
    Ok(Json(rows))
}

pub async fn list(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SamplingPointRow>>, ApiError> {
    let Path(plan_id) = path?;
    Ok(Json(point_repo::list_sampling_points(&state.pool, plan_id).await?))
}
