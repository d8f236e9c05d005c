use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    Json,
};
use super::AppState;
use crate::{
    dto::{SamplingPlanCreate, Validate},
    ApiError,
};
use db::{
    models::SamplingPlanRow,
    repository::{fields as field_repo, sampling_plans as plan_repo},
};

/// `POST /fields/{id}/sampling-plans`
pub async fn create(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<SamplingPlanCreate>, JsonRejection>,
) -> Result<Json<SamplingPlanRow>, ApiError> {
    let Path(field_id) = path?;
    let Json(payload) = payload?;
    payload.validate().map_err(ApiError::Validation)?;

    let field = field_repo::get_field(&state.pool, field_id)
        .await?
        .ok_or(ApiError::NotFound("Field"))?;

    let plan = plan_repo::create_sampling_plan(&state.pool, field.id, payload.into()).await?;
    Ok(Json(plan))
}

/// `GET /fields/{id}/sampling-plans` — an unknown field simply has no plans.
pub async fn list(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SamplingPlanRow>>, ApiError> {
    let Path(field_id) = path?;
    Ok(Json(plan_repo::list_sampling_plans(&state.pool, field_id).await?))
}

pub async fn get(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<SamplingPlanRow>, ApiError> {
    let Path(id) = path?;
    match plan_repo::get_sampling_plan(&state.pool, id).await? {
        Some(plan) => Ok(Json(plan)),
        None => Err(ApiError::NotFound("Sampling plan")),
    }
}
