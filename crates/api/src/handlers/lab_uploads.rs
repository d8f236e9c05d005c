use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    Json,
};
use super::AppState;
use crate::{dto::LabUploadCreate, ApiError};
use db::{
    models::LabUploadRow,
    repository::{lab_uploads as upload_repo, sampling_plans as plan_repo},
};

pub async fn create(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<LabUploadCreate>, JsonRejection>,
) -> Result<Json<LabUploadRow>, ApiError> {
    let Path(plan_id) = path?;
    let Json(payload) = payload?;

    let plan = plan_repo::get_sampling_plan(&state.pool, plan_id)
        .await?
        .ok_or(ApiError::NotFound("Sampling plan"))?;

    let upload = upload_repo::create_lab_upload(&state.pool, plan.id, payload.into()).await?;
    Ok(Json(upload))
}

pub async fn list(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<Vec<LabUploadRow>>, ApiError> {
    let Path(plan_id) = path?;
    Ok(Json(upload_repo::list_lab_uploads(&state.pool, plan_id).await?))
}
