use axum::{
    extract::{rejection::{JsonRejection, PathRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::warn;
use super::{AppState, OwnerFilter};
use crate::{
    dto::{FieldCreate, FieldUpdate, Validate},
    ApiError,
};
use db::{models::FieldRow, repository::fields as field_repo};

pub async fn list(
    query: Result<Query<OwnerFilter>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<Vec<FieldRow>>, ApiError> {
    let Query(filter) = query?;
    Ok(Json(field_repo::list_fields(&state.pool, filter.user_id).await?))
}

pub async fn get(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<FieldRow>, ApiError> {
    let Path(id) = path?;
    match field_repo::get_field(&state.pool, id).await? {
        Some(field) => Ok(Json(field)),
        None => Err(ApiError::NotFound("Field")),
    }
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<FieldCreate>, JsonRejection>,
) -> Result<Json<FieldRow>, ApiError> {
    let Json(payload) = payload?;
    let field = field_repo::create_field(&state.pool, payload.into()).await?;
    Ok(Json(field))
}

pub async fn update(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<FieldUpdate>, JsonRejection>,
) -> Result<Json<FieldRow>, ApiError> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    payload.validate().map_err(ApiError::Validation)?;

    let existing = field_repo::get_field(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("Field"))?;

    let field = field_repo::update_field(&state.pool, existing, payload.into())
        .await
        .map_err(|e| ApiError::from_db(e, "Field"))?;
    Ok(Json(field))
}

pub async fn delete(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    match field_repo::delete_field(&state.pool, id).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(db::DbError::NotFound) => Err(ApiError::NotFound("Field")),
        Err(e) if e.is_foreign_key_violation() => {
            warn!(field_id = id, "refusing to delete field that still has sampling plans");
            Err(ApiError::Conflict("Field still has sampling plans".into()))
        }
        Err(e) => Err(e.into()),
    }
}
