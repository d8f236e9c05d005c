use axum::{
    extract::{rejection::{JsonRejection, PathRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use super::{AppState, OwnerFilter};
use crate::{
    dto::{GroupCreate, GroupUpdate},
    ApiError,
};
use db::{models::GroupRow, repository::groups as group_repo};

pub async fn list(
    query: Result<Query<OwnerFilter>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<Vec<GroupRow>>, ApiError> {
    let Query(filter) = query?;
    Ok(Json(group_repo::list_groups(&state.pool, filter.user_id).await?))
}

pub async fn get(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<GroupRow>, ApiError> {
    let Path(id) = path?;
    match group_repo::get_group(&state.pool, id).await? {
        Some(group) => Ok(Json(group)),
        None => Err(ApiError::NotFound("Group")),
    }
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<GroupCreate>, JsonRejection>,
) -> Result<Json<GroupRow>, ApiError> {
    let Json(payload) = payload?;
    let group = group_repo::create_group(&state.pool, payload.into()).await?;
    Ok(Json(group))
}

pub async fn update(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<GroupUpdate>, JsonRejection>,
) -> Result<Json<GroupRow>, ApiError> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let existing = group_repo::get_group(&state.pool, id)
        .await?
        .ok_or(ApiError::NotFound("Group"))?;

    let group = group_repo::update_group(&state.pool, existing, payload.into())
        .await
        .map_err(|e| ApiError::from_db(e, "Group"))?;
    Ok(Json(group))
}

pub async fn delete(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    match group_repo::delete_group(&state.pool, id).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(db::DbError::NotFound) => Err(ApiError::NotFound("Group")),
        Err(e) => Err(e.into()),
    }
}
