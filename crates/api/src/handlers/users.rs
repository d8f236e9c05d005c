use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    Json,
};
use super::AppState;
use crate::{dto::UserCreate, ApiError};
use db::{models::UserRow, repository::users as user_repo};

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<UserCreate>, JsonRejection>,
) -> Result<Json<UserRow>, ApiError> {
    let Json(payload) = payload?;
    let user = user_repo::create_user(&state.pool, payload.into()).await?;
    Ok(Json(user))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserRow>>, ApiError> {
    Ok(Json(user_repo::list_users(&state.pool).await?))
}

pub async fn get(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<UserRow>, ApiError> {
    let Path(id) = path?;
    match user_repo::get_user(&state.pool, id).await? {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound("User")),
    }
}
