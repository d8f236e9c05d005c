//! API error type and its mapping onto HTTP responses.
//!
//! Every error body has the shape `{"detail": ...}`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use db::DbError;

/// One rejected request field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Dotted path into the request body, e.g. `grid_size_acres` or `[2].point_index`.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The named resource does not exist (`"Group"`, `"Sampling plan"`, …).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The body decoded but broke a field constraint.
    #[error("request validation failed")]
    Validation(Vec<FieldError>),

    /// The body could not be decoded at all.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl ApiError {
    /// Like `From<DbError>`, but a missing row is reported as `resource`.
    pub fn from_db(error: DbError, resource: &'static str) -> Self {
        match error {
            DbError::NotFound => Self::NotFound(resource),
            other => Self::Database(other),
        }
    }
}

macro_rules! impl_from_rejection {
    ($($rejection:ty),+ $(,)?) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    Self::Rejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )+
    };
}

impl_from_rejection!(JsonRejection, PathRejection, QueryRejection);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::NotFound(resource) => {
                (StatusCode::NOT_FOUND, json!(format!("{resource} not found")))
            }
            Self::Validation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, json!(errors)),
            Self::Rejected { status, message } => (status, json!(message)),
            Self::Conflict(message) => (StatusCode::CONFLICT, json!(message)),
            Self::Database(DbError::NotFound) => {
                (StatusCode::NOT_FOUND, json!("Resource not found"))
            }
            Self::Database(e) if e.is_foreign_key_violation() => (
                StatusCode::CONFLICT,
                json!("Referenced record does not exist or is still in use"),
            ),
            Self::Database(e) => {
                error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, json!("Internal Server Error"))
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
