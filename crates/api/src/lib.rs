//! `api` crate — HTTP REST API layer.
//!
//! Exposes:
//!   GET    /health
//!   POST   /users                         GET /users        GET /users/{id}
//!   POST   /groups                        GET /groups?user_id=
//!   GET    /groups/{id}                   PATCH /groups/{id}   DELETE /groups/{id}
//!   POST   /fields                        GET /fields?user_id=
//!   GET    /fields/{id}                   PATCH /fields/{id}   DELETE /fields/{id}
//!   POST   /fields/{id}/sampling-plans    GET /fields/{id}/sampling-plans
//!   GET    /sampling-plans/{id}
//!   POST   /sampling-plans/{id}/points    GET /sampling-plans/{id}/points
//!   POST   /sampling-plans/{id}/lab-uploads
//!   GET    /sampling-plans/{id}/lab-uploads

pub mod dto;
pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use db::DbPool;
use handlers::{fields, groups, health, lab_uploads, sampling_plans, sampling_points, users};

pub use error::{ApiError, FieldError};

/// Shared handler state.  Cloning is cheap: the pool is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Build the full router with request tracing attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/users", post(users::create).get(users::list))
        .route("/users/:id", get(users::get))
        .route("/groups", post(groups::create).get(groups::list))
        .route(
            "/groups/:id",
            get(groups::get).patch(groups::update).delete(groups::delete),
        )
        .route("/fields", post(fields::create).get(fields::list))
        .route(
            "/fields/:id",
            get(fields::get).patch(fields::update).delete(fields::delete),
        )
        .route(
            "/fields/:id/sampling-plans",
            post(sampling_plans::create).get(sampling_plans::list),
        )
        .route("/sampling-plans/:id", get(sampling_plans::get))
        .route(
            "/sampling-plans/:id/points",
            post(sampling_points::create).get(sampling_points::list),
        )
        .route(
            "/sampling-plans/:id/lab-uploads",
            post(lab_uploads::create).get(lab_uploads::list),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `bind` until Ctrl-C or SIGTERM, then close the pool.
pub async fn serve(bind: &str, pool: DbPool) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("API listening on {}", listener.local_addr()?);

    axum::serve(listener, router(AppState::new(pool.clone())))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing database pool");
    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod handlers_tests;
