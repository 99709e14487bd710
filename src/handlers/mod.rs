// Handlers module
// HTTP handlers for the REST API

pub mod users;

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::error;

use crate::db::Database;

/// Liveness probe. Answers 200 unconditionally; it only signals that the
/// process is running, not that dependencies are reachable.
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness probe. Runs a trivial query against the pool so that
/// orchestrators stop routing traffic here while the database is down.
pub async fn readiness_check(State(db): State<Arc<Database>>) -> impl IntoResponse {
    match db.ping().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "not-ready")
        }
    }
}
