use axum::{extract::State, http::StatusCode};

use crate::{models::api_response::ApiResponse, AppState};

pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, ApiResponse<()>) {
    match state.db.health().await {
        Ok(()) => (StatusCode::OK, ApiResponse::message("Goonj API is online")),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error("Database unreachable"),
            )
        }
    }
}
