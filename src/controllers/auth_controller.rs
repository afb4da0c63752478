use axum::{extract::State, http::StatusCode};

use crate::{
    auth::models::{AuthResponse, LoginPayload, RegisterPayload},
    extract::AppJson,
    models::api_response::ApiResponse,
    services::auth_service::AuthService,
    AppState, Result,
};

pub async fn register_handler(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterPayload>,
) -> Result<(StatusCode, ApiResponse<AuthResponse>)> {
    let auth = AuthService::register_user(&state.db, &state.auth_config, payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(auth)))
}

pub async fn login_handler(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<(StatusCode, ApiResponse<AuthResponse>)> {
    let auth = AuthService::login_user(&state.db, &state.auth_config, payload).await?;
    Ok((StatusCode::OK, ApiResponse::success(auth)))
}
