//! Authentication HTTP handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::services::auth::{
    AuthService, AuthTokens, LoginInput, RegisterAdminInput, RegisterResponse,
};
use crate::AppState;

/// Register a new farm admin
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterAdminInput>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let service = AuthService::new(state.db, &state.config);
    let response = service.register_admin(input).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Admin login
pub async fn login_admin(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.login_admin(input).await?;
    Ok(Json(tokens))
}

/// Worker login
pub async fn login_worker(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.login_worker(input).await?;
    Ok(Json(tokens))
}

/// Customer login
pub async fn login_customer(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.login_customer(input).await?;
    Ok(Json(tokens))
}
