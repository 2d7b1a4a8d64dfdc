//! Registration and sign-in.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::user::{LoginRequest, RegisterRequest, TokenResponse};

use crate::app::AppState;
use crate::error::ApiError;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let token = state.users().register(request).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    Ok(Json(state.users().login(request).await?))
}
