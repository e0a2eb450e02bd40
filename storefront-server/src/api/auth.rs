//! Authentication endpoints: register, login, refresh, me

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use http::StatusCode;
use shared::error::AppError;
use shared::models::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPair, User};

use super::{ApiResult, json_body};
use crate::auth::CurrentUser;
use crate::state::AppState;

/// Public auth routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let req = json_body(payload)?;
    let response = state.accounts.register(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let req = json_body(payload)?;
    Ok(Json(state.accounts.login(req).await?))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let req = json_body(payload)?;
    Ok(Json(state.accounts.refresh(&req.refresh_token).await?))
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<User> {
    Ok(Json(state.accounts.profile(&user.email).await?))
}
