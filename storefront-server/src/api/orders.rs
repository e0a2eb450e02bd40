//! Order endpoints
//!
//! The owner of an order is always the authenticated caller; nothing in the
//! body can change it.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use http::StatusCode;
use shared::error::AppError;
use shared::models::{CreateOrderRequest, Order};

use super::{ApiResult, json_body};
use crate::auth::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list).post(create))
        .route("/api/orders/{id}", get(get_by_id))
}

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let req = json_body(payload)?;
    let owner = state.accounts.profile(&user.email).await?;
    let order = state.orders.place_order(owner.id, &req.order_items).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<Order>> {
    let owner = state.accounts.profile(&user.email).await?;
    Ok(Json(state.orders.user_orders(owner.id).await?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Order> {
    let Path(id) = id.map_err(|e| AppError::invalid_request(e.body_text()))?;
    let owner = state.accounts.profile(&user.email).await?;
    Ok(Json(state.orders.user_order(owner.id, id).await?))
}
