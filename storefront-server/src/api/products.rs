//! Catalog endpoints

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use http::StatusCode;
use shared::error::{AppError, ErrorCode};
use shared::models::{Product, ProductCreate, is_valid_price};

use super::{ApiResult, json_body};
use crate::auth::CurrentUser;
use crate::db::StoreError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/{id}", get(get_by_id))
}

fn store_failure(operation: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |source| {
        tracing::error!(operation, error = %source, "Persistence failure");
        AppError::new(ErrorCode::DatabaseError)
    }
}

fn validate(product: &ProductCreate) -> Result<(), AppError> {
    if product.name.trim().is_empty() {
        return Err(AppError::validation("Product name is required"));
    }
    if !is_valid_price(product.price) {
        return Err(AppError::new(ErrorCode::ProductInvalidPrice)
            .with_detail("name", product.name.clone())
            .with_detail("price", product.price.to_string()));
    }
    if product.stock < 0 {
        return Err(AppError::validation("Product stock must not be negative")
            .with_detail("name", product.name.clone()));
    }
    Ok(())
}

/// GET /api/products
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Product>> {
    let products = state
        .products
        .list()
        .await
        .map_err(store_failure("list_products"))?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Product> {
    let Path(id) = id.map_err(|e| AppError::invalid_request(e.body_text()))?;
    state
        .products
        .find_by_id(id)
        .await
        .map_err(store_failure("lookup_product"))?
        .map(Json)
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::NotFound, format!("product with ID {id} not found"))
                .with_detail("product_id", id)
        })
}

/// POST /api/products
///
/// Bulk create; all products are created or none. The caller becomes the
/// `created_by` of each.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<Vec<ProductCreate>>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<Product>>), AppError> {
    let products = json_body(payload)?;
    for product in &products {
        validate(product)?;
    }

    let created = state
        .products
        .create(&user.email, &products)
        .await
        .map_err(|e| match e {
            StoreError::Conflict { key, .. } => {
                AppError::new(ErrorCode::ProductNameExists).with_detail("name", key)
            }
            other => store_failure("create_products")(other),
        })?;

    tracing::info!(count = created.len(), created_by = %user.email, "Products created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::MAX_PRICE;

    fn product(name: &str, price: Decimal, stock: i32) -> ProductCreate {
        ProductCreate {
            name: name.to_string(),
            description: String::new(),
            price,
            stock,
        }
    }

    #[test]
    fn test_validate() {
        assert!(validate(&product("widget", Decimal::ONE, 0)).is_ok());

        let err = validate(&product(" ", Decimal::ONE, 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = validate(&product("widget", Decimal::NEGATIVE_ONE, 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);

        let err = validate(&product("widget", Decimal::ONE, -1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_validate_price_range_and_scale() {
        assert!(validate(&product("top", MAX_PRICE, 1)).is_ok());

        for price in [
            MAX_PRICE + Decimal::new(1, 2),
            Decimal::from_i128_with_scale(10_i128.pow(28), 0),
            Decimal::new(1005, 3),
        ] {
            let err = validate(&product("widget", price, 1)).unwrap_err();
            assert_eq!(err.code, ErrorCode::ProductInvalidPrice, "{price}");
            assert_eq!(err.details.unwrap()["price"], price.to_string());
        }
    }
}
