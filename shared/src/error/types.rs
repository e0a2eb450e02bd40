//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// Every error crossing the HTTP boundary ends up here. `details` carries
/// machine-readable context such as the offending `product_id`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create an invalid request error (malformed body)
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Missing `Authorization` header
    pub fn authorization_required() -> Self {
        Self::new(ErrorCode::AuthorizationRequired)
    }

    /// `Authorization` header is not `Bearer <token>`
    pub fn malformed_authorization_header() -> Self {
        Self::new(ErrorCode::MalformedAuthorizationHeader)
    }

    /// Any token verification failure, deliberately without the reason
    pub fn invalid_or_expired_token() -> Self {
        Self::new(ErrorCode::InvalidOrExpiredToken)
    }

    /// Unknown email or wrong password
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    /// Authenticated subject without an identity record
    pub fn user_not_found(email: impl Into<String>) -> Self {
        Self::new(ErrorCode::UserNotFound).with_detail("email", email.into())
    }

    /// Product referenced by id does not exist
    pub fn product_not_found(product_id: i64) -> Self {
        Self::with_message(
            ErrorCode::ProductNotFound,
            format!("product with ID {product_id} not found"),
        )
        .with_detail("product_id", product_id)
    }

    /// Requested quantity exceeds current stock
    pub fn insufficient_stock(product_id: i64, requested: i32, available: i32) -> Self {
        Self::with_message(
            ErrorCode::InsufficientStock,
            format!("insufficient stock for product ID {product_id}"),
        )
        .with_detail("product_id", product_id)
        .with_detail("requested", requested)
        .with_detail("available", available)
    }

    /// Requested quantity is zero or negative
    pub fn invalid_quantity(product_id: i64, quantity: i32) -> Self {
        Self::with_message(
            ErrorCode::InvalidQuantity,
            format!("invalid quantity {quantity} for product ID {product_id}"),
        )
        .with_detail("product_id", product_id)
        .with_detail("quantity", quantity)
    }

    /// Persisting a stock decrement failed
    pub fn stock_update_failed(product_id: i64) -> Self {
        Self::with_message(
            ErrorCode::StockUpdateFailed,
            format!("failed to update stock for product ID {product_id}"),
        )
        .with_detail("product_id", product_id)
    }

    /// Line or running total left the representable money range
    pub fn order_amount_too_large(product_id: i64) -> Self {
        Self::with_message(
            ErrorCode::OrderAmountTooLarge,
            format!("order amount too large at product ID {product_id}"),
        )
        .with_detail("product_id", product_id)
    }

    /// Order missing, or owned by another user
    pub fn order_not_found(order_id: i64) -> Self {
        Self::with_message(
            ErrorCode::OrderNotFound,
            format!("order with ID {order_id} not found"),
        )
        .with_detail("order_id", order_id)
    }

    /// Startup configuration is missing or invalid
    pub fn config(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ConfigError, msg)
    }
}

/// Error envelope returned to clients
///
/// - `code`: Error code
/// - `message`: Human-readable message
/// - `details`: Additional error details, when the error carries any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Non-zero error code
    pub code: u16,
    /// Human-readable message
    pub message: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl ApiResponse {
    /// Create an error response from an AppError
    pub fn error(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::error(&self);

        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        (status, Json(body)).into_response()
    }
}
