//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    ///
    /// Business-rule violations raised while fulfilling an order (unknown
    /// product, insufficient stock, bad quantity) are client errors and map
    /// to 400, not 404.
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::OrderNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::EmailAlreadyRegistered | Self::ProductNameExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::AuthorizationRequired
            | Self::InvalidCredentials
            | Self::InvalidOrExpiredToken
            | Self::MalformedAuthorizationHeader => StatusCode::UNAUTHORIZED,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::StockUpdateFailed
            | Self::OrderPersistFailed
            | Self::TokenUpdateFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
