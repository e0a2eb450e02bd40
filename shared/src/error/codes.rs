//! Unified error codes for the storefront backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order errors
//! - 6xxx: Product errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a bare `u16` so that clients can switch on it without
/// string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request (malformed body, bad parameters)
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// No Authorization header on a protected request
    AuthorizationRequired = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token failed signature, algorithm, type or expiry checks
    InvalidOrExpiredToken = 1004,
    /// Authorization header is not `Bearer <token>`
    MalformedAuthorizationHeader = 1008,
    /// Authenticated subject has no identity record
    UserNotFound = 1009,
    /// Email is already registered
    EmailAlreadyRegistered = 1010,
    /// Password is too short
    PasswordTooShort = 1011,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Requested quantity is not a positive integer
    InvalidQuantity = 4008,
    /// Order amount exceeds the range the store can represent
    OrderAmountTooLarge = 4009,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price
    ProductInvalidPrice = 6002,
    /// Requested quantity exceeds current stock
    InsufficientStock = 6003,
    /// Product name already exists
    ProductNameExists = 6004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Persisting a stock decrement failed
    StockUpdateFailed = 9004,
    /// Persisting the order aggregate failed
    OrderPersistFailed = 9005,
    /// Persisting freshly issued tokens failed
    TokenUpdateFailed = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::InvalidRequest => "Invalid request",

            Self::AuthorizationRequired => "Authorization header is required",
            Self::InvalidCredentials => "Invalid email or password",
            Self::InvalidOrExpiredToken => "Invalid or expired token",
            Self::MalformedAuthorizationHeader => "Invalid authorization header format",
            Self::UserNotFound => "User not found",
            Self::EmailAlreadyRegistered => "Email is already registered",
            Self::PasswordTooShort => "Password must be at least 8 characters",

            Self::OrderNotFound => "Order not found",
            Self::InvalidQuantity => "Quantity must be a positive integer",
            Self::OrderAmountTooLarge => "Order amount is too large",

            Self::ProductNotFound => "Product not found",
            Self::ProductInvalidPrice => "Product price must be between 0 and 9999999999.99 with at most 2 decimals",
            Self::InsufficientStock => "Insufficient stock",
            Self::ProductNameExists => "Product name already exists",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ConfigError => "Configuration error",
            Self::StockUpdateFailed => "Failed to update stock",
            Self::OrderPersistFailed => "Failed to create order",
            Self::TokenUpdateFailed => "Failed to update user token",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown `u16` into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            5 => Ok(Self::InvalidRequest),

            1001 => Ok(Self::AuthorizationRequired),
            1002 => Ok(Self::InvalidCredentials),
            1004 => Ok(Self::InvalidOrExpiredToken),
            1008 => Ok(Self::MalformedAuthorizationHeader),
            1009 => Ok(Self::UserNotFound),
            1010 => Ok(Self::EmailAlreadyRegistered),
            1011 => Ok(Self::PasswordTooShort),

            4001 => Ok(Self::OrderNotFound),
            4008 => Ok(Self::InvalidQuantity),
            4009 => Ok(Self::OrderAmountTooLarge),

            6001 => Ok(Self::ProductNotFound),
            6002 => Ok(Self::ProductInvalidPrice),
            6003 => Ok(Self::InsufficientStock),
            6004 => Ok(Self::ProductNameExists),

            9001 => Ok(Self::InternalError),
            9002 => Ok(Self::DatabaseError),
            9003 => Ok(Self::ConfigError),
            9004 => Ok(Self::StockUpdateFailed),
            9005 => Ok(Self::OrderPersistFailed),
            9006 => Ok(Self::TokenUpdateFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
