//! Shared types for the storefront backend
//!
//! Wire-level types used by the server and its clients: the unified error
//! system, response envelope, and domain models.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
