//! Authentication
//!
//! - [`PasswordService`] - argon2id hashing and verification
//! - [`JwtService`] - access/refresh token issue and validation
//! - [`require_auth`] - session gate middleware
//! - [`CurrentUser`] - authenticated identity extractor

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, TokenType};
pub use middleware::{bearer_token, require_auth};
pub use password::{PasswordPolicy, PasswordService};
