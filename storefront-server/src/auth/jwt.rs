//! JWT token service
//!
//! Issues HS256 access/refresh token pairs bound to an email subject and
//! validates them on the way back in. Every validation failure is reported
//! to callers as the same opaque outcome; the detailed [`JwtError`] is only
//! meant for server-side logs.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::models::TokenPair;
use thiserror::Error;

/// Lifetime applied when a configured TTL is absent, unparsable, not positive
/// or too long to yield a representable expiry
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 3600;

/// Minimum accepted secret length outside development
pub const MIN_SECRET_LEN: usize = 32;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC signing secret (at least 32 bytes in production)
    pub secret: String,
    /// Access token lifetime (minutes)
    pub access_ttl_minutes: i64,
    /// Refresh token lifetime (minutes)
    pub refresh_ttl_minutes: i64,
}

impl JwtConfig {
    /// Config with the default lifetimes
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            refresh_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        }
    }
}

/// Parse a TTL in minutes, falling back to [`DEFAULT_TOKEN_TTL_MINUTES`]
pub fn parse_ttl_minutes(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|minutes| *minutes > 0)
        .filter(|minutes| expiry_after(Utc::now(), *minutes).is_some())
        .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES)
}

/// `now + minutes`, `None` when either step leaves chrono's range
fn expiry_after(now: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    Duration::try_minutes(minutes).and_then(|ttl| now.checked_add_signed(ttl))
}

/// Generate a printable random secret (development only)
pub fn generate_printable_secret() -> String {
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?";

    let mut rng = rand::thread_rng();
    (0..64)
        .map(|_| ALLOWED[rng.gen_range(0..ALLOWED.len())] as char)
        .collect()
}

/// Token kind carried in the `token_type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (normalized email)
    pub sub: String,
    /// Token kind
    pub token_type: TokenType,
    /// Expiration timestamp (seconds)
    pub exp: i64,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
}

/// JWT error
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("unexpected signing algorithm")]
    InvalidAlgorithm,

    #[error("expected {expected} token, got {found}")]
    WrongTokenType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT token service
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_ttl_minutes", &self.config.access_ttl_minutes)
            .field("refresh_ttl_minutes", &self.config.refresh_ttl_minutes)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Issue an access/refresh pair for `email`
    pub fn issue(&self, email: &str) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            token: self.sign(email, TokenType::Access)?,
            refresh_token: self.sign(email, TokenType::Refresh)?,
        })
    }

    fn sign(&self, email: &str, token_type: TokenType) -> Result<String, JwtError> {
        let ttl = match token_type {
            TokenType::Access => self.config.access_ttl_minutes,
            TokenType::Refresh => self.config.refresh_ttl_minutes,
        };
        let now = Utc::now();
        let exp = expiry_after(now, ttl).ok_or_else(|| {
            JwtError::GenerationFailed(format!(
                "{} token lifetime of {ttl} minutes is out of range",
                token_type.as_str()
            ))
        })?;
        let claims = Claims {
            sub: email.to_string(),
            token_type,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate an access token (the only kind the session gate accepts)
    pub fn validate_access(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, TokenType::Access)
    }

    /// Validate a refresh token
    pub fn validate_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, TokenType::Refresh)
    }

    /// Verify signature, algorithm family, expiry and token kind
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &Self::validation()).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                    ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                    ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                        JwtError::InvalidAlgorithm
                    }
                    _ => JwtError::InvalidToken(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType {
                expected: expected.as_str(),
                found: claims.token_type.as_str(),
            });
        }
        Ok(claims)
    }

    // Symmetric HMAC family only; anything else (RS*, ES*, none) is refused.
    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);
        validation
    }
}

/// Authenticated identity resolved by the session gate
///
/// Handlers take it as an extractor; it only ever comes from a verified
/// access token, never from the request body.
///
/// ```ignore
/// async fn handler(user: CurrentUser) -> AppResult<Json<Vec<Order>>> {
///     orders.user_orders(&user.email).await
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Normalized email embedded at issuance
    pub email: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self { email: claims.sub }
    }
}
