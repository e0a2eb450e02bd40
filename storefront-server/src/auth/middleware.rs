//! Session gate
//!
//! Axum middleware guarding every protected route:
//!
//! | Condition | Error | Status |
//! |-----------|-------|--------|
//! | no `Authorization` header | `AuthorizationRequired` | 401 |
//! | header is not `Bearer <token>` | `MalformedAuthorizationHeader` | 401 |
//! | token fails validation | `InvalidOrExpiredToken` | 401 |
//!
//! On success the verified [`CurrentUser`] is inserted into the request
//! extensions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::{HeaderMap, Uri};
use shared::error::AppError;

use crate::auth::{CurrentUser, JwtService};
use crate::security_log;
use crate::state::AppState;

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // CORS preflight carries no credentials
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let user = authenticate(&state.jwt, req.headers(), req.uri())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Extract the token from an `Authorization` value
///
/// Exactly two whitespace-separated fields, the first being `bearer` in any
/// case.
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut fields = header.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

/// Run the three gate checks against request headers
pub(crate) fn authenticate(
    jwt: &JwtService,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<CurrentUser, AppError> {
    let Some(value) = headers.get(http::header::AUTHORIZATION) else {
        security_log!("WARN", "auth_missing", uri = %uri);
        return Err(AppError::authorization_required());
    };

    let Some(token) = value.to_str().ok().and_then(bearer_token) else {
        security_log!("WARN", "auth_malformed", uri = %uri);
        return Err(AppError::malformed_authorization_header());
    };

    match jwt.validate_access(token) {
        Ok(claims) => Ok(CurrentUser::from(claims)),
        Err(e) => {
            // The reason stays in the log; the caller gets one opaque error
            security_log!("WARN", "auth_failed", reason = %e, uri = %uri);
            Err(AppError::invalid_or_expired_token())
        }
    }
}
