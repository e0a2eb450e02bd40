//! Account service
//!
//! Registration, login, refresh and profile lookup. Every successful
//! registration, login or refresh replaces both stored tokens at once.

use std::sync::Arc;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{AuthResponse, LoginRequest, RegisterRequest, TokenPair, User};
use shared::util::normalize_email;

use crate::auth::password::MIN_PASSWORD_LEN;
use crate::auth::{JwtService, PasswordService};
use crate::db::{NewUser, StoreError, UserRepository};
use crate::security_log;

/// Log a store failure with its operation and map it to `code`
fn store_failure(operation: &'static str, code: ErrorCode) -> impl FnOnce(StoreError) -> AppError {
    move |source| {
        tracing::error!(operation, error = %source, "Persistence failure");
        AppError::new(code)
    }
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
    passwords: Arc<PasswordService>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt: Arc<JwtService>,
        passwords: Arc<PasswordService>,
    ) -> Self {
        Self {
            users,
            jwt,
            passwords,
        }
    }

    /// Create an identity and sign it in
    pub async fn register(&self, req: RegisterRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&req.email);
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::validation("A valid email is required"));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::new(ErrorCode::PasswordTooShort));
        }

        let password_hash = self.passwords.hash(&req.password).map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            AppError::internal("Failed to hash password")
        })?;

        let user = self
            .users
            .create(NewUser {
                username: req.username.trim().to_string(),
                email,
                password_hash,
            })
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    AppError::new(ErrorCode::EmailAlreadyRegistered)
                } else {
                    store_failure("create_user", ErrorCode::DatabaseError)(e)
                }
            })?;

        let (user, tokens) = self.sign_in(&user).await?;
        tracing::info!(user_id = user.id, "User registered");
        Ok(AuthResponse { user, tokens })
    }

    /// Verify credentials and issue a fresh token pair
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, req: LoginRequest) -> AppResult<TokenPair> {
        let email = normalize_email(&req.email);

        let Some(user) = self.find(&email).await? else {
            security_log!("WARN", "login_failed", reason = "unknown_email");
            return Err(AppError::invalid_credentials());
        };

        if !self.passwords.verify(&req.password, &user.password_hash) {
            security_log!("WARN", "login_failed", reason = "wrong_password", user_id = user.id);
            return Err(AppError::invalid_credentials());
        }

        if self.passwords.needs_rehash(&user.password_hash) {
            self.rehash(&user, &req.password).await;
        }

        let (user, tokens) = self.sign_in(&user).await?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(tokens)
    }

    /// Exchange a refresh token for a new pair
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.jwt.validate_refresh(refresh_token).map_err(|e| {
            security_log!("WARN", "refresh_rejected", reason = %e);
            AppError::invalid_or_expired_token()
        })?;

        let Some(user) = self.find(&claims.sub).await? else {
            security_log!("WARN", "refresh_rejected", reason = "unknown_subject");
            return Err(AppError::invalid_or_expired_token());
        };

        let (_, tokens) = self.sign_in(&user).await?;
        Ok(tokens)
    }

    /// Resolve the identity record behind an authenticated email
    pub async fn profile(&self, email: &str) -> AppResult<User> {
        self.find(email)
            .await?
            .ok_or_else(|| AppError::user_not_found(email))
    }

    async fn find(&self, email: &str) -> AppResult<Option<User>> {
        self.users
            .find_by_email(email)
            .await
            .map_err(store_failure("find_user", ErrorCode::DatabaseError))
    }

    async fn sign_in(&self, user: &User) -> AppResult<(User, TokenPair)> {
        let tokens = self.jwt.issue(&user.email).map_err(|e| {
            tracing::error!(error = %e, "Token issuance failed");
            AppError::internal("Failed to issue tokens")
        })?;

        let user = self
            .users
            .update_tokens(user.id, &tokens)
            .await
            .map_err(store_failure("update_token", ErrorCode::TokenUpdateFailed))?;

        Ok((user, tokens))
    }

    // Best effort: the login itself already succeeded.
    async fn rehash(&self, user: &User, password: &str) {
        let hash = match self.passwords.hash(password) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(user_id = user.id, error = %e, "Password rehash failed");
                return;
            }
        };
        match self.users.update_password_hash(user.id, &hash).await {
            Ok(()) => tracing::info!(user_id = user.id, "Password hash upgraded"),
            Err(e) => tracing::warn!(
                operation = "update_password_hash",
                user_id = user.id,
                error = %e,
                "Password rehash failed"
            ),
        }
    }
}
