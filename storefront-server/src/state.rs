//! Shared application state

use std::sync::Arc;

use shared::error::AppError;

use crate::auth::{JwtService, PasswordService};
use crate::config::Config;
use crate::db::{MemoryStore, OrderRepository, PgStore, ProductRepository, UserRepository};
use crate::services::{AccountService, OrderService};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Token issuer/validator (used by the session gate)
    pub jwt: Arc<JwtService>,
    /// Registration, login, refresh, profile
    pub accounts: AccountService,
    /// Order fulfillment engine
    pub orders: OrderService,
    /// Catalog
    pub products: Arc<dyn ProductRepository>,
}

impl AppState {
    /// Build the state from configuration
    ///
    /// Connects to PostgreSQL when `DATABASE_URL` is set, otherwise falls
    /// back to the in-memory store.
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let jwt = JwtService::with_config(config.jwt.clone());
        let passwords = PasswordService::new(config.password)
            .map_err(|e| AppError::config(format!("invalid argon2 parameters: {e}")))?;

        let state = match &config.database_url {
            Some(url) => {
                let store = Arc::new(PgStore::connect(url, config.database_max_connections).await?);
                tracing::info!("Using PostgreSQL store");
                Self::from_parts(store.clone(), store.clone(), store, jwt, passwords)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory store");
                Self::in_memory(jwt, passwords)
            }
        };
        Ok(state)
    }

    /// State over a fresh [`MemoryStore`]
    pub fn in_memory(jwt: JwtService, passwords: PasswordService) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(store.clone(), store.clone(), store, jwt, passwords)
    }

    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        jwt: JwtService,
        passwords: PasswordService,
    ) -> Self {
        let jwt = Arc::new(jwt);
        Self {
            accounts: AccountService::new(users, jwt.clone(), Arc::new(passwords)),
            orders: OrderService::new(orders),
            products,
            jwt,
        }
    }
}
