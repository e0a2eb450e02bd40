//! Persistence layer
//!
//! The services only see the repository traits below. Two stores implement
//! them: [`MemoryStore`] (development and tests) and [`PgStore`]
//! (PostgreSQL via sqlx).
//!
//! Order placement runs inside a [`FulfillmentTx`]: every product read is a
//! locking read, writes are staged, and nothing is visible to other callers
//! until [`FulfillmentTx::commit`]. Dropping a transaction without
//! committing discards its writes.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use shared::models::{NewOrder, Order, Product, ProductCreate, TokenPair, User};
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} {key} already exists")]
    Conflict { entity: &'static str, key: String },

    #[error("stock of product {0} cannot go negative")]
    NegativeStock(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn conflict(entity: &'static str, key: impl ToString) -> Self {
        Self::Conflict {
            entity,
            key: key.to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Fields needed to create an identity record
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Catalog access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError>;

    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    /// Create every product or none of them (duplicate names conflict)
    async fn create(
        &self,
        created_by: &str,
        products: &[ProductCreate],
    ) -> Result<Vec<Product>, StoreError>;

    /// Write the full record
    async fn update(&self, product: &Product) -> Result<Product, StoreError>;
}

/// Identity access
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the email is taken
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Replace both tokens in one write
    async fn update_tokens(&self, user_id: i64, tokens: &TokenPair) -> Result<User, StoreError>;

    async fn update_password_hash(&self, user_id: i64, hash: &str) -> Result<(), StoreError>;
}

/// Order access
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Open a fulfillment transaction
    async fn begin(&self) -> Result<Box<dyn FulfillmentTx>, StoreError>;

    /// All orders of a user with their lines, oldest first
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Order>, StoreError>;
}

/// Unit of work for one order placement
#[async_trait]
pub trait FulfillmentTx: Send {
    /// Read a product and hold it against concurrent fulfillments
    async fn lock_product(&mut self, id: i64) -> Result<Option<Product>, StoreError>;

    /// Stage the full product record
    async fn update_product(&mut self, product: &Product) -> Result<(), StoreError>;

    /// Stage the order aggregate; ids are assigned here
    async fn create_order(&mut self, order: &NewOrder) -> Result<Order, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
