//! PostgreSQL store
//!
//! Plain `sqlx::query`/`query_as` with bound parameters. Schema lives in
//! `migrations/` and is applied on connect.

mod orders;
mod products;
mod users;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::StoreError;

/// PostgreSQL implementation of every repository
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and run pending migrations
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map constraint violations onto store errors
///
/// `unique` names the entity/key reported on a unique violation; a CHECK
/// violation can only come from `products.stock >= 0`.
fn map_constraint(err: sqlx::Error, unique: (&'static str, &str), product_id: i64) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::conflict(unique.0, unique.1);
        }
        if db.is_check_violation() {
            return StoreError::NegativeStock(product_id);
        }
    }
    StoreError::Database(err)
}
