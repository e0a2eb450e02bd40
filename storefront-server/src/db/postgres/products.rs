use async_trait::async_trait;
use shared::models::{Product, ProductCreate};
use shared::util::now_millis;

use super::{PgStore, map_constraint};
use crate::db::{ProductRepository, StoreError};

#[async_trait]
impl ProductRepository for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as("SELECT * FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn create(
        &self,
        created_by: &str,
        products: &[ProductCreate],
    ) -> Result<Vec<Product>, StoreError> {
        let now = now_millis();
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(products.len());

        for new in products {
            let product: Product = sqlx::query_as(
                r#"
                INSERT INTO products (name, description, price, stock, created_by, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
                RETURNING *
                "#,
            )
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.price)
            .bind(new.stock)
            .bind(created_by)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_constraint(e, ("product", new.name.as_str()), 0))?;
            created.push(product);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn update(&self, product: &Product) -> Result<Product, StoreError> {
        let updated = sqlx::query_as(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, stock = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(now_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint(e, ("product", product.name.as_str()), product.id))?;

        updated.ok_or_else(|| StoreError::not_found("product", product.id))
    }
}
