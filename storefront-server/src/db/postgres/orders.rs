use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{NewOrder, Order, OrderLine, Product};
use shared::util::now_millis;
use sqlx::{Postgres, Transaction};

use super::{PgStore, map_constraint};
use crate::db::{FulfillmentTx, OrderRepository, StoreError};

#[async_trait]
impl OrderRepository for PgStore {
    async fn begin(&self) -> Result<Box<dyn FulfillmentTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<(i64, i64, Decimal, i64)> = sqlx::query_as(
            "SELECT id, user_id, total, created_at FROM orders WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|row| row.0).collect();
        let lines: Vec<OrderLine> = sqlx::query_as(
            "SELECT * FROM order_lines WHERE order_id = ANY($1) ORDER BY order_id, id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
        for line in lines {
            by_order.entry(line.order_id).or_default().push(line);
        }

        Ok(rows
            .into_iter()
            .map(|(id, user_id, total, created_at)| Order {
                id,
                user_id,
                total,
                created_at,
                order_items: by_order.remove(&id).unwrap_or_default(),
            })
            .collect())
    }
}

/// Fulfillment transaction; product reads take a row lock (`FOR UPDATE`)
struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl FulfillmentTx for PgTx {
    async fn lock_product(&mut self, id: i64) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as("SELECT * FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(product)
    }

    async fn update_product(&mut self, product: &Product) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, stock = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(now_millis())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_constraint(e, ("product", product.name.as_str()), product.id))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("product", product.id));
        }
        Ok(())
    }

    async fn create_order(&mut self, order: &NewOrder) -> Result<Order, StoreError> {
        let created_at = now_millis();
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO orders (user_id, total, created_at) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(order.user_id)
        .bind(order.total)
        .bind(created_at)
        .fetch_one(&mut *self.tx)
        .await?;

        let mut order_items = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let line: OrderLine = sqlx::query_as(
                r#"
                INSERT INTO order_lines (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .fetch_one(&mut *self.tx)
            .await?;
            order_items.push(line);
        }

        Ok(Order {
            id,
            user_id: order.user_id,
            total: order.total,
            created_at,
            order_items,
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
