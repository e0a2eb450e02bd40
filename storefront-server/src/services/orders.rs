//! Order fulfillment engine
//!
//! `place_order` runs the whole item loop inside one [`FulfillmentTx`]:
//!
//! 1. lock the product row (missing ⇒ `ProductNotFound`)
//! 2. check `stock >= quantity` (otherwise `InsufficientStock`)
//! 3. snapshot the catalog price as the line's unit price
//! 4. add the line to the total (past [`MAX_ORDER_TOTAL`] ⇒ `OrderAmountTooLarge`)
//! 5. decrement and stage the stock (`StockUpdateFailed` on store error)
//!
//! then stages the order and commits. Any failure rolls back every stock
//! decrement made for the request, so no order ever exists without its
//! decrements and no decrement survives without its order.

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{MAX_ORDER_TOTAL, NewOrder, NewOrderLine, Order, OrderLineRequest, Product};
use thiserror::Error;

use crate::db::{FulfillmentTx, OrderRepository, StoreError};

/// Order placement failure
#[derive(Debug, Error)]
pub enum FulfillmentError {
    #[error("product {0} not found")]
    ProductNotFound(i64),

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i32,
        available: i32,
    },

    #[error("invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: i64, quantity: i32 },

    #[error("order amount too large at product {product_id}")]
    AmountTooLarge { product_id: i64 },

    #[error("order {0} not found")]
    OrderNotFound(i64),

    #[error("failed to update stock for product {product_id}: {source}")]
    StockUpdateFailed {
        product_id: i64,
        #[source]
        source: StoreError,
    },

    #[error("{operation} failed: {source}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl From<FulfillmentError> for AppError {
    fn from(err: FulfillmentError) -> Self {
        match err {
            FulfillmentError::ProductNotFound(id) => AppError::product_not_found(id),
            FulfillmentError::InsufficientStock {
                product_id,
                requested,
                available,
            } => AppError::insufficient_stock(product_id, requested, available),
            FulfillmentError::InvalidQuantity {
                product_id,
                quantity,
            } => AppError::invalid_quantity(product_id, quantity),
            FulfillmentError::AmountTooLarge { product_id } => {
                AppError::order_amount_too_large(product_id)
            }
            FulfillmentError::OrderNotFound(id) => AppError::order_not_found(id),
            FulfillmentError::StockUpdateFailed { product_id, .. } => {
                AppError::stock_update_failed(product_id)
            }
            FulfillmentError::Persistence {
                operation: "create_order",
                ..
            } => AppError::new(ErrorCode::OrderPersistFailed),
            FulfillmentError::Persistence { operation, .. } => {
                AppError::new(ErrorCode::DatabaseError).with_detail("operation", operation)
            }
        }
    }
}

/// Log a store failure with the operation it came from
fn persistence(operation: &'static str) -> impl FnOnce(StoreError) -> FulfillmentError {
    move |source| {
        tracing::error!(operation, error = %source, "Persistence failure");
        FulfillmentError::Persistence { operation, source }
    }
}

/// Order fulfillment engine
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Validate, price, reserve stock and persist an order for `user_id`
    ///
    /// An empty item list produces an order with no lines and a zero total.
    pub async fn place_order(
        &self,
        user_id: i64,
        items: &[OrderLineRequest],
    ) -> Result<Order, FulfillmentError> {
        if let Some(item) = items.iter().find(|item| item.quantity <= 0) {
            return Err(FulfillmentError::InvalidQuantity {
                product_id: item.product_id,
                quantity: item.quantity,
            });
        }

        let mut tx = self.orders.begin().await.map_err(persistence("begin"))?;

        match fulfil(tx.as_mut(), user_id, items).await {
            Ok(order) => {
                tx.commit().await.map_err(persistence("create_order"))?;
                tracing::info!(
                    order_id = order.id,
                    user_id,
                    lines = order.order_items.len(),
                    total = %order.total,
                    "Order placed"
                );
                Ok(order)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::error!(operation = "rollback", error = %rollback, "Persistence failure");
                }
                tracing::info!(user_id, error = %e, "Order rejected");
                Err(e)
            }
        }
    }

    /// All orders of `user_id` with their lines; empty when there are none
    pub async fn user_orders(&self, user_id: i64) -> Result<Vec<Order>, FulfillmentError> {
        self.orders
            .find_by_user(user_id)
            .await
            .map_err(persistence("list_orders"))
    }

    /// One order of `user_id`; another user's order reads as missing
    pub async fn user_order(
        &self,
        user_id: i64,
        order_id: i64,
    ) -> Result<Order, FulfillmentError> {
        self.user_orders(user_id)
            .await?
            .into_iter()
            .find(|order| order.id == order_id)
            .ok_or(FulfillmentError::OrderNotFound(order_id))
    }
}

async fn fulfil(
    tx: &mut dyn FulfillmentTx,
    user_id: i64,
    items: &[OrderLineRequest],
) -> Result<Order, FulfillmentError> {
    let mut total = Decimal::ZERO;
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let product = tx
            .lock_product(item.product_id)
            .await
            .map_err(persistence("lookup_product"))?
            .ok_or(FulfillmentError::ProductNotFound(item.product_id))?;

        if product.stock < item.quantity {
            return Err(FulfillmentError::InsufficientStock {
                product_id: product.id,
                requested: item.quantity,
                available: product.stock,
            });
        }

        let line = NewOrderLine {
            product_id: product.id,
            quantity: item.quantity,
            unit_price: product.price,
        };
        total = line
            .line_total()
            .and_then(|amount| total.checked_add(amount))
            .filter(|sum| *sum <= MAX_ORDER_TOTAL)
            .ok_or(FulfillmentError::AmountTooLarge {
                product_id: product.id,
            })?;

        let updated = Product {
            stock: product.stock - item.quantity,
            ..product
        };
        tx.update_product(&updated).await.map_err(|source| {
            tracing::error!(
                operation = "update_stock",
                product_id = updated.id,
                error = %source,
                "Persistence failure"
            );
            FulfillmentError::StockUpdateFailed {
                product_id: updated.id,
                source,
            }
        })?;

        lines.push(line);
    }

    tx.create_order(&NewOrder {
        user_id,
        total,
        lines,
    })
    .await
    .map_err(persistence("create_order"))
}
