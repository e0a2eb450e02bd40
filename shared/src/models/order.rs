//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest order total the orders table stores, `NUMERIC(24,2)`
pub const MAX_ORDER_TOTAL: Decimal =
    Decimal::from_parts(2_701_131_775, 466_537_709, 54_210, false, 2);

/// Requested line as supplied by the caller
///
/// Carries no price: unknown fields such as a client-side `unit_price`
/// are ignored during deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: i32,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub order_items: Vec<OrderLineRequest>,
}

/// Persisted order line
///
/// `unit_price` is the product price at order time and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

/// Line staged during fulfillment, before ids are assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderLine {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl NewOrderLine {
    /// `quantity × unit_price`, `None` when the product overflows
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Order aggregate ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: i64,
    pub total: Decimal,
    pub lines: Vec<NewOrderLine>,
}

/// Persisted order aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    /// Σ quantity × unit_price across `order_items`
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Unix millis
    pub created_at: i64,
    /// Insertion order
    pub order_items: Vec<OrderLine>,
}

impl Order {
    /// Recompute the total from the persisted lines
    pub fn lines_total(&self) -> Option<Decimal> {
        self.order_items.iter().try_fold(Decimal::ZERO, |acc, line| {
            acc.checked_add(line.unit_price.checked_mul(Decimal::from(line.quantity))?)
        })
    }
}
