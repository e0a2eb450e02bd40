//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest accepted unit price, 9 999 999 999.99 (`NUMERIC(12,2)`)
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Prices carry at most cents
pub const PRICE_SCALE: u32 = 2;

/// Whether `price` fits the catalog column: non-negative, at most
/// [`MAX_PRICE`], at most [`PRICE_SCALE`] fractional digits.
pub fn is_valid_price(price: Decimal) -> bool {
    !price.is_sign_negative() && price <= MAX_PRICE && price.normalize().scale() <= PRICE_SCALE
}

/// Product entity
///
/// `price` is authoritative: orders read it, callers never supply it.
/// `stock` never drops below zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Unit price in currency unit
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i32,
    /// Email of the account that created the product
    pub created_by: String,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i32,
}
