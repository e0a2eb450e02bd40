//! Business services
//!
//! - [`OrderService`] - order fulfillment engine
//! - [`AccountService`] - registration, login, token refresh

pub mod accounts;
pub mod orders;

pub use accounts::AccountService;
pub use orders::{FulfillmentError, OrderService};
