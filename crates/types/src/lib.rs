//! Shared domain types for the kirana storefront: money, catalog entries,
//! orders and runtime configuration.

pub const MANIFEST_FILE_NAME: &str = "storefront.yaml";

pub mod amount;
pub mod catalog;
pub mod config;
pub mod orders;

pub use amount::{Amount, AmountParseError};
pub use catalog::Product;
pub use config::StorefrontConfig;
pub use orders::{CustomerDetails, Order, OrderItem, PaymentStatus};
