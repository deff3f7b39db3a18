//! Core storefront service: the HTTP API, the orders store, and callback
//! reconciliation against the payment gateway.

pub mod api;
pub mod db;
pub mod reconcile;
