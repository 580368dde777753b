//! Transformation module.
//!
//! Turns classified Bind records into target rows and loads them:
//! - Coerce: lenient field access over raw records
//! - Clients / Products / Orders: per-category selection and mapping
//! - Pipeline: end-to-end load against a record store

pub mod clients;
pub mod coerce;
pub mod orders;
pub mod pipeline;
pub mod products;

pub use clients::{client_mapping, select_clients};
pub use orders::{group_by_status, select_orders, to_order};
pub use pipeline::*;
pub use products::{product_mapping, select_products, to_product};
