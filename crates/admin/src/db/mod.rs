//! Catalog persistence for the variations admin.
//!
//! # Backends
//!
//! - [`PgCatalog`] - `PostgreSQL`, used when a database URL is configured
//! - [`MemoryCatalog`] - process memory, used by tests and local runs
//!
//! Both implement [`CatalogBackend`], whose transactions expose the
//! [`ProductRepository`], [`StockLedger`] and [`VariationStore`] traits.
//!
//! ## Tables
//!
//! - `products` - Parents and variation children (soft-deleted rows kept)
//! - `shop_products`, `shop_product_suppliers` - Per-shop price and suppliers
//! - `suppliers`, `stock_counts`, `stock_adjustments` - Stock ledger
//! - `variation_variables`, `variation_values` (+ `*_translations`) - Variables
//!   and values; a NULL `product_id` marks a template variable
//! - `product_variation_results` - Combination hash to child links
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p product-variations-cli -- migrate
//! ```

pub mod catalog;
pub mod memory;
pub mod postgres;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catalog::{CatalogBackend, CatalogTx, ProductRepository, StockLedger, VariationStore};
pub use memory::MemoryCatalog;
pub use postgres::PgCatalog;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., live SKU already taken).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
