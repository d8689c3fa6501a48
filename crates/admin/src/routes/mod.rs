//! HTTP route handlers for the variations admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                  - Liveness check
//! GET  /health/ready                            - Readiness check (catalog ping)
//!
//! # Combinations of a parent product
//! GET    /api/products/{id}/combinations        - Visible combinations + child shop data
//! POST   /api/products/{id}/combinations        - Create/update combinations (one batch)
//! DELETE /api/products/{id}/combinations        - Delete by combination or SKU
//! GET    /api/products/{id}/variations          - Variables and values of the parent
//!
//! # Product-scoped attribute details
//! GET/POST /api/product-variations/variables/{id}
//! GET/POST /api/product-variations/values/{id}
//!
//! # Templates (global variables)
//! GET/POST/DELETE /api/variations               - List / upsert / delete by name
//! GET/POST /api/variations/variables/{id}
//! GET/POST /api/variations/values/{id}
//! ```

pub mod attributes;
pub mod combinations;
pub mod health;
pub mod templates;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the routes of a parent product.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/combinations",
            get(combinations::index)
                .post(combinations::save)
                .delete(combinations::delete),
        )
        .route("/{id}/variations", get(combinations::variations))
}

/// Create the product-scoped attribute detail routes.
pub fn product_variation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/variables/{id}",
            get(attributes::product_variable).post(attributes::update_product_variable),
        )
        .route(
            "/values/{id}",
            get(attributes::product_value).post(attributes::update_product_value),
        )
}

/// Create the template routes.
pub fn template_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(templates::index)
                .post(templates::upsert)
                .delete(templates::delete),
        )
        .route(
            "/variables/{id}",
            get(attributes::template_variable).post(attributes::update_template_variable),
        )
        .route(
            "/values/{id}",
            get(attributes::template_value).post(attributes::update_template_value),
        )
}

/// Create all routes for the variations admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/products", product_routes())
        .nest("/api/product-variations", product_variation_routes())
        .nest("/api/variations", template_routes())
}
