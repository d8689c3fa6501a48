//! Integration tests for product variations.
//!
//! The tests drive the admin router in-process against the in-memory
//! catalog, so they need no database or running server:
//!
//! ```bash
//! cargo test -p product-variations-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `combinations` - Reconciling, listing and deleting combinations
//! - `templates` - Template upsert/delete and attribute detail views

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header::CONTENT_TYPE};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use product_variations_admin::config::{AdminConfig, Language, VariationSettings};
use product_variations_admin::db::{CatalogBackend, MemoryCatalog};
use product_variations_admin::models::{InheritedAttributes, Product, Supplier};
use product_variations_admin::state::AppState;
use product_variations_core::{ShopId, Sku};

/// Shop every fixture product is attached to.
pub const SHOP: ShopId = ShopId::new(1);

/// A router over a seeded in-memory catalog.
pub struct TestContext {
    pub catalog: MemoryCatalog,
    pub app: Router,
    pub supplier: Supplier,
    pub parent: Product,
}

impl TestContext {
    /// Catalog with one stock-managed supplier and a parent product "Shirt"
    /// (SKU `shirt`) sold in [`SHOP`].
    ///
    /// # Panics
    ///
    /// Panics if seeding the in-memory catalog fails.
    pub async fn new() -> Self {
        let catalog = MemoryCatalog::new();
        let supplier = catalog
            .insert_supplier("Main warehouse", true)
            .await
            .expect("seed supplier");
        let parent = catalog
            .insert_product(
                "Shirt",
                Sku::parse("shirt").expect("valid sku"),
                InheritedAttributes::default(),
            )
            .await
            .expect("seed parent");
        catalog
            .attach_shop_product(SHOP, parent.id, Some(Decimal::from(10)), &[supplier.id])
            .await
            .expect("seed shop product");

        let mut settings = VariationSettings::single_language("en", "English");
        settings.languages.push(Language {
            code: "fi".to_string(),
            name: "Finnish".to_string(),
        });
        let backend: Arc<dyn CatalogBackend> = Arc::new(catalog.clone());
        let state = AppState::new(AdminConfig::for_memory(settings), backend);

        Self {
            catalog,
            app: product_variations_admin::app(state),
            supplier,
            parent,
        }
    }

    /// Path of the parent's combinations endpoint.
    #[must_use]
    pub fn combinations_path(&self) -> String {
        format!("/api/products/{}/combinations", self.parent.id)
    }

    /// Send a request and decode the JSON response.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body is not JSON.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send_request(builder.body(body).expect("valid request"))
            .await
    }

    /// Send a prepared request and decode the JSON response.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body is not JSON.
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("readable body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }
}
