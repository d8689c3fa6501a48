//! Product variations admin library.
//!
//! JSON API that reconciles a parent product's variation combinations with
//! concrete child products, and manages the global variation templates.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`db`] - Catalog repository traits with `PostgreSQL` and in-memory backends
//! - [`models`] - Products, variables, values and request/response shapes
//! - [`services`] - Combination reconciler, batch services and templates
//! - [`routes`] - axum handlers
//! - [`middleware`] - Request ID, shop scope and JSON body extractors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use state::AppState;

/// Build the application router with tracing and request ID layers.
///
/// Sentry layers are added by the binary so tests can drive this router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
