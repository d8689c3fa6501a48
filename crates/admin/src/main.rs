//! Product variations admin - JSON API for variation combinations.
//!
//! # Architecture
//!
//! - Axum web framework
//! - `PostgreSQL` catalog when a database URL is configured, otherwise an
//!   in-memory catalog (local runs and demos)
//! - Sentry for error tracking, tracing for structured logs
//!
//! Migrations are NOT run on startup. Run them via:
//! `cargo run -p product-variations-cli -- migrate`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::ServiceExt;
use axum::extract::Request;
use sentry::integrations::tracing as sentry_tracing;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use product_variations_admin::config::AdminConfig;
use product_variations_admin::db::{self, CatalogBackend, MemoryCatalog, PgCatalog};
use product_variations_admin::state::AppState;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load .env for local runs; real deployments set variables directly
    dotenvy::dotenv().ok();

    // Load configuration from environment (needed for Sentry init)
    let config = AdminConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "product_variations_admin=info,tower_http=debug".into());

    let json_layer = config
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!config.json_logs).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let backend: Arc<dyn CatalogBackend> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url)
                .await
                .expect("Failed to create database pool");
            tracing::info!("Database pool created");
            Arc::new(PgCatalog::new(pool))
        }
        None => {
            tracing::warn!("No database URL configured, using the in-memory catalog");
            Arc::new(MemoryCatalog::new())
        }
    };

    let addr = config.socket_addr();
    let state = AppState::new(config, backend);

    let app = product_variations_admin::app(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Trailing slashes must be trimmed before routing, so wrap the whole router
    let app = NormalizePathLayer::trim_trailing_slash().layer(app);

    tracing::info!("admin listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
