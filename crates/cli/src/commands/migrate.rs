//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! pv-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `VARIATIONS_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migrations live in `crates/admin/migrations/`.

use product_variations_admin::db;

use super::{CommandError, database_url};

/// Run the catalog migrations.
///
/// # Errors
///
/// Returns `CommandError` if the URL is missing, the database is unreachable
/// or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let url = database_url()?;

    tracing::info!("Connecting to catalog database...");
    let pool = db::create_pool(&url).await?;

    tracing::info!("Running catalog migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Catalog migrations complete!");
    Ok(())
}
