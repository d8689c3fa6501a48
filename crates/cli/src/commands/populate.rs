//! Template population command.
//!
//! Copies the names of every product-scoped variable and value into the
//! global templates so merchants can reuse them. Safe to run repeatedly.
//!
//! # Usage
//!
//! ```bash
//! pv-cli populate-variations
//! ```

use std::sync::Arc;

use product_variations_admin::config::AdminConfig;
use product_variations_admin::db::{self, PgCatalog};
use product_variations_admin::services::TemplateService;

use super::{CommandError, database_url};

/// Populate the variation templates from product-scoped variables.
///
/// # Errors
///
/// Returns `CommandError` if configuration or the database fails.
pub async fn run() -> Result<(), CommandError> {
    let url = database_url()?;
    let config = AdminConfig::from_env()?;

    tracing::info!("Connecting to catalog database...");
    let pool = db::create_pool(&url).await?;

    let service = TemplateService::new(Arc::new(PgCatalog::new(pool)), config.variations);
    let summary = service.populate_templates().await?;

    tracing::info!(
        variables_created = summary.variables_created,
        values_created = summary.values_created,
        "Variation templates populated"
    );
    Ok(())
}
