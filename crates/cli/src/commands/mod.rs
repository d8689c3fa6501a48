//! CLI command implementations.

pub mod migrate;
pub mod populate;

use secrecy::SecretString;

/// Errors shared by commands that talk to the catalog database.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] product_variations_admin::config::ConfigError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Service error.
    #[error("{0}")]
    Variation(#[from] product_variations_admin::services::VariationError),
}

/// Database URL from `VARIATIONS_DATABASE_URL`, falling back to `DATABASE_URL`.
pub fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("VARIATIONS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("VARIATIONS_DATABASE_URL"))
}
