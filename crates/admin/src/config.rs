//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `VARIATIONS_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; when neither is set the in-memory catalog is used)
//! - `VARIATIONS_HOST` - Bind address (default: 127.0.0.1)
//! - `VARIATIONS_PORT` - Listen port (default: 3002)
//! - `VARIATIONS_DEFAULT_SHOP_ID` - Shop used when a request has no `X-Shop-Id` (default: 1)
//! - `VARIATIONS_LANGUAGES` - Comma separated `code:Name` pairs (default: `en:English`)
//! - `VARIATIONS_DEFAULT_LANGUAGE` - Language for names and lookups (default: first language)
//! - `VARIATIONS_MAX_VARIABLES` - Variables allowed per product (default: 3)
//! - `VARIATIONS_MAX_VARIABLE_VALUES` - Values allowed per variable (default: 10)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use product_variations_core::ShopId;

const DEFAULT_LANGUAGES: &str = "en:English";
const DEFAULT_MAX_VARIABLES: usize = 3;
const DEFAULT_MAX_VARIABLE_VALUES: usize = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shop used when a request does not name one
    pub default_shop_id: ShopId,
    /// Variation rules shared by every handler
    pub variations: VariationSettings,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// A configured display language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// Language code (e.g. `en`, `fi`).
    pub code: String,
    /// Human readable name (e.g. `English`).
    pub name: String,
}

/// Rules for variation variables, values and their translations.
#[derive(Debug, Clone)]
pub struct VariationSettings {
    /// Every language a variable or value name can be translated to.
    pub languages: Vec<Language>,
    /// Language used to match submitted names and to render listings.
    pub default_language: String,
    /// Maximum number of variables a product may define.
    pub max_variables: usize,
    /// Maximum number of values a single variable may define.
    pub max_variable_values: usize,
}

impl VariationSettings {
    /// Returns true if `code` is one of the configured languages.
    #[must_use]
    pub fn has_language(&self, code: &str) -> bool {
        self.languages.iter().any(|language| language.code == code)
    }

    /// Settings for a single-language deployment with default limits.
    #[must_use]
    pub fn single_language(code: &str, name: &str) -> Self {
        Self {
            languages: vec![Language {
                code: code.to_string(),
                name: name.to_string(),
            }],
            default_language: code.to_string(),
            max_variables: DEFAULT_MAX_VARIABLES,
            max_variable_values: DEFAULT_MAX_VARIABLE_VALUES,
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        let languages = parse_languages(&get_env_or_default("VARIATIONS_LANGUAGES", DEFAULT_LANGUAGES))
            .map_err(|e| ConfigError::InvalidEnvVar("VARIATIONS_LANGUAGES".to_string(), e))?;

        let default_language = match get_optional_env("VARIATIONS_DEFAULT_LANGUAGE") {
            Some(code) => code,
            None => languages
                .first()
                .map(|language| language.code.clone())
                .ok_or_else(|| ConfigError::MissingEnvVar("VARIATIONS_LANGUAGES".to_string()))?,
        };

        let max_variables = parse_limit("VARIATIONS_MAX_VARIABLES", DEFAULT_MAX_VARIABLES)?;
        let max_variable_values =
            parse_limit("VARIATIONS_MAX_VARIABLE_VALUES", DEFAULT_MAX_VARIABLE_VALUES)?;

        let settings = Self {
            languages,
            default_language,
            max_variables,
            max_variable_values,
        };

        if !settings.has_language(&settings.default_language) {
            return Err(ConfigError::InvalidEnvVar(
                "VARIATIONS_DEFAULT_LANGUAGE".to_string(),
                format!(
                    "'{}' is not listed in VARIATIONS_LANGUAGES",
                    settings.default_language
                ),
            ));
        }

        Ok(settings)
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed, or
    /// if the default language is not one of the configured languages.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("VARIATIONS_DATABASE_URL");
        let host = get_env_or_default("VARIATIONS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("VARIATIONS_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("VARIATIONS_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("VARIATIONS_PORT".to_string(), e.to_string()))?;
        let default_shop_id = get_env_or_default("VARIATIONS_DEFAULT_SHOP_ID", "1")
            .parse::<i32>()
            .map(ShopId::new)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("VARIATIONS_DEFAULT_SHOP_ID".to_string(), e.to_string())
            })?;
        let variations = VariationSettings::from_env()?;
        let json_logs = get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            default_shop_id,
            variations,
            json_logs,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration for tests and local tooling: in-memory catalog, shop 1.
    #[must_use]
    pub fn for_memory(variations: VariationSettings) -> Self {
        Self {
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3002,
            default_shop_id: ShopId::new(1),
            variations,
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse `code:Name` pairs separated by commas.
fn parse_languages(raw: &str) -> Result<Vec<Language>, String> {
    let mut languages = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (code, name) = entry
            .split_once(':')
            .ok_or_else(|| format!("expected code:Name, got '{entry}'"))?;
        let code = code.trim();
        if code.is_empty() {
            return Err(format!("empty language code in '{entry}'"));
        }
        if languages.iter().any(|l: &Language| l.code == code) {
            return Err(format!("language '{code}' listed twice"));
        }
        languages.push(Language {
            code: code.to_string(),
            name: name.trim().to_string(),
        });
    }

    if languages.is_empty() {
        return Err("at least one language is required".to_string());
    }
    Ok(languages)
}

/// Parse a positive limit, falling back to `default` when unset.
fn parse_limit(key: &str, default: usize) -> Result<usize, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    match raw.parse::<usize>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be at least 1".to_string(),
        )),
        Ok(limit) => Ok(limit),
        Err(e) => Err(ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_languages() {
        let languages = parse_languages("en:English, fi:Finnish").unwrap();
        assert_eq!(languages.len(), 2);
        assert_eq!(languages[0].code, "en");
        assert_eq!(languages[1].name, "Finnish");
    }

    #[test]
    fn test_parse_languages_rejects_missing_name_separator() {
        assert!(parse_languages("en").is_err());
    }

    #[test]
    fn test_parse_languages_rejects_duplicates() {
        assert!(parse_languages("en:English,en:Again").is_err());
    }

    #[test]
    fn test_parse_languages_rejects_empty() {
        assert!(parse_languages(" , ").is_err());
    }

    #[test]
    fn test_single_language_settings() {
        let settings = VariationSettings::single_language("en", "English");
        assert!(settings.has_language("en"));
        assert!(!settings.has_language("fi"));
        assert_eq!(settings.max_variables, 3);
        assert_eq!(settings.max_variable_values, 10);
    }

    #[test]
    fn test_socket_addr() {
        let config = AdminConfig::for_memory(VariationSettings::single_language("en", "English"));

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3002);
        assert!(config.database_url.is_none());
    }
}
