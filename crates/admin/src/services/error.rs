//! Variation service error types.

use thiserror::Error;

use product_variations_core::{ProductId, Sku};

use crate::db::RepositoryError;
use crate::models::FieldErrors;

/// Errors that can occur while reconciling or editing variations.
#[derive(Debug, Error)]
pub enum VariationError {
    /// Another product already uses the requested SKU.
    #[error("SKU '{sku}' already exists")]
    SkuConflict { sku: Sku },

    /// Input or a derived child failed validation.
    #[error("validation failed: {0}")]
    ValidationFail(FieldErrors),

    /// Request body could not be read.
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// Parent product missing or not visible to the shop and supplier.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Variable, value or combination missing.
    #[error("{0} not found")]
    NotFound(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl VariationError {
    /// Stable machine-readable code sent to clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::SkuConflict { .. } => "sku-exists",
            Self::ValidationFail(_) => "validation-fail",
            Self::InvalidContent(_) => "invalid-content",
            Self::ProductNotFound(_) => "product-not-found",
            Self::NotFound(_) => "not-found",
            Self::Repository(_) => "internal-error",
        }
    }

    /// Validation failure with a single message for `field`.
    #[must_use]
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationFail(FieldErrors::single(field, message))
    }
}

impl From<FieldErrors> for VariationError {
    fn from(errors: FieldErrors) -> Self {
        Self::ValidationFail(errors)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let conflict = VariationError::SkuConflict {
            sku: Sku::parse("red-l").unwrap(),
        };
        assert_eq!(conflict.code(), "sku-exists");
        assert_eq!(conflict.to_string(), "SKU 'red-l' already exists");

        assert_eq!(
            VariationError::field("sku", "bad").code(),
            "validation-fail"
        );
        assert_eq!(
            VariationError::ProductNotFound(ProductId::new(7)).code(),
            "product-not-found"
        );
        assert_eq!(
            VariationError::from(RepositoryError::NotFound).code(),
            "internal-error"
        );
    }
}
