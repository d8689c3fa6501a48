//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Every error renders as a JSON
//! body `{"error": ..., "code": ...}` where `error` is either a message or,
//! for validation failures, a map of field name to messages.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::VariationError;

/// Application-level error type for the variations admin.
#[derive(Debug, Error)]
pub enum AppError {
    /// Variation service failure.
    #[error(transparent)]
    Variation(#[from] VariationError),

    /// Database operation failed outside a service.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Request context (headers) could not be read.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Stable machine-readable code sent to clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Variation(err) => err.code(),
            Self::Database(_) => "internal-error",
            Self::BadRequest(_) => "invalid-content",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Variation(err) => match err {
                VariationError::SkuConflict { .. }
                | VariationError::ValidationFail(_)
                | VariationError::InvalidContent(_) => StatusCode::BAD_REQUEST,
                VariationError::ProductNotFound(_) | VariationError::NotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                VariationError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let error = match &self {
            Self::Variation(VariationError::ValidationFail(errors)) => json!(errors),
            Self::Variation(VariationError::SkuConflict { sku }) => {
                json!(format!("SKU '{sku}' already exists."))
            }
            Self::Variation(VariationError::InvalidContent(_)) | Self::BadRequest(_) => {
                json!("Invalid content.")
            }
            Self::Variation(VariationError::ProductNotFound(_)) => json!("Product not found."),
            Self::Variation(VariationError::NotFound(what)) => json!(format!("Not found: {what}")),
            Self::Variation(VariationError::Repository(_)) | Self::Database(_) => {
                json!("Internal server error")
            }
        };

        (status, Json(json!({ "error": error, "code": self.code() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::FieldErrors;
    use http_body_util::BodyExt;
    use product_variations_core::{ProductId, Sku};

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_validation_body_carries_field_map() {
        let err = AppError::from(VariationError::ValidationFail(FieldErrors::single(
            "0.sku",
            "This field may not be blank.",
        )));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation-fail");
        assert_eq!(body["error"]["0.sku"][0], "This field may not be blank.");
    }

    #[tokio::test]
    async fn test_status_codes() {
        let (status, body) = render(AppError::from(VariationError::SkuConflict {
            sku: Sku::parse("red-l").unwrap(),
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "sku-exists");

        let (status, body) =
            render(AppError::from(VariationError::ProductNotFound(ProductId::new(3)))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "product-not-found");

        let (status, body) = render(AppError::BadRequest("x-shop-id".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid-content");
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "bad translation row".to_string(),
        ));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], "internal-error");
    }
}
