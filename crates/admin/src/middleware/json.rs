//! JSON body extractor speaking the API's error format.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::models::FieldErrors;
use crate::services::VariationError;

/// Like [`axum::Json`], but rejects with an [`AppError`].
///
/// Unparseable bodies become `invalid-content`; well-formed JSON of the wrong
/// shape becomes `validation-fail` with the decoder's message.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_error(&rejection).into()),
        }
    }
}

fn rejection_error(rejection: &JsonRejection) -> VariationError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            VariationError::ValidationFail(FieldErrors::non_field(err.body_text()))
        }
        other => VariationError::InvalidContent(other.body_text()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Named {
        #[allow(dead_code)]
        name: String,
    }

    async fn extract(body: &'static str) -> Result<JsonBody<Named>, AppError> {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        JsonBody::<Named>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn test_rejections_map_to_codes() {
        assert!(extract(r#"{"name": "Color"}"#).await.is_ok());
        assert_eq!(
            extract("{not json").await.unwrap_err().code(),
            "invalid-content"
        );
        assert_eq!(
            extract(r#"{"name": 5}"#).await.unwrap_err().code(),
            "validation-fail"
        );
    }
}
