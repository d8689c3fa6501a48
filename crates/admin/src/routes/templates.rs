//! Template (global variable) routes.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::error::Result;
use crate::middleware::JsonBody;
use crate::models::{TemplateDelete, TemplateInput, TemplateSummary, VariationListing};
use crate::state::AppState;

/// GET /api/variations
///
/// # Errors
///
/// Returns 500 if the catalog cannot be read.
pub async fn index(State(state): State<AppState>) -> Result<Json<VariationListing>> {
    Ok(Json(state.templates().list_templates().await?))
}

/// POST /api/variations
///
/// # Errors
///
/// Returns 400 `validation-fail` for a blank name or value.
pub async fn upsert(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<TemplateInput>,
) -> Result<Json<TemplateSummary>> {
    Ok(Json(state.templates().upsert_template(input).await?))
}

/// DELETE /api/variations
///
/// # Errors
///
/// Returns 500 if the catalog cannot be written.
pub async fn delete(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<TemplateDelete>,
) -> Result<Json<Value>> {
    state.templates().delete_template(input).await?;
    Ok(Json(json!({})))
}
