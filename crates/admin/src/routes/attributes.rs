//! Detail routes for single variables and values.
//!
//! Product-scoped attributes live under `/api/product-variations` and are
//! checked against the request's shop scope; template attributes live under
//! `/api/variations`.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use product_variations_core::{VariableId, VariableValueId};

use crate::error::Result;
use crate::middleware::{JsonBody, ShopContext};
use crate::models::{AttributeDetail, AttributeUpdate};
use crate::services::AttributeOwner;
use crate::state::AppState;

// =============================================================================
// Product-scoped
// =============================================================================

/// GET /api/product-variations/variables/{id}
///
/// # Errors
///
/// Returns 404 if the variable or its parent is not visible.
pub async fn product_variable(
    State(state): State<AppState>,
    ShopContext(scope): ShopContext,
    Path(id): Path<VariableId>,
) -> Result<Json<AttributeDetail>> {
    let detail = state
        .attributes()
        .variable_detail(AttributeOwner::Product(scope), id)
        .await?;
    Ok(Json(detail))
}

/// POST /api/product-variations/variables/{id}
///
/// # Errors
///
/// Returns 400 `validation-fail` for an unknown language or blank name.
pub async fn update_product_variable(
    State(state): State<AppState>,
    ShopContext(scope): ShopContext,
    Path(id): Path<VariableId>,
    JsonBody(update): JsonBody<AttributeUpdate>,
) -> Result<Json<Value>> {
    state
        .attributes()
        .update_variable(AttributeOwner::Product(scope), id, update)
        .await?;
    Ok(Json(json!({})))
}

/// GET /api/product-variations/values/{id}
///
/// # Errors
///
/// Returns 404 if the value or its parent is not visible.
pub async fn product_value(
    State(state): State<AppState>,
    ShopContext(scope): ShopContext,
    Path(id): Path<VariableValueId>,
) -> Result<Json<AttributeDetail>> {
    let detail = state
        .attributes()
        .value_detail(AttributeOwner::Product(scope), id)
        .await?;
    Ok(Json(detail))
}

/// POST /api/product-variations/values/{id}
///
/// # Errors
///
/// Returns 400 `validation-fail` for an unknown language or blank name.
pub async fn update_product_value(
    State(state): State<AppState>,
    ShopContext(scope): ShopContext,
    Path(id): Path<VariableValueId>,
    JsonBody(update): JsonBody<AttributeUpdate>,
) -> Result<Json<Value>> {
    state
        .attributes()
        .update_value(AttributeOwner::Product(scope), id, update)
        .await?;
    Ok(Json(json!({})))
}

// =============================================================================
// Templates
// =============================================================================

/// GET /api/variations/variables/{id}
///
/// # Errors
///
/// Returns 404 `not-found` if no template variable has the ID.
pub async fn template_variable(
    State(state): State<AppState>,
    Path(id): Path<VariableId>,
) -> Result<Json<AttributeDetail>> {
    let detail = state
        .attributes()
        .variable_detail(AttributeOwner::Template, id)
        .await?;
    Ok(Json(detail))
}

/// POST /api/variations/variables/{id}
///
/// # Errors
///
/// Returns 400 `validation-fail` for an unknown language or blank name.
pub async fn update_template_variable(
    State(state): State<AppState>,
    Path(id): Path<VariableId>,
    JsonBody(update): JsonBody<AttributeUpdate>,
) -> Result<Json<Value>> {
    state
        .attributes()
        .update_variable(AttributeOwner::Template, id, update)
        .await?;
    Ok(Json(json!({})))
}

/// GET /api/variations/values/{id}
///
/// # Errors
///
/// Returns 404 `not-found` if no template value has the ID.
pub async fn template_value(
    State(state): State<AppState>,
    Path(id): Path<VariableValueId>,
) -> Result<Json<AttributeDetail>> {
    let detail = state
        .attributes()
        .value_detail(AttributeOwner::Template, id)
        .await?;
    Ok(Json(detail))
}

/// POST /api/variations/values/{id}
///
/// # Errors
///
/// Returns 400 `validation-fail` for an unknown language or blank name.
pub async fn update_template_value(
    State(state): State<AppState>,
    Path(id): Path<VariableValueId>,
    JsonBody(update): JsonBody<AttributeUpdate>,
) -> Result<Json<Value>> {
    state
        .attributes()
        .update_value(AttributeOwner::Template, id, update)
        .await?;
    Ok(Json(json!({})))
}
