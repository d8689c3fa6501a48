//! Combination routes of a parent product.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use product_variations_core::ProductId;

use crate::error::Result;
use crate::middleware::{JsonBody, ShopContext};
use crate::models::{
    CombinationInput, CombinationListing, DeleteInput, SavedCombination, VariationListing,
};
use crate::state::AppState;

/// List a parent's visible combinations and their children's shop data.
///
/// GET /api/products/{id}/combinations
///
/// # Errors
///
/// Returns 404 `product-not-found` if the parent is not visible.
pub async fn index(
    State(state): State<AppState>,
    ShopContext(scope): ShopContext,
    Path(id): Path<ProductId>,
) -> Result<Json<CombinationListing>> {
    let listing = state.combinations().list_combinations(scope, id).await?;
    Ok(Json(listing))
}

/// Create or update combinations in one batch.
///
/// POST /api/products/{id}/combinations
///
/// # Errors
///
/// Returns 400 `validation-fail` or `sku-exists`; nothing is saved then.
pub async fn save(
    State(state): State<AppState>,
    ShopContext(scope): ShopContext,
    Path(id): Path<ProductId>,
    JsonBody(inputs): JsonBody<Vec<CombinationInput>>,
) -> Result<Json<Vec<SavedCombination>>> {
    let saved = state
        .combinations()
        .save_combinations(scope, id, inputs)
        .await?;
    Ok(Json(saved))
}

/// Delete combinations by combination or SKU.
///
/// DELETE /api/products/{id}/combinations
///
/// # Errors
///
/// Returns 404 `not-found` if an entry matches no variation.
pub async fn delete(
    State(state): State<AppState>,
    ShopContext(scope): ShopContext,
    Path(id): Path<ProductId>,
    JsonBody(inputs): JsonBody<Vec<DeleteInput>>,
) -> Result<Json<Value>> {
    state
        .combinations()
        .delete_combinations(scope, id, inputs)
        .await?;
    Ok(Json(json!({})))
}

/// List a parent's variables and values.
///
/// GET /api/products/{id}/variations
///
/// # Errors
///
/// Returns 404 `product-not-found` if the parent is not visible.
pub async fn variations(
    State(state): State<AppState>,
    ShopContext(scope): ShopContext,
    Path(id): Path<ProductId>,
) -> Result<Json<VariationListing>> {
    let listing = state.combinations().product_variations(scope, id).await?;
    Ok(Json(listing))
}
