//! Batch save, batch delete and listing of a parent's combinations.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{info, instrument};

use product_variations_core::{
    CombinationHash, ProductId, ProductMode, ShopId, SupplierId, VariableId, VariableValueId,
    slugify,
};

use super::VariationError;
use super::updater::{CombinationUpdate, VariationContext, VariationUpdater};
use crate::config::VariationSettings;
use crate::db::{CatalogBackend, CatalogTx, ProductRepository, StockLedger, VariationStore};
use crate::models::{
    CombinationInput, CombinationListing, CombinationSummary, DeleteInput, DeleteTarget,
    FieldErrors, Product, ProductData, ResolvedCombination, SavedCombination, ShopProduct,
    Variable, VariableScope, VariableValue, VariationListing,
};

/// Shop and optional supplier a request acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopScope {
    pub shop: ShopId,
    pub supplier: Option<SupplierId>,
}

/// Number of value slug characters used per variable in a SKU part.
const SKU_PART_LENGTH: usize = 6;

/// Service for a parent product's combinations and product-scoped variables.
#[derive(Clone)]
pub struct CombinationService {
    backend: Arc<dyn CatalogBackend>,
    updater: Arc<dyn VariationUpdater>,
    settings: VariationSettings,
}

impl CombinationService {
    /// Create a new combination service.
    #[must_use]
    pub fn new(
        backend: Arc<dyn CatalogBackend>,
        updater: Arc<dyn VariationUpdater>,
        settings: VariationSettings,
    ) -> Self {
        Self {
            backend,
            updater,
            settings,
        }
    }

    /// Reconcile every entry in one transaction and echo them with their child IDs.
    ///
    /// Afterwards the parent's price in the shop becomes the lowest price
    /// among its visible children.
    ///
    /// # Errors
    ///
    /// Returns `VariationError::ValidationFail` for invalid entries or limits,
    /// `VariationError::SkuConflict` for taken SKUs, and
    /// `VariationError::ProductNotFound` if the parent is not visible. Any
    /// error leaves the catalog unchanged.
    #[instrument(skip(self, inputs), fields(entries = inputs.len()))]
    pub async fn save_combinations(
        &self,
        scope: ShopScope,
        product_id: ProductId,
        inputs: Vec<CombinationInput>,
    ) -> Result<Vec<SavedCombination>, VariationError> {
        let mut errors = FieldErrors::default();
        let mut entries = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            match input.validate() {
                Ok(entry) => entries.push(entry),
                Err(e) => errors.extend_prefixed(&index.to_string(), e),
            }
        }
        errors.into_result()?;

        let mut tx = self.backend.begin().await?;
        let (parent, parent_shop_product) = load_parent(tx.as_mut(), scope, product_id).await?;
        if !parent.mode.can_be_parent() {
            return Err(FieldErrors::non_field("A variation child cannot have variations.").into());
        }

        let ctx = VariationContext {
            shop: scope.shop,
            supplier: scope.supplier,
            parent: &parent,
            parent_shop_product: &parent_shop_product,
            language: &self.settings.default_language,
        };

        let mut saved = Vec::with_capacity(entries.len());
        for entry in entries {
            let combination =
                resolve_or_create(tx.as_mut(), &self.settings, parent.id, &entry.combination)
                    .await?;
            let child = self
                .updater
                .update_or_create_variation(
                    tx.as_mut(),
                    &ctx,
                    &CombinationUpdate {
                        combination: &combination,
                        sku: &entry.sku,
                        price: entry.price,
                        stock_count: entry.stock_count,
                    },
                )
                .await?;

            saved.push(SavedCombination {
                combination: entry.combination,
                sku: entry.sku,
                price: entry.price,
                stock_count: entry.stock_count,
                product_id: child.product.id,
            });
        }

        sync_parent_price(tx.as_mut(), scope.shop, &parent, &parent_shop_product).await?;
        tx.commit().await?;

        info!(parent_id = %parent.id, saved = saved.len(), "saved combinations");
        Ok(saved)
    }

    /// Delete combinations, then drop variables and values no visible child uses.
    ///
    /// # Errors
    ///
    /// Returns `VariationError::NotFound` if an entry matches no variation of
    /// the parent, `VariationError::ValidationFail` for entries naming
    /// neither a combination nor a SKU, and
    /// `VariationError::ProductNotFound` if the parent is not visible.
    #[instrument(skip(self, inputs), fields(entries = inputs.len()))]
    pub async fn delete_combinations(
        &self,
        scope: ShopScope,
        product_id: ProductId,
        inputs: Vec<DeleteInput>,
    ) -> Result<(), VariationError> {
        let mut errors = FieldErrors::default();
        let mut targets = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            match input.target() {
                Ok(target) => targets.push(target),
                Err(e) => errors.extend_prefixed(&index.to_string(), e),
            }
        }
        errors.into_result()?;

        let mut tx = self.backend.begin().await?;
        let (parent, _) = load_parent(tx.as_mut(), scope, product_id).await?;

        // Pairs of every combination, captured before anything is deleted.
        // Results saved before a variable was added cover only some variables.
        let variables = tx.list_variables(VariableScope::Product(parent.id)).await?;
        let values = tx.list_values(&variable_ids(&variables)).await?;
        let hash_to_pairs: HashMap<CombinationHash, Vec<(VariableId, VariableValueId)>> =
            partial_combinations(&variables, &values)
                .into_iter()
                .map(|pairs| (CombinationHash::from_pairs(pairs.iter().copied()), pairs))
                .collect();

        for target in targets {
            let child = find_child(tx.as_mut(), &self.settings, &parent, target).await?;
            self.updater
                .delete_variation(tx.as_mut(), &parent, &child)
                .await?;
        }

        let mut used_variables = BTreeSet::new();
        let mut used_values = BTreeSet::new();
        let mut has_visible_children = false;
        for result in tx.list_results(parent.id).await? {
            if !result.status.is_visible() {
                continue;
            }
            has_visible_children = true;
            for (variable, value) in hash_to_pairs.get(&result.combination_hash).into_iter().flatten() {
                used_variables.insert(*variable);
                used_values.insert(*value);
            }
        }

        let mut removed = 0_usize;
        for value in &values {
            if !used_values.contains(&value.id) {
                tx.delete_value(value.id).await?;
                removed += 1;
            }
        }
        for variable in &variables {
            if !used_variables.contains(&variable.id) {
                tx.delete_variable(variable.id).await?;
                removed += 1;
            }
        }

        let has_variables = !used_variables.is_empty();
        let mode = if has_visible_children || has_variables {
            ProductMode::VariableVariationParent
        } else {
            ProductMode::Normal
        };
        if mode != parent.mode {
            tx.set_product_mode(parent.id, mode).await?;
        }

        tx.commit().await?;
        info!(parent_id = %parent.id, removed, ?mode, "deleted combinations");
        Ok(())
    }

    /// Visible combinations of a parent and the shop data of their children.
    ///
    /// # Errors
    ///
    /// Returns `VariationError::ProductNotFound` if the parent is not visible.
    #[instrument(skip(self))]
    pub async fn list_combinations(
        &self,
        scope: ShopScope,
        product_id: ProductId,
    ) -> Result<CombinationListing, VariationError> {
        let mut tx = self.backend.begin().await?;
        let (parent, parent_shop_product) = load_parent(tx.as_mut(), scope, product_id).await?;

        let Some(supplier_id) = scope
            .supplier
            .or_else(|| parent_shop_product.suppliers.first().copied())
        else {
            return Ok(CombinationListing::default());
        };

        let variables = tx.list_variables(VariableScope::Product(parent.id)).await?;
        let values = tx.list_values(&variable_ids(&variables)).await?;
        let results: HashMap<CombinationHash, ProductId> = tx
            .list_results(parent.id)
            .await?
            .into_iter()
            .filter(|result| result.status.is_visible())
            .map(|result| (result.combination_hash, result.result_id))
            .collect();

        let language = &self.settings.default_language;
        let mut listing = CombinationListing::default();
        let mut child_ids = BTreeSet::new();
        for combination in cartesian(&variables, &values) {
            let hash =
                CombinationHash::from_pairs(combination.iter().map(|(v, value)| (v.id, value.id)));
            let Some(child_id) = results.get(&hash) else {
                continue;
            };
            child_ids.insert(*child_id);
            listing.combinations.push(CombinationSummary {
                product: *child_id,
                sku_part: sku_part(&combination),
                hash,
                combination: combination
                    .iter()
                    .map(|(variable, value)| {
                        (
                            variable.names.display(language).to_string(),
                            value.names.display(language).to_string(),
                        )
                    })
                    .collect(),
            });
        }

        let stock_managed = tx
            .get_supplier(supplier_id)
            .await?
            .is_some_and(|supplier| supplier.stock_managed);

        for child in tx.list_child_shop_products(parent.id, scope.shop).await? {
            if !child_ids.contains(&child.product.id) {
                continue;
            }
            let stock_count = if stock_managed {
                Some(tx.logical_count(supplier_id, child.product.id).await?)
            } else {
                None
            };
            listing.product_data.push(ProductData {
                pk: child.shop_product.id,
                product_id: child.product.id,
                sku: child.product.sku,
                price: child.shop_product.default_price,
                stock_count,
            });
        }

        Ok(listing)
    }

    /// Variables and values of a parent in the default language.
    ///
    /// # Errors
    ///
    /// Returns `VariationError::ProductNotFound` if the parent is not visible.
    #[instrument(skip(self))]
    pub async fn product_variations(
        &self,
        scope: ShopScope,
        product_id: ProductId,
    ) -> Result<VariationListing, VariationError> {
        let mut tx = self.backend.begin().await?;
        let (parent, _) = load_parent(tx.as_mut(), scope, product_id).await?;
        let variables = tx.list_variables(VariableScope::Product(parent.id)).await?;
        let values = tx.list_values(&variable_ids(&variables)).await?;
        Ok(VariationListing::build(
            &variables,
            &values,
            &self.settings.default_language,
        ))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Load a live product with its shop product, honoring the shop and supplier scope.
pub(crate) async fn load_parent(
    tx: &mut dyn CatalogTx,
    scope: ShopScope,
    product_id: ProductId,
) -> Result<(Product, ShopProduct), VariationError> {
    let not_found = || VariationError::ProductNotFound(product_id);

    let product = tx
        .get_product(product_id)
        .await?
        .filter(Product::is_live)
        .ok_or_else(not_found)?;
    let shop_product = tx
        .get_shop_product(scope.shop, product_id)
        .await?
        .ok_or_else(not_found)?;
    if scope
        .supplier
        .is_some_and(|supplier| !shop_product.has_supplier(supplier))
    {
        return Err(not_found());
    }
    Ok((product, shop_product))
}

pub(crate) fn variable_ids(variables: &[Variable]) -> Vec<VariableId> {
    variables.iter().map(|variable| variable.id).collect()
}

/// Every combination of one value per variable, in `(ordering, id)` order.
fn cartesian<'a>(
    variables: &'a [Variable],
    values: &'a [VariableValue],
) -> Vec<Vec<(&'a Variable, &'a VariableValue)>> {
    if variables.is_empty() {
        return Vec::new();
    }

    let mut combinations: Vec<Vec<(&Variable, &VariableValue)>> = vec![Vec::new()];
    for variable in variables {
        let options: Vec<&VariableValue> = values
            .iter()
            .filter(|value| value.variable_id == variable.id)
            .collect();
        combinations = combinations
            .into_iter()
            .flat_map(|prefix| {
                options.iter().map(move |value| {
                    let mut next = prefix.clone();
                    next.push((variable, *value));
                    next
                })
            })
            .collect();
    }
    combinations
}

/// Pairs of every combination over any non-empty subset of `variables`.
fn partial_combinations(
    variables: &[Variable],
    values: &[VariableValue],
) -> Vec<Vec<(VariableId, VariableValueId)>> {
    let mut combinations: Vec<Vec<(VariableId, VariableValueId)>> = vec![Vec::new()];
    for variable in variables {
        let options: Vec<VariableValueId> = values
            .iter()
            .filter(|value| value.variable_id == variable.id)
            .map(|value| value.id)
            .collect();
        combinations = combinations
            .into_iter()
            .flat_map(|prefix| {
                let mut expanded = Vec::with_capacity(options.len() + 1);
                for value in &options {
                    let mut next = prefix.clone();
                    next.push((variable.id, *value));
                    expanded.push(next);
                }
                expanded.push(prefix);
                expanded
            })
            .collect();
    }
    combinations.retain(|pairs| !pairs.is_empty());
    combinations
}

/// First characters of each value's identifier joined with `-`.
fn sku_part(combination: &[(&Variable, &VariableValue)]) -> String {
    combination
        .iter()
        .map(|(_, value)| value.identifier.chars().take(SKU_PART_LENGTH).collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

fn identifier_for(name: &str) -> Result<String, VariationError> {
    let identifier = slugify(name);
    if identifier.is_empty() {
        return Err(VariationError::field(
            "combination",
            format!("'{name}' must contain at least one letter or digit."),
        ));
    }
    Ok(identifier)
}

/// Find a variable of `scope` by name, then by slug.
pub(crate) async fn find_variable(
    tx: &mut dyn CatalogTx,
    scope: VariableScope,
    language: &str,
    name: &str,
) -> Result<Option<Variable>, VariationError> {
    if let Some(variable) = tx.find_variable_by_name(scope, language, name).await? {
        return Ok(Some(variable));
    }
    let identifier = slugify(name);
    if identifier.is_empty() {
        return Ok(None);
    }
    Ok(tx.find_variable_by_identifier(scope, &identifier).await?)
}

/// Find a value of `variable` by name, then by slug.
pub(crate) async fn find_value(
    tx: &mut dyn CatalogTx,
    variable: VariableId,
    language: &str,
    name: &str,
) -> Result<Option<VariableValue>, VariationError> {
    if let Some(value) = tx.find_value_by_name(variable, language, name).await? {
        return Ok(Some(value));
    }
    let identifier = slugify(name);
    if identifier.is_empty() {
        return Ok(None);
    }
    Ok(tx.find_value_by_identifier(variable, &identifier).await?)
}

/// Resolve names to the parent's variables and values, creating missing ones.
async fn resolve_or_create(
    tx: &mut dyn CatalogTx,
    settings: &VariationSettings,
    parent: ProductId,
    names: &BTreeMap<String, String>,
) -> Result<ResolvedCombination, VariationError> {
    let scope = VariableScope::Product(parent);
    let language = settings.default_language.as_str();
    let mut pairs = Vec::with_capacity(names.len());

    for (variable_name, value_name) in names {
        let variable = match find_variable(tx, scope, language, variable_name).await? {
            Some(variable) => variable,
            None => {
                let identifier = identifier_for(variable_name)?;
                if tx.list_variables(scope).await?.len() >= settings.max_variables {
                    return Err(VariationError::field(
                        "combination",
                        format!(
                            "A product can have at most {} variables.",
                            settings.max_variables
                        ),
                    ));
                }
                tx.create_variable(scope, &identifier, language, variable_name)
                    .await?
            }
        };

        let value = match find_value(tx, variable.id, language, value_name).await? {
            Some(value) => value,
            None => {
                let identifier = identifier_for(value_name)?;
                let existing = tx.list_values(&[variable.id]).await?.len();
                if existing >= settings.max_variable_values {
                    return Err(VariationError::field(
                        "combination",
                        format!(
                            "A variable can have at most {} values.",
                            settings.max_variable_values
                        ),
                    ));
                }
                let ordering = i32::try_from(existing).unwrap_or(i32::MAX);
                tx.create_value(variable.id, &identifier, ordering, language, value_name)
                    .await?
            }
        };

        pairs.push((variable, value));
    }

    Ok(ResolvedCombination::new(pairs))
}

/// Locate the child a delete entry refers to.
async fn find_child(
    tx: &mut dyn CatalogTx,
    settings: &VariationSettings,
    parent: &Product,
    target: DeleteTarget,
) -> Result<Product, VariationError> {
    let language = settings.default_language.as_str();
    match target {
        DeleteTarget::Combination(names) => {
            let scope = VariableScope::Product(parent.id);
            let mut pairs = Vec::with_capacity(names.len());
            for (variable_name, value_name) in &names {
                let missing = || {
                    VariationError::NotFound(format!("combination {variable_name}:{value_name}"))
                };
                let variable = find_variable(tx, scope, language, variable_name)
                    .await?
                    .ok_or_else(missing)?;
                let value = find_value(tx, variable.id, language, value_name)
                    .await?
                    .ok_or_else(missing)?;
                pairs.push((variable.id, value.id));
            }

            let hash = CombinationHash::from_pairs(pairs);
            let result = tx
                .find_result(parent.id, &hash)
                .await?
                .ok_or_else(|| VariationError::NotFound("combination".to_string()))?;
            tx.get_product(result.result_id)
                .await?
                .ok_or_else(|| VariationError::NotFound(format!("product {}", result.result_id)))
        }
        DeleteTarget::Sku(sku) => tx
            .products_with_sku(&sku)
            .await?
            .into_iter()
            .find(|product| product.variation_parent_id == Some(parent.id))
            .ok_or_else(|| VariationError::NotFound(format!("variation with SKU '{sku}'"))),
    }
}

/// Set the parent's shop price to the cheapest visible, live child.
async fn sync_parent_price(
    tx: &mut dyn CatalogTx,
    shop: ShopId,
    parent: &Product,
    parent_shop_product: &ShopProduct,
) -> Result<(), VariationError> {
    let visible: BTreeSet<ProductId> = tx
        .list_results(parent.id)
        .await?
        .into_iter()
        .filter(|result| result.status.is_visible())
        .map(|result| result.result_id)
        .collect();

    let cheapest = tx
        .list_child_shop_products(parent.id, shop)
        .await?
        .into_iter()
        .filter(|child| visible.contains(&child.product.id))
        .filter_map(|child| child.shop_product.default_price)
        .min();

    if let Some(price) = cheapest
        && parent_shop_product.default_price != Some(price)
    {
        tx.set_shop_product_price(parent_shop_product.id, Some(price))
            .await?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryCatalog;
    use crate::models::InheritedAttributes;
    use crate::services::DefaultVariationUpdater;
    use product_variations_core::Sku;
    use rust_decimal::Decimal;

    const SHOP: ShopId = ShopId::new(1);

    async fn setup() -> (MemoryCatalog, CombinationService, ProductId) {
        let catalog = MemoryCatalog::new();
        let supplier = catalog.insert_supplier("Main", true).await.unwrap();
        let parent = catalog
            .insert_product("Shirt", Sku::parse("shirt").unwrap(), InheritedAttributes::default())
            .await
            .unwrap();
        catalog
            .attach_shop_product(SHOP, parent.id, None, &[supplier.id])
            .await
            .unwrap();
        let service = CombinationService::new(
            Arc::new(catalog.clone()),
            Arc::new(DefaultVariationUpdater),
            VariationSettings::single_language("en", "English"),
        );
        (catalog, service, parent.id)
    }

    fn scope() -> ShopScope {
        ShopScope {
            shop: SHOP,
            supplier: None,
        }
    }

    fn input(pairs: &[(&str, &str)], sku: &str, price: Option<i64>) -> CombinationInput {
        CombinationInput {
            combination: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            sku: sku.to_string(),
            price: price.map(Decimal::from),
            stock_count: None,
        }
    }

    #[tokio::test]
    async fn test_save_sets_parent_price_to_cheapest_child() {
        let (catalog, service, parent) = setup().await;
        service
            .save_combinations(
                scope(),
                parent,
                vec![
                    input(&[("Color", "Red")], "red", Some(20)),
                    input(&[("Color", "Blue")], "blue", Some(12)),
                ],
            )
            .await
            .unwrap();

        let mut tx = catalog.begin().await.unwrap();
        let shop_product = tx.get_shop_product(SHOP, parent).await.unwrap().unwrap();
        assert_eq!(shop_product.default_price, Some(Decimal::from(12)));
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_catalog_untouched() {
        let (catalog, service, parent) = setup().await;
        let err = service
            .save_combinations(
                scope(),
                parent,
                vec![
                    input(&[("Color", "Red")], "red", None),
                    input(&[("Color", "Blue")], "shirt", None),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VariationError::SkuConflict { .. }));

        let mut tx = catalog.begin().await.unwrap();
        assert!(tx.list_variables(VariableScope::Product(parent)).await.unwrap().is_empty());
        assert!(tx.list_results(parent).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_entries_are_reported_by_index() {
        let (_, service, parent) = setup().await;
        let err = service
            .save_combinations(
                scope(),
                parent,
                vec![
                    input(&[("Color", "Red")], "red", None),
                    input(&[], "", None),
                ],
            )
            .await
            .unwrap_err();
        let VariationError::ValidationFail(errors) = err else {
            panic!("expected validation failure");
        };
        assert!(errors.contains_field("1.sku"));
        assert!(errors.contains_field("1.combination"));
        assert!(!errors.contains_field("0.sku"));
    }

    #[tokio::test]
    async fn test_variable_limit() {
        let (_, service, parent) = setup().await;
        let err = service
            .save_combinations(
                scope(),
                parent,
                vec![input(
                    &[("A", "1"), ("B", "1"), ("C", "1"), ("D", "1")],
                    "abcd",
                    None,
                )],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation-fail");
    }

    #[tokio::test]
    async fn test_listing_and_sku_part() {
        let (_, service, parent) = setup().await;
        service
            .save_combinations(
                scope(),
                parent,
                vec![input(&[("Color", "Burgundy"), ("Size", "Large")], "b-l", Some(9))],
            )
            .await
            .unwrap();

        let listing = service.list_combinations(scope(), parent).await.unwrap();
        assert_eq!(listing.combinations.len(), 1);
        assert_eq!(listing.combinations[0].sku_part, "burgun-large");
        assert_eq!(listing.combinations[0].combination["Color"], "Burgundy");
        assert_eq!(listing.product_data.len(), 1);
        assert_eq!(listing.product_data[0].stock_count, Some(Decimal::ZERO));

        let variations = service.product_variations(scope(), parent).await.unwrap();
        assert_eq!(variations.variables.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_cleans_unused_values_and_resets_mode() {
        let (catalog, service, parent) = setup().await;
        service
            .save_combinations(
                scope(),
                parent,
                vec![
                    input(&[("Color", "Red")], "red", None),
                    input(&[("Color", "Blue")], "blue", None),
                ],
            )
            .await
            .unwrap();

        service
            .delete_combinations(
                scope(),
                parent,
                vec![DeleteInput {
                    combination: None,
                    sku: Some("blue".to_string()),
                }],
            )
            .await
            .unwrap();

        let variations = service.product_variations(scope(), parent).await.unwrap();
        let values: Vec<&str> = variations
            .values
            .values()
            .flatten()
            .map(|value| value.name.as_str())
            .collect();
        assert_eq!(values, vec!["Red"]);

        service
            .delete_combinations(
                scope(),
                parent,
                vec![DeleteInput {
                    combination: Some(BTreeMap::from([("Color".to_string(), "Red".to_string())])),
                    sku: None,
                }],
            )
            .await
            .unwrap();

        let mut tx = catalog.begin().await.unwrap();
        let product = tx.get_product(parent).await.unwrap().unwrap();
        assert_eq!(product.mode, ProductMode::Normal);
        assert!(tx.list_variables(VariableScope::Product(parent)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_keeps_values_of_results_saved_before_a_new_variable() {
        let (catalog, service, parent) = setup().await;
        service
            .save_combinations(scope(), parent, vec![input(&[("Color", "Red")], "red", None)])
            .await
            .unwrap();
        service
            .save_combinations(
                scope(),
                parent,
                vec![input(&[("Color", "Blue"), ("Size", "L")], "blue-l", None)],
            )
            .await
            .unwrap();

        service
            .delete_combinations(
                scope(),
                parent,
                vec![DeleteInput {
                    combination: None,
                    sku: Some("blue-l".to_string()),
                }],
            )
            .await
            .unwrap();

        let mut tx = catalog.begin().await.unwrap();
        let variables = tx.list_variables(VariableScope::Product(parent)).await.unwrap();
        let identifiers: Vec<&str> = variables.iter().map(|v| v.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["color"]);
        let values = tx.list_values(&variable_ids(&variables)).await.unwrap();
        let values: Vec<&str> = values.iter().map(|v| v.identifier.as_str()).collect();
        assert_eq!(values, vec!["red"]);
        let product = tx.get_product(parent).await.unwrap().unwrap();
        assert_eq!(product.mode, ProductMode::VariableVariationParent);
    }

    #[test]
    fn test_partial_combinations_skip_variables() {
        let variable = |id: i32| Variable {
            id: VariableId::new(id),
            scope: VariableScope::Template,
            identifier: format!("v{id}"),
            ordering: 0,
            names: crate::models::Translations::default(),
        };
        let value = |id: i32, variable: i32| VariableValue {
            id: VariableValueId::new(id),
            variable_id: VariableId::new(variable),
            identifier: format!("value{id}"),
            ordering: 0,
            names: crate::models::Translations::default(),
        };
        let variables = [variable(1), variable(2)];
        let values = [value(10, 1), value(11, 1), value(20, 2)];

        let combinations = partial_combinations(&variables, &values);
        // (2 + 1) * (1 + 1) selections minus the empty one
        assert_eq!(combinations.len(), 5);
        assert!(combinations.contains(&vec![(VariableId::new(1), VariableValueId::new(11))]));
        assert!(combinations.contains(&vec![(VariableId::new(2), VariableValueId::new(20))]));
        assert!(combinations.contains(&vec![
            (VariableId::new(1), VariableValueId::new(10)),
            (VariableId::new(2), VariableValueId::new(20)),
        ]));
        assert!(partial_combinations(&[], &values).is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_combination_is_not_found() {
        let (_, service, parent) = setup().await;
        let err = service
            .delete_combinations(
                scope(),
                parent,
                vec![DeleteInput {
                    combination: Some(BTreeMap::from([("Color".to_string(), "Pink".to_string())])),
                    sku: None,
                }],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VariationError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_parent_outside_supplier_scope_is_not_found() {
        let (_, service, parent) = setup().await;
        let err = service
            .list_combinations(
                ShopScope {
                    shop: SHOP,
                    supplier: Some(SupplierId::new(9999)),
                },
                parent,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VariationError::ProductNotFound(_)));

        let err = service
            .list_combinations(
                ShopScope {
                    shop: ShopId::new(2),
                    supplier: None,
                },
                parent,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "product-not-found");
    }

    #[test]
    fn test_cartesian_orders_by_variable() {
        let variable = |id: i32, ordering: i32| Variable {
            id: VariableId::new(id),
            scope: VariableScope::Template,
            identifier: format!("v{id}"),
            ordering,
            names: crate::models::Translations::default(),
        };
        let value = |id: i32, variable: i32| VariableValue {
            id: VariableValueId::new(id),
            variable_id: VariableId::new(variable),
            identifier: format!("value{id}"),
            ordering: 0,
            names: crate::models::Translations::default(),
        };
        let variables = [variable(1, 0), variable(2, 1)];
        let values = [value(10, 1), value(11, 1), value(20, 2), value(21, 2), value(22, 2)];

        let combinations = cartesian(&variables, &values);
        assert_eq!(combinations.len(), 6);
        assert_eq!(combinations[0][0].1.id, VariableValueId::new(10));
        assert_eq!(combinations[0][1].1.id, VariableValueId::new(20));
        assert_eq!(combinations[5][1].1.id, VariableValueId::new(22));
        assert!(cartesian(&[], &values).is_empty());
    }
}
