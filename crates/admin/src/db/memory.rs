//! In-memory catalog used by tests and database-less local runs.
//!
//! A transaction holds the catalog lock and mutates a private copy of the
//! state; `commit` swaps the copy in. Transactions therefore run one at a
//! time, and dropping one leaves the catalog untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use product_variations_core::{
    CombinationHash, ProductId, ProductMode, ShopId, ShopProductId, Sku, StockAdjustmentId,
    SupplierId, VariableId, VariableValueId, VariationLinkStatus, VariationResultId,
};

use super::RepositoryError;
use super::catalog::{CatalogBackend, CatalogTx, ProductRepository, StockLedger, VariationStore};
use crate::models::{
    ChildShopProduct, InheritedAttributes, NewProduct, Product, ShopProduct, StockAdjustment,
    Supplier, Translations, Variable, VariableScope, VariableValue, VariationResult,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    next_id: i32,
    products: BTreeMap<ProductId, Product>,
    shop_products: BTreeMap<ShopProductId, ShopProduct>,
    suppliers: BTreeMap<SupplierId, Supplier>,
    stock: BTreeMap<(SupplierId, ProductId), Decimal>,
    adjustments: Vec<StockAdjustment>,
    variables: BTreeMap<VariableId, Variable>,
    values: BTreeMap<VariableValueId, VariableValue>,
    results: BTreeMap<VariationResultId, VariationResult>,
}

impl MemoryState {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn ensure_sku_free(&self, sku: &Sku, except: Option<ProductId>) -> Result<(), RepositoryError> {
        let taken = self
            .products
            .values()
            .any(|p| !p.deleted && p.sku == *sku && Some(p.id) != except);
        if taken {
            return Err(RepositoryError::Conflict(format!(
                "sku '{sku}' is already used by a live product"
            )));
        }
        Ok(())
    }

    fn product_mut(&mut self, id: ProductId) -> Result<&mut Product, RepositoryError> {
        self.products.get_mut(&id).ok_or(RepositoryError::NotFound)
    }

    fn shop_product_mut(&mut self, id: ShopProductId) -> Result<&mut ShopProduct, RepositoryError> {
        self.shop_products.get_mut(&id).ok_or(RepositoryError::NotFound)
    }

    fn variable_mut(&mut self, id: VariableId) -> Result<&mut Variable, RepositoryError> {
        self.variables.get_mut(&id).ok_or(RepositoryError::NotFound)
    }

    fn value_mut(&mut self, id: VariableValueId) -> Result<&mut VariableValue, RepositoryError> {
        self.values.get_mut(&id).ok_or(RepositoryError::NotFound)
    }

    fn sorted_variables<'a>(&self, variables: impl Iterator<Item = &'a Variable>) -> Vec<Variable> {
        let mut variables: Vec<Variable> = variables.cloned().collect();
        variables.sort_by_key(|v| (v.scope.product_id(), v.ordering, v.id));
        variables
    }
}

/// Catalog kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a supplier.
    ///
    /// # Errors
    ///
    /// Never fails for this backend; the signature mirrors the transaction API.
    pub async fn insert_supplier(
        &self,
        name: &str,
        stock_managed: bool,
    ) -> Result<Supplier, RepositoryError> {
        let mut tx = self.begin().await?;
        let supplier = tx.create_supplier(name, stock_managed).await?;
        tx.commit().await?;
        Ok(supplier)
    }

    /// Seed a normal product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a live product already has the SKU.
    pub async fn insert_product(
        &self,
        name: &str,
        sku: Sku,
        attributes: InheritedAttributes,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.begin().await?;
        let product = tx
            .create_product(NewProduct {
                name: name.to_string(),
                sku,
                mode: ProductMode::Normal,
                variation_parent_id: None,
                attributes,
            })
            .await?;
        tx.commit().await?;
        Ok(product)
    }

    /// Seed a shop product with price and suppliers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn attach_shop_product(
        &self,
        shop: ShopId,
        product: ProductId,
        price: Option<Decimal>,
        suppliers: &[SupplierId],
    ) -> Result<ShopProduct, RepositoryError> {
        let mut tx = self.begin().await?;
        if tx.get_product(product).await?.is_none() {
            return Err(RepositoryError::NotFound);
        }
        let mut shop_product = tx.create_shop_product(shop, product).await?;
        tx.set_shop_product_price(shop_product.id, price).await?;
        tx.set_shop_product_suppliers(shop_product.id, suppliers).await?;
        tx.commit().await?;
        shop_product.default_price = price;
        shop_product.suppliers = suppliers.to_vec();
        Ok(shop_product)
    }

    /// Every stock adjustment recorded so far, oldest first.
    pub async fn stock_adjustments(&self) -> Vec<StockAdjustment> {
        self.state.lock().await.adjustments.clone()
    }
}

#[async_trait]
impl CatalogBackend for MemoryCatalog {
    async fn begin(&self) -> Result<Box<dyn CatalogTx>, RepositoryError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Transaction over a [`MemoryCatalog`].
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl CatalogTx for MemoryTx {
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MemoryTx {
    async fn get_product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn products_with_sku(&mut self, sku: &Sku) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self
            .working
            .products
            .values()
            .filter(|p| p.sku == *sku)
            .cloned()
            .collect();
        products.sort_by_key(|p| (p.deleted, p.id));
        Ok(products)
    }

    async fn create_product(&mut self, product: NewProduct) -> Result<Product, RepositoryError> {
        self.working.ensure_sku_free(&product.sku, None)?;
        let product = Product {
            id: ProductId::new(self.working.next_id()),
            name: product.name,
            sku: product.sku,
            mode: product.mode,
            variation_parent_id: product.variation_parent_id,
            deleted: false,
            attributes: product.attributes,
            created_at: Utc::now(),
        };
        self.working.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&mut self, product: &Product) -> Result<(), RepositoryError> {
        if !product.deleted {
            self.working.ensure_sku_free(&product.sku, Some(product.id))?;
        }
        let stored = self.working.product_mut(product.id)?;
        let created_at = stored.created_at;
        *stored = Product {
            created_at,
            ..product.clone()
        };
        Ok(())
    }

    async fn set_product_mode(
        &mut self,
        id: ProductId,
        mode: ProductMode,
    ) -> Result<(), RepositoryError> {
        self.working.product_mut(id)?.mode = mode;
        Ok(())
    }

    async fn get_shop_product(
        &mut self,
        shop: ShopId,
        product: ProductId,
    ) -> Result<Option<ShopProduct>, RepositoryError> {
        Ok(self
            .working
            .shop_products
            .values()
            .find(|sp| sp.shop_id == shop && sp.product_id == product)
            .cloned())
    }

    async fn create_shop_product(
        &mut self,
        shop: ShopId,
        product: ProductId,
    ) -> Result<ShopProduct, RepositoryError> {
        let exists = self
            .working
            .shop_products
            .values()
            .any(|sp| sp.shop_id == shop && sp.product_id == product);
        if exists {
            return Err(RepositoryError::Conflict(format!(
                "product {product} already has a shop product in shop {shop}"
            )));
        }
        let shop_product = ShopProduct {
            id: ShopProductId::new(self.working.next_id()),
            shop_id: shop,
            product_id: product,
            default_price: None,
            suppliers: Vec::new(),
        };
        self.working
            .shop_products
            .insert(shop_product.id, shop_product.clone());
        Ok(shop_product)
    }

    async fn set_shop_product_price(
        &mut self,
        id: ShopProductId,
        price: Option<Decimal>,
    ) -> Result<(), RepositoryError> {
        self.working.shop_product_mut(id)?.default_price = price;
        Ok(())
    }

    async fn set_shop_product_suppliers(
        &mut self,
        id: ShopProductId,
        suppliers: &[SupplierId],
    ) -> Result<(), RepositoryError> {
        let mut suppliers = suppliers.to_vec();
        suppliers.sort_unstable();
        suppliers.dedup();
        self.working.shop_product_mut(id)?.suppliers = suppliers;
        Ok(())
    }

    async fn list_child_shop_products(
        &mut self,
        parent: ProductId,
        shop: ShopId,
    ) -> Result<Vec<ChildShopProduct>, RepositoryError> {
        let state = &self.working;
        Ok(state
            .shop_products
            .values()
            .filter(|sp| sp.shop_id == shop)
            .filter_map(|sp| {
                let product = state.products.get(&sp.product_id)?;
                (product.variation_parent_id == Some(parent) && !product.deleted).then(|| {
                    ChildShopProduct {
                        product: product.clone(),
                        shop_product: sp.clone(),
                    }
                })
            })
            .collect())
    }

    async fn get_supplier(&mut self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        Ok(self.working.suppliers.get(&id).cloned())
    }

    async fn create_supplier(
        &mut self,
        name: &str,
        stock_managed: bool,
    ) -> Result<Supplier, RepositoryError> {
        let supplier = Supplier {
            id: SupplierId::new(self.working.next_id()),
            name: name.to_string(),
            stock_managed,
        };
        self.working.suppliers.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }
}

#[async_trait]
impl StockLedger for MemoryTx {
    async fn logical_count(
        &mut self,
        supplier: SupplierId,
        product: ProductId,
    ) -> Result<Decimal, RepositoryError> {
        Ok(self
            .working
            .stock
            .get(&(supplier, product))
            .copied()
            .unwrap_or_default())
    }

    async fn adjust_stock(
        &mut self,
        supplier: SupplierId,
        product: ProductId,
        delta: Decimal,
    ) -> Result<StockAdjustment, RepositoryError> {
        let adjustment = StockAdjustment {
            id: StockAdjustmentId::new(self.working.next_id()),
            supplier_id: supplier,
            product_id: product,
            delta,
            created_at: Utc::now(),
        };
        *self.working.stock.entry((supplier, product)).or_default() += delta;
        self.working.adjustments.push(adjustment.clone());
        Ok(adjustment)
    }
}

#[async_trait]
impl VariationStore for MemoryTx {
    async fn list_variables(
        &mut self,
        scope: VariableScope,
    ) -> Result<Vec<Variable>, RepositoryError> {
        let state = &self.working;
        Ok(state.sorted_variables(state.variables.values().filter(|v| v.scope == scope)))
    }

    async fn list_product_scoped_variables(&mut self) -> Result<Vec<Variable>, RepositoryError> {
        let state = &self.working;
        Ok(state.sorted_variables(
            state
                .variables
                .values()
                .filter(|v| v.scope.product_id().is_some()),
        ))
    }

    async fn get_variable(&mut self, id: VariableId) -> Result<Option<Variable>, RepositoryError> {
        Ok(self.working.variables.get(&id).cloned())
    }

    async fn find_variable_by_name(
        &mut self,
        scope: VariableScope,
        language_code: &str,
        name: &str,
    ) -> Result<Option<Variable>, RepositoryError> {
        Ok(self
            .working
            .variables
            .values()
            .find(|v| v.scope == scope && v.names.get(language_code) == Some(name))
            .cloned())
    }

    async fn find_variable_by_identifier(
        &mut self,
        scope: VariableScope,
        identifier: &str,
    ) -> Result<Option<Variable>, RepositoryError> {
        Ok(self
            .working
            .variables
            .values()
            .find(|v| v.scope == scope && v.identifier == identifier)
            .cloned())
    }

    async fn create_variable(
        &mut self,
        scope: VariableScope,
        identifier: &str,
        language_code: &str,
        name: &str,
    ) -> Result<Variable, RepositoryError> {
        let variable = Variable {
            id: VariableId::new(self.working.next_id()),
            scope,
            identifier: identifier.to_string(),
            ordering: 0,
            names: Translations::single(language_code, name),
        };
        self.working.variables.insert(variable.id, variable.clone());
        Ok(variable)
    }

    async fn set_variable_ordering(
        &mut self,
        id: VariableId,
        ordering: i32,
    ) -> Result<(), RepositoryError> {
        self.working.variable_mut(id)?.ordering = ordering;
        Ok(())
    }

    async fn set_variable_name(
        &mut self,
        id: VariableId,
        language_code: &str,
        name: &str,
    ) -> Result<(), RepositoryError> {
        self.working.variable_mut(id)?.names.set(language_code, name);
        Ok(())
    }

    async fn delete_variable(&mut self, id: VariableId) -> Result<(), RepositoryError> {
        self.working.variables.remove(&id);
        self.working.values.retain(|_, value| value.variable_id != id);
        Ok(())
    }

    async fn list_values(
        &mut self,
        variables: &[VariableId],
    ) -> Result<Vec<VariableValue>, RepositoryError> {
        let mut values: Vec<VariableValue> = self
            .working
            .values
            .values()
            .filter(|value| variables.contains(&value.variable_id))
            .cloned()
            .collect();
        values.sort_by_key(|value| (value.variable_id, value.ordering, value.id));
        Ok(values)
    }

    async fn get_value(
        &mut self,
        id: VariableValueId,
    ) -> Result<Option<VariableValue>, RepositoryError> {
        Ok(self.working.values.get(&id).cloned())
    }

    async fn find_value_by_name(
        &mut self,
        variable: VariableId,
        language_code: &str,
        name: &str,
    ) -> Result<Option<VariableValue>, RepositoryError> {
        Ok(self
            .working
            .values
            .values()
            .find(|value| value.variable_id == variable && value.names.get(language_code) == Some(name))
            .cloned())
    }

    async fn find_value_by_identifier(
        &mut self,
        variable: VariableId,
        identifier: &str,
    ) -> Result<Option<VariableValue>, RepositoryError> {
        Ok(self
            .working
            .values
            .values()
            .find(|value| value.variable_id == variable && value.identifier == identifier)
            .cloned())
    }

    async fn create_value(
        &mut self,
        variable: VariableId,
        identifier: &str,
        ordering: i32,
        language_code: &str,
        name: &str,
    ) -> Result<VariableValue, RepositoryError> {
        let duplicate = self
            .working
            .values
            .values()
            .any(|value| value.variable_id == variable && value.identifier == identifier);
        if duplicate {
            return Err(RepositoryError::Conflict(format!(
                "value '{identifier}' already exists for variable {variable}"
            )));
        }
        let value = VariableValue {
            id: VariableValueId::new(self.working.next_id()),
            variable_id: variable,
            identifier: identifier.to_string(),
            ordering,
            names: Translations::single(language_code, name),
        };
        self.working.values.insert(value.id, value.clone());
        Ok(value)
    }

    async fn set_value_ordering(
        &mut self,
        id: VariableValueId,
        ordering: i32,
    ) -> Result<(), RepositoryError> {
        self.working.value_mut(id)?.ordering = ordering;
        Ok(())
    }

    async fn set_value_name(
        &mut self,
        id: VariableValueId,
        language_code: &str,
        name: &str,
    ) -> Result<(), RepositoryError> {
        self.working.value_mut(id)?.names.set(language_code, name);
        Ok(())
    }

    async fn delete_value(&mut self, id: VariableValueId) -> Result<(), RepositoryError> {
        self.working.values.remove(&id);
        Ok(())
    }

    async fn find_result(
        &mut self,
        parent: ProductId,
        hash: &CombinationHash,
    ) -> Result<Option<VariationResult>, RepositoryError> {
        Ok(self
            .working
            .results
            .values()
            .find(|r| r.product_id == parent && r.combination_hash == *hash)
            .cloned())
    }

    async fn list_results(
        &mut self,
        parent: ProductId,
    ) -> Result<Vec<VariationResult>, RepositoryError> {
        Ok(self
            .working
            .results
            .values()
            .filter(|r| r.product_id == parent)
            .cloned()
            .collect())
    }

    async fn create_result(
        &mut self,
        parent: ProductId,
        hash: &CombinationHash,
        child: ProductId,
        status: VariationLinkStatus,
    ) -> Result<VariationResult, RepositoryError> {
        if self.find_result(parent, hash).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "product {parent} already has a result for combination {hash}"
            )));
        }
        let result = VariationResult {
            id: VariationResultId::new(self.working.next_id()),
            product_id: parent,
            combination_hash: hash.clone(),
            result_id: child,
            status,
        };
        self.working.results.insert(result.id, result.clone());
        Ok(result)
    }

    async fn update_result(
        &mut self,
        id: VariationResultId,
        child: ProductId,
        status: VariationLinkStatus,
    ) -> Result<(), RepositoryError> {
        let result = self
            .working
            .results
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        result.result_id = child;
        result.status = status;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sku(s: &str) -> Sku {
        Sku::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let catalog = MemoryCatalog::new();
        {
            let mut tx = catalog.begin().await.unwrap();
            tx.create_supplier("Main", true).await.unwrap();
        }

        let mut tx = catalog.begin().await.unwrap();
        assert!(tx.get_supplier(SupplierId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_committed_transaction_is_visible() {
        let catalog = MemoryCatalog::new();
        let supplier = catalog.insert_supplier("Main", true).await.unwrap();

        let mut tx = catalog.begin().await.unwrap();
        let found = tx.get_supplier(supplier.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Main");
    }

    #[tokio::test]
    async fn test_live_sku_is_unique_but_tombstones_may_share_it() {
        let catalog = MemoryCatalog::new();
        let first = catalog
            .insert_product("Shirt", sku("shirt"), InheritedAttributes::default())
            .await
            .unwrap();

        let duplicate = catalog
            .insert_product("Other", sku("shirt"), InheritedAttributes::default())
            .await;
        assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));

        let mut tx = catalog.begin().await.unwrap();
        let mut tombstone = first.clone();
        tombstone.deleted = true;
        tx.update_product(&tombstone).await.unwrap();
        tx.commit().await.unwrap();

        let second = catalog
            .insert_product("Other", sku("shirt"), InheritedAttributes::default())
            .await
            .unwrap();

        let mut tx = catalog.begin().await.unwrap();
        let holders = tx.products_with_sku(&sku("shirt")).await.unwrap();
        assert_eq!(holders.len(), 2);
        assert_eq!(holders[0].id, second.id);
        assert!(holders[1].deleted);
    }

    #[tokio::test]
    async fn test_adjust_stock_accumulates() {
        let catalog = MemoryCatalog::new();
        let supplier = catalog.insert_supplier("Main", true).await.unwrap();
        let product = ProductId::new(99);

        let mut tx = catalog.begin().await.unwrap();
        tx.adjust_stock(supplier.id, product, Decimal::from(20))
            .await
            .unwrap();
        tx.adjust_stock(supplier.id, product, Decimal::from(-16))
            .await
            .unwrap();
        assert_eq!(
            tx.logical_count(supplier.id, product).await.unwrap(),
            Decimal::from(4)
        );
        tx.commit().await.unwrap();

        assert_eq!(catalog.stock_adjustments().await.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_variable_removes_values() {
        let catalog = MemoryCatalog::new();
        let mut tx = catalog.begin().await.unwrap();
        let color = tx
            .create_variable(VariableScope::Template, "color", "en", "Color")
            .await
            .unwrap();
        tx.create_value(color.id, "red", 0, "en", "Red").await.unwrap();
        assert_eq!(tx.list_values(&[color.id]).await.unwrap().len(), 1);

        tx.delete_variable(color.id).await.unwrap();
        assert!(tx.list_values(&[color.id]).await.unwrap().is_empty());
        assert!(tx.get_variable(color.id).await.unwrap().is_none());
    }
}
