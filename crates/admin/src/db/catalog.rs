//! Repository traits the variation services are written against.
//!
//! Every method runs inside a [`CatalogTx`] obtained from
//! [`CatalogBackend::begin`]. Dropping the transaction without calling
//! [`CatalogTx::commit`] discards every write made through it.

use async_trait::async_trait;
use rust_decimal::Decimal;

use product_variations_core::{
    CombinationHash, ProductId, ProductMode, ShopId, ShopProductId, Sku, SupplierId, VariableId,
    VariableValueId, VariationLinkStatus, VariationResultId,
};

use super::RepositoryError;
use crate::models::{
    ChildShopProduct, NewProduct, Product, ShopProduct, StockAdjustment, Supplier, Variable,
    VariableScope, VariableValue, VariationResult,
};

/// Product, shop product and supplier rows.
#[async_trait]
pub trait ProductRepository: Send {
    /// Get a product by ID, including soft-deleted rows.
    async fn get_product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Every product (live or soft-deleted) holding `sku`, live rows first.
    async fn products_with_sku(&mut self, sku: &Sku) -> Result<Vec<Product>, RepositoryError>;

    /// Insert a product row.
    async fn create_product(&mut self, product: NewProduct) -> Result<Product, RepositoryError>;

    /// Persist name, SKU, mode, parent link, soft-delete flag and attributes.
    async fn update_product(&mut self, product: &Product) -> Result<(), RepositoryError>;

    /// Change only the variation mode of a product.
    async fn set_product_mode(
        &mut self,
        id: ProductId,
        mode: ProductMode,
    ) -> Result<(), RepositoryError>;

    /// Get the shop product of `product` in `shop`.
    async fn get_shop_product(
        &mut self,
        shop: ShopId,
        product: ProductId,
    ) -> Result<Option<ShopProduct>, RepositoryError>;

    /// Insert a shop product without price or suppliers.
    async fn create_shop_product(
        &mut self,
        shop: ShopId,
        product: ProductId,
    ) -> Result<ShopProduct, RepositoryError>;

    /// Set or clear the default price of a shop product.
    async fn set_shop_product_price(
        &mut self,
        id: ShopProductId,
        price: Option<Decimal>,
    ) -> Result<(), RepositoryError>;

    /// Replace the supplier set of a shop product.
    async fn set_shop_product_suppliers(
        &mut self,
        id: ShopProductId,
        suppliers: &[SupplierId],
    ) -> Result<(), RepositoryError>;

    /// Live variation children of `parent` that have a shop product in `shop`.
    async fn list_child_shop_products(
        &mut self,
        parent: ProductId,
        shop: ShopId,
    ) -> Result<Vec<ChildShopProduct>, RepositoryError>;

    /// Get a supplier by ID.
    async fn get_supplier(&mut self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError>;

    /// Insert a supplier.
    async fn create_supplier(
        &mut self,
        name: &str,
        stock_managed: bool,
    ) -> Result<Supplier, RepositoryError>;
}

/// Per-supplier stock counts, changed only by relative adjustments.
#[async_trait]
pub trait StockLedger: Send {
    /// Current logical count, zero when nothing was recorded.
    async fn logical_count(
        &mut self,
        supplier: SupplierId,
        product: ProductId,
    ) -> Result<Decimal, RepositoryError>;

    /// Record a relative movement and update the logical count.
    async fn adjust_stock(
        &mut self,
        supplier: SupplierId,
        product: ProductId,
        delta: Decimal,
    ) -> Result<StockAdjustment, RepositoryError>;
}

/// Variables, values and the results keyed by combination hash.
#[async_trait]
pub trait VariationStore: Send {
    /// Variables of a scope ordered by `(ordering, id)`.
    async fn list_variables(
        &mut self,
        scope: VariableScope,
    ) -> Result<Vec<Variable>, RepositoryError>;

    /// Product-scoped variables of every product, ordered by `(product, ordering, id)`.
    async fn list_product_scoped_variables(&mut self) -> Result<Vec<Variable>, RepositoryError>;

    async fn get_variable(&mut self, id: VariableId) -> Result<Option<Variable>, RepositoryError>;

    /// Find a variable of `scope` by its name in `language_code`.
    async fn find_variable_by_name(
        &mut self,
        scope: VariableScope,
        language_code: &str,
        name: &str,
    ) -> Result<Option<Variable>, RepositoryError>;

    /// Find a variable of `scope` by identifier.
    async fn find_variable_by_identifier(
        &mut self,
        scope: VariableScope,
        identifier: &str,
    ) -> Result<Option<Variable>, RepositoryError>;

    /// Insert a variable at ordering 0 with a single translated name.
    async fn create_variable(
        &mut self,
        scope: VariableScope,
        identifier: &str,
        language_code: &str,
        name: &str,
    ) -> Result<Variable, RepositoryError>;

    async fn set_variable_ordering(
        &mut self,
        id: VariableId,
        ordering: i32,
    ) -> Result<(), RepositoryError>;

    async fn set_variable_name(
        &mut self,
        id: VariableId,
        language_code: &str,
        name: &str,
    ) -> Result<(), RepositoryError>;

    /// Delete a variable together with its values.
    async fn delete_variable(&mut self, id: VariableId) -> Result<(), RepositoryError>;

    /// Values of the given variables ordered by `(variable, ordering, id)`.
    async fn list_values(
        &mut self,
        variables: &[VariableId],
    ) -> Result<Vec<VariableValue>, RepositoryError>;

    async fn get_value(
        &mut self,
        id: VariableValueId,
    ) -> Result<Option<VariableValue>, RepositoryError>;

    /// Find a value of `variable` by its name in `language_code`.
    async fn find_value_by_name(
        &mut self,
        variable: VariableId,
        language_code: &str,
        name: &str,
    ) -> Result<Option<VariableValue>, RepositoryError>;

    /// Find a value of `variable` by identifier.
    async fn find_value_by_identifier(
        &mut self,
        variable: VariableId,
        identifier: &str,
    ) -> Result<Option<VariableValue>, RepositoryError>;

    /// Insert a value with a single translated name.
    async fn create_value(
        &mut self,
        variable: VariableId,
        identifier: &str,
        ordering: i32,
        language_code: &str,
        name: &str,
    ) -> Result<VariableValue, RepositoryError>;

    async fn set_value_ordering(
        &mut self,
        id: VariableValueId,
        ordering: i32,
    ) -> Result<(), RepositoryError>;

    async fn set_value_name(
        &mut self,
        id: VariableValueId,
        language_code: &str,
        name: &str,
    ) -> Result<(), RepositoryError>;

    async fn delete_value(&mut self, id: VariableValueId) -> Result<(), RepositoryError>;

    /// Get the result of `parent` for a combination hash.
    async fn find_result(
        &mut self,
        parent: ProductId,
        hash: &CombinationHash,
    ) -> Result<Option<VariationResult>, RepositoryError>;

    /// Every result of `parent`, ordered by ID.
    async fn list_results(
        &mut self,
        parent: ProductId,
    ) -> Result<Vec<VariationResult>, RepositoryError>;

    async fn create_result(
        &mut self,
        parent: ProductId,
        hash: &CombinationHash,
        child: ProductId,
        status: VariationLinkStatus,
    ) -> Result<VariationResult, RepositoryError>;

    /// Point a result at `child` with the given status.
    async fn update_result(
        &mut self,
        id: VariationResultId,
        child: ProductId,
        status: VariationLinkStatus,
    ) -> Result<(), RepositoryError>;
}

/// A unit of work over the whole catalog.
#[async_trait]
pub trait CatalogTx: ProductRepository + StockLedger + VariationStore + Send {
    /// Make every write of this transaction durable.
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Source of catalog transactions.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// Start a transaction.
    async fn begin(&self) -> Result<Box<dyn CatalogTx>, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}
