//! `PostgreSQL` catalog backend.
//!
//! Queries are checked at runtime (`query`/`query_as`) so the crate builds
//! without a live database. Every write happens inside the transaction held
//! by [`PgCatalogTx`]; dropping it rolls back.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use product_variations_core::{
    CombinationHash, ManufacturerId, ProductId, ProductMode, ProductTypeId, SalesUnitId,
    ShippingMode, ShopId, ShopProductId, Sku, StockAdjustmentId, SupplierId, TaxClassId,
    VariableId, VariableValueId, VariationLinkStatus, VariationResultId,
};

use super::RepositoryError;
use super::catalog::{CatalogBackend, CatalogTx, ProductRepository, StockLedger, VariationStore};
use crate::models::{
    ChildShopProduct, InheritedAttributes, NewProduct, Product, ShopProduct, StockAdjustment,
    Supplier, Translations, Variable, VariableScope, VariableValue, VariationResult,
};

// =============================================================================
// Query Fragments
// =============================================================================

macro_rules! product_query {
    ($tail:literal) => {
        concat!(
            "SELECT id, name, sku, mode, variation_parent_id, deleted, tax_class_id, \
             sales_unit_id, shipping_mode, product_type_id, manufacturer_id, width, height, \
             depth, net_weight, gross_weight, created_at FROM products ",
            $tail
        )
    };
}

macro_rules! shop_product_query {
    ($filter:literal) => {
        concat!(
            "SELECT sp.id, sp.shop_id, sp.product_id, sp.default_price, \
             COALESCE(ARRAY_AGG(sps.supplier_id ORDER BY sps.supplier_id) \
                 FILTER (WHERE sps.supplier_id IS NOT NULL), '{}') AS suppliers \
             FROM shop_products sp \
             JOIN products p ON p.id = sp.product_id \
             LEFT JOIN shop_product_suppliers sps ON sps.shop_product_id = sp.id \
             WHERE ",
            $filter,
            " GROUP BY sp.id ORDER BY sp.id"
        )
    };
}

macro_rules! variable_query {
    ($filter:literal) => {
        concat!(
            "SELECT v.id, v.product_id, v.identifier, v.ordering, \
             COALESCE(JSONB_OBJECT_AGG(t.language_code, t.name) \
                 FILTER (WHERE t.language_code IS NOT NULL), '{}'::jsonb) AS names \
             FROM variation_variables v \
             LEFT JOIN variation_variable_translations t ON t.variable_id = v.id \
             WHERE ",
            $filter,
            " GROUP BY v.id ORDER BY v.product_id NULLS FIRST, v.ordering, v.id"
        )
    };
}

macro_rules! value_query {
    ($filter:literal) => {
        concat!(
            "SELECT v.id, v.variable_id, v.identifier, v.ordering, \
             COALESCE(JSONB_OBJECT_AGG(t.language_code, t.name) \
                 FILTER (WHERE t.language_code IS NOT NULL), '{}'::jsonb) AS names \
             FROM variation_values v \
             LEFT JOIN variation_value_translations t ON t.value_id = v.id \
             WHERE ",
            $filter,
            " GROUP BY v.id ORDER BY v.variable_id, v.ordering, v.id"
        )
    };
}

const RESULT_COLUMNS: &str = "id, product_id, combination_hash, result_id, status";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    sku: Sku,
    mode: ProductMode,
    variation_parent_id: Option<ProductId>,
    deleted: bool,
    tax_class_id: Option<TaxClassId>,
    sales_unit_id: Option<SalesUnitId>,
    shipping_mode: ShippingMode,
    product_type_id: Option<ProductTypeId>,
    manufacturer_id: Option<ManufacturerId>,
    width: Decimal,
    height: Decimal,
    depth: Decimal,
    net_weight: Decimal,
    gross_weight: Decimal,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            sku: row.sku,
            mode: row.mode,
            variation_parent_id: row.variation_parent_id,
            deleted: row.deleted,
            attributes: InheritedAttributes {
                tax_class_id: row.tax_class_id,
                sales_unit_id: row.sales_unit_id,
                shipping_mode: row.shipping_mode,
                product_type_id: row.product_type_id,
                manufacturer_id: row.manufacturer_id,
                width: row.width,
                height: row.height,
                depth: row.depth,
                net_weight: row.net_weight,
                gross_weight: row.gross_weight,
            },
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ShopProductRow {
    id: ShopProductId,
    shop_id: ShopId,
    product_id: ProductId,
    default_price: Option<Decimal>,
    suppliers: Vec<i32>,
}

impl From<ShopProductRow> for ShopProduct {
    fn from(row: ShopProductRow) -> Self {
        Self {
            id: row.id,
            shop_id: row.shop_id,
            product_id: row.product_id,
            default_price: row.default_price,
            suppliers: row.suppliers.into_iter().map(SupplierId::new).collect(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SupplierRow {
    id: SupplierId,
    name: String,
    stock_managed: bool,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            stock_managed: row.stock_managed,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VariableRow {
    id: VariableId,
    product_id: Option<ProductId>,
    identifier: String,
    ordering: i32,
    names: Json<Translations>,
}

impl From<VariableRow> for Variable {
    fn from(row: VariableRow) -> Self {
        Self {
            id: row.id,
            scope: row
                .product_id
                .map_or(VariableScope::Template, VariableScope::Product),
            identifier: row.identifier,
            ordering: row.ordering,
            names: row.names.0,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ValueRow {
    id: VariableValueId,
    variable_id: VariableId,
    identifier: String,
    ordering: i32,
    names: Json<Translations>,
}

impl From<ValueRow> for VariableValue {
    fn from(row: ValueRow) -> Self {
        Self {
            id: row.id,
            variable_id: row.variable_id,
            identifier: row.identifier,
            ordering: row.ordering,
            names: row.names.0,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ResultRow {
    id: VariationResultId,
    product_id: ProductId,
    combination_hash: CombinationHash,
    result_id: ProductId,
    status: VariationLinkStatus,
}

impl From<ResultRow> for VariationResult {
    fn from(row: ResultRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            combination_hash: row.combination_hash,
            result_id: row.result_id,
            status: row.status,
        }
    }
}

/// Map unique violations to `Conflict`, everything else to `Database`.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => RepositoryError::Conflict(db.message().to_string()),
        _ => RepositoryError::Database(e),
    }
}

/// Fail with `NotFound` when an update touched no row.
const fn expect_row(rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

// =============================================================================
// Backend
// =============================================================================

/// Catalog stored in `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Create a backend over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogBackend for PgCatalog {
    async fn begin(&self) -> Result<Box<dyn CatalogTx>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgCatalogTx { tx }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Transaction over a [`PgCatalog`].
pub struct PgCatalogTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CatalogTx for PgCatalogTx {
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// Products
// =============================================================================

#[async_trait]
impl ProductRepository for PgCatalogTx {
    async fn get_product(&mut self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(product_query!("WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn products_with_sku(&mut self, sku: &Sku) -> Result<Vec<Product>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, ProductRow>(product_query!("WHERE sku = $1 ORDER BY deleted, id"))
                .bind(sku)
                .fetch_all(&mut *self.tx)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_product(&mut self, product: NewProduct) -> Result<Product, RepositoryError> {
        let attributes = &product.attributes;
        let row = sqlx::query_as::<_, ProductRow>(concat!(
            "INSERT INTO products (name, sku, mode, variation_parent_id, tax_class_id, \
             sales_unit_id, shipping_mode, product_type_id, manufacturer_id, width, height, \
             depth, net_weight, gross_weight) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING id, name, sku, mode, variation_parent_id, deleted, tax_class_id, \
             sales_unit_id, shipping_mode, product_type_id, manufacturer_id, width, height, \
             depth, net_weight, gross_weight, created_at"
        ))
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.mode)
        .bind(product.variation_parent_id)
        .bind(attributes.tax_class_id)
        .bind(attributes.sales_unit_id)
        .bind(attributes.shipping_mode)
        .bind(attributes.product_type_id)
        .bind(attributes.manufacturer_id)
        .bind(attributes.width)
        .bind(attributes.height)
        .bind(attributes.depth)
        .bind(attributes.net_weight)
        .bind(attributes.gross_weight)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_write_error)?;
        Ok(row.into())
    }

    async fn update_product(&mut self, product: &Product) -> Result<(), RepositoryError> {
        let attributes = &product.attributes;
        let result = sqlx::query(
            "UPDATE products SET name = $2, sku = $3, mode = $4, variation_parent_id = $5, \
             deleted = $6, tax_class_id = $7, sales_unit_id = $8, shipping_mode = $9, \
             product_type_id = $10, manufacturer_id = $11, width = $12, height = $13, \
             depth = $14, net_weight = $15, gross_weight = $16 \
             WHERE id = $1",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.mode)
        .bind(product.variation_parent_id)
        .bind(product.deleted)
        .bind(attributes.tax_class_id)
        .bind(attributes.sales_unit_id)
        .bind(attributes.shipping_mode)
        .bind(attributes.product_type_id)
        .bind(attributes.manufacturer_id)
        .bind(attributes.width)
        .bind(attributes.height)
        .bind(attributes.depth)
        .bind(attributes.net_weight)
        .bind(attributes.gross_weight)
        .execute(&mut *self.tx)
        .await
        .map_err(map_write_error)?;
        expect_row(result.rows_affected())
    }

    async fn set_product_mode(
        &mut self,
        id: ProductId,
        mode: ProductMode,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE products SET mode = $2 WHERE id = $1")
            .bind(id)
            .bind(mode)
            .execute(&mut *self.tx)
            .await?;
        expect_row(result.rows_affected())
    }

    async fn get_shop_product(
        &mut self,
        shop: ShopId,
        product: ProductId,
    ) -> Result<Option<ShopProduct>, RepositoryError> {
        let row = sqlx::query_as::<_, ShopProductRow>(shop_product_query!(
            "sp.shop_id = $1 AND sp.product_id = $2"
        ))
        .bind(shop)
        .bind(product)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn create_shop_product(
        &mut self,
        shop: ShopId,
        product: ProductId,
    ) -> Result<ShopProduct, RepositoryError> {
        let id: ShopProductId = sqlx::query_scalar(
            "INSERT INTO shop_products (shop_id, product_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(shop)
        .bind(product)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_write_error)?;

        Ok(ShopProduct {
            id,
            shop_id: shop,
            product_id: product,
            default_price: None,
            suppliers: Vec::new(),
        })
    }

    async fn set_shop_product_price(
        &mut self,
        id: ShopProductId,
        price: Option<Decimal>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop_products SET default_price = $2 WHERE id = $1")
            .bind(id)
            .bind(price)
            .execute(&mut *self.tx)
            .await?;
        expect_row(result.rows_affected())
    }

    async fn set_shop_product_suppliers(
        &mut self,
        id: ShopProductId,
        suppliers: &[SupplierId],
    ) -> Result<(), RepositoryError> {
        let supplier_ids: Vec<i32> = suppliers.iter().map(SupplierId::as_i32).collect();

        sqlx::query("DELETE FROM shop_product_suppliers WHERE shop_product_id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        sqlx::query(
            "INSERT INTO shop_product_suppliers (shop_product_id, supplier_id) \
             SELECT $1, UNNEST($2::int4[]) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(&supplier_ids)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn list_child_shop_products(
        &mut self,
        parent: ProductId,
        shop: ShopId,
    ) -> Result<Vec<ChildShopProduct>, RepositoryError> {
        let children: HashMap<ProductId, Product> = sqlx::query_as::<_, ProductRow>(
            product_query!("WHERE variation_parent_id = $1 AND NOT deleted"),
        )
        .bind(parent)
        .fetch_all(&mut *self.tx)
        .await?
        .into_iter()
        .map(|row| (row.id, Product::from(row)))
        .collect();

        let shop_products = sqlx::query_as::<_, ShopProductRow>(shop_product_query!(
            "sp.shop_id = $1 AND p.variation_parent_id = $2 AND NOT p.deleted"
        ))
        .bind(shop)
        .bind(parent)
        .fetch_all(&mut *self.tx)
        .await?;

        shop_products
            .into_iter()
            .map(|row| {
                let product = children.get(&row.product_id).cloned().ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "shop product {} lost its child product",
                        row.id
                    ))
                })?;
                Ok(ChildShopProduct {
                    product,
                    shop_product: row.into(),
                })
            })
            .collect()
    }

    async fn get_supplier(&mut self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let row = sqlx::query_as::<_, SupplierRow>(
            "SELECT id, name, stock_managed FROM suppliers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn create_supplier(
        &mut self,
        name: &str,
        stock_managed: bool,
    ) -> Result<Supplier, RepositoryError> {
        let row = sqlx::query_as::<_, SupplierRow>(
            "INSERT INTO suppliers (name, stock_managed) VALUES ($1, $2) \
             RETURNING id, name, stock_managed",
        )
        .bind(name)
        .bind(stock_managed)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row.into())
    }
}

// =============================================================================
// Stock
// =============================================================================

#[async_trait]
impl StockLedger for PgCatalogTx {
    async fn logical_count(
        &mut self,
        supplier: SupplierId,
        product: ProductId,
    ) -> Result<Decimal, RepositoryError> {
        let count: Option<Decimal> = sqlx::query_scalar(
            "SELECT logical_count FROM stock_counts WHERE supplier_id = $1 AND product_id = $2",
        )
        .bind(supplier)
        .bind(product)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(count.unwrap_or_default())
    }

    async fn adjust_stock(
        &mut self,
        supplier: SupplierId,
        product: ProductId,
        delta: Decimal,
    ) -> Result<StockAdjustment, RepositoryError> {
        let (id, created_at): (StockAdjustmentId, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO stock_adjustments (supplier_id, product_id, delta) \
             VALUES ($1, $2, $3) RETURNING id, created_at",
        )
        .bind(supplier)
        .bind(product)
        .bind(delta)
        .fetch_one(&mut *self.tx)
        .await?;

        sqlx::query(
            "INSERT INTO stock_counts (supplier_id, product_id, logical_count) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (supplier_id, product_id) \
             DO UPDATE SET logical_count = stock_counts.logical_count + EXCLUDED.logical_count",
        )
        .bind(supplier)
        .bind(product)
        .bind(delta)
        .execute(&mut *self.tx)
        .await?;

        Ok(StockAdjustment {
            id,
            supplier_id: supplier,
            product_id: product,
            delta,
            created_at,
        })
    }
}

// =============================================================================
// Variations
// =============================================================================

#[async_trait]
impl VariationStore for PgCatalogTx {
    async fn list_variables(
        &mut self,
        scope: VariableScope,
    ) -> Result<Vec<Variable>, RepositoryError> {
        let rows = sqlx::query_as::<_, VariableRow>(variable_query!(
            "v.product_id IS NOT DISTINCT FROM $1"
        ))
        .bind(scope.product_id())
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_product_scoped_variables(&mut self) -> Result<Vec<Variable>, RepositoryError> {
        let rows = sqlx::query_as::<_, VariableRow>(variable_query!("v.product_id IS NOT NULL"))
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_variable(&mut self, id: VariableId) -> Result<Option<Variable>, RepositoryError> {
        let row = sqlx::query_as::<_, VariableRow>(variable_query!("v.id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find_variable_by_name(
        &mut self,
        scope: VariableScope,
        language_code: &str,
        name: &str,
    ) -> Result<Option<Variable>, RepositoryError> {
        let row = sqlx::query_as::<_, VariableRow>(variable_query!(
            "v.product_id IS NOT DISTINCT FROM $1 AND EXISTS ( \
                 SELECT 1 FROM variation_variable_translations n \
                 WHERE n.variable_id = v.id AND n.language_code = $2 AND n.name = $3)"
        ))
        .bind(scope.product_id())
        .bind(language_code)
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn find_variable_by_identifier(
        &mut self,
        scope: VariableScope,
        identifier: &str,
    ) -> Result<Option<Variable>, RepositoryError> {
        let row = sqlx::query_as::<_, VariableRow>(variable_query!(
            "v.product_id IS NOT DISTINCT FROM $1 AND v.identifier = $2"
        ))
        .bind(scope.product_id())
        .bind(identifier)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn create_variable(
        &mut self,
        scope: VariableScope,
        identifier: &str,
        language_code: &str,
        name: &str,
    ) -> Result<Variable, RepositoryError> {
        let id: VariableId = sqlx::query_scalar(
            "INSERT INTO variation_variables (product_id, identifier) VALUES ($1, $2) RETURNING id",
        )
        .bind(scope.product_id())
        .bind(identifier)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_write_error)?;

        self.set_variable_name(id, language_code, name).await?;

        Ok(Variable {
            id,
            scope,
            identifier: identifier.to_string(),
            ordering: 0,
            names: Translations::single(language_code, name),
        })
    }

    async fn set_variable_ordering(
        &mut self,
        id: VariableId,
        ordering: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE variation_variables SET ordering = $2 WHERE id = $1")
            .bind(id)
            .bind(ordering)
            .execute(&mut *self.tx)
            .await?;
        expect_row(result.rows_affected())
    }

    async fn set_variable_name(
        &mut self,
        id: VariableId,
        language_code: &str,
        name: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO variation_variable_translations (variable_id, language_code, name) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (variable_id, language_code) DO UPDATE SET name = EXCLUDED.name",
        )
        .bind(id)
        .bind(language_code)
        .bind(name)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_variable(&mut self, id: VariableId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM variation_variables WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn list_values(
        &mut self,
        variables: &[VariableId],
    ) -> Result<Vec<VariableValue>, RepositoryError> {
        let variable_ids: Vec<i32> = variables.iter().map(VariableId::as_i32).collect();
        let rows = sqlx::query_as::<_, ValueRow>(value_query!("v.variable_id = ANY($1)"))
            .bind(&variable_ids)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_value(
        &mut self,
        id: VariableValueId,
    ) -> Result<Option<VariableValue>, RepositoryError> {
        let row = sqlx::query_as::<_, ValueRow>(value_query!("v.id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find_value_by_name(
        &mut self,
        variable: VariableId,
        language_code: &str,
        name: &str,
    ) -> Result<Option<VariableValue>, RepositoryError> {
        let row = sqlx::query_as::<_, ValueRow>(value_query!(
            "v.variable_id = $1 AND EXISTS ( \
                 SELECT 1 FROM variation_value_translations n \
                 WHERE n.value_id = v.id AND n.language_code = $2 AND n.name = $3)"
        ))
        .bind(variable)
        .bind(language_code)
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn find_value_by_identifier(
        &mut self,
        variable: VariableId,
        identifier: &str,
    ) -> Result<Option<VariableValue>, RepositoryError> {
        let row = sqlx::query_as::<_, ValueRow>(value_query!(
            "v.variable_id = $1 AND v.identifier = $2"
        ))
        .bind(variable)
        .bind(identifier)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn create_value(
        &mut self,
        variable: VariableId,
        identifier: &str,
        ordering: i32,
        language_code: &str,
        name: &str,
    ) -> Result<VariableValue, RepositoryError> {
        let id: VariableValueId = sqlx::query_scalar(
            "INSERT INTO variation_values (variable_id, identifier, ordering) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(variable)
        .bind(identifier)
        .bind(ordering)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_write_error)?;

        self.set_value_name(id, language_code, name).await?;

        Ok(VariableValue {
            id,
            variable_id: variable,
            identifier: identifier.to_string(),
            ordering,
            names: Translations::single(language_code, name),
        })
    }

    async fn set_value_ordering(
        &mut self,
        id: VariableValueId,
        ordering: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE variation_values SET ordering = $2 WHERE id = $1")
            .bind(id)
            .bind(ordering)
            .execute(&mut *self.tx)
            .await?;
        expect_row(result.rows_affected())
    }

    async fn set_value_name(
        &mut self,
        id: VariableValueId,
        language_code: &str,
        name: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO variation_value_translations (value_id, language_code, name) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (value_id, language_code) DO UPDATE SET name = EXCLUDED.name",
        )
        .bind(id)
        .bind(language_code)
        .bind(name)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_value(&mut self, id: VariableValueId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM variation_values WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn find_result(
        &mut self,
        parent: ProductId,
        hash: &CombinationHash,
    ) -> Result<Option<VariationResult>, RepositoryError> {
        let sql = format!(
            "SELECT {RESULT_COLUMNS} FROM product_variation_results \
             WHERE product_id = $1 AND combination_hash = $2"
        );
        let row = sqlx::query_as::<_, ResultRow>(&sql)
            .bind(parent)
            .bind(hash)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_results(
        &mut self,
        parent: ProductId,
    ) -> Result<Vec<VariationResult>, RepositoryError> {
        let sql = format!(
            "SELECT {RESULT_COLUMNS} FROM product_variation_results \
             WHERE product_id = $1 ORDER BY id"
        );
        let rows = sqlx::query_as::<_, ResultRow>(&sql)
            .bind(parent)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_result(
        &mut self,
        parent: ProductId,
        hash: &CombinationHash,
        child: ProductId,
        status: VariationLinkStatus,
    ) -> Result<VariationResult, RepositoryError> {
        let sql = format!(
            "INSERT INTO product_variation_results (product_id, combination_hash, result_id, status) \
             VALUES ($1, $2, $3, $4) RETURNING {RESULT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ResultRow>(&sql)
            .bind(parent)
            .bind(hash)
            .bind(child)
            .bind(status)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_write_error)?;
        Ok(row.into())
    }

    async fn update_result(
        &mut self,
        id: VariationResultId,
        child: ProductId,
        status: VariationLinkStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE product_variation_results SET result_id = $2, status = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(child)
        .bind(status)
        .execute(&mut *self.tx)
        .await?;
        expect_row(result.rows_affected())
    }
}
