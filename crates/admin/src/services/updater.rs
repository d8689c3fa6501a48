//! Combination reconciler: turns one submitted combination into a child product.
//!
//! The strategy is a trait object so deployments can swap the default
//! behavior without touching the batch services or the routes.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, info};

use product_variations_core::{
    CombinationHash, ProductMode, ShopId, Sku, SupplierId, VariationLinkStatus,
};

use super::VariationError;
use crate::db::{CatalogTx, ProductRepository, RepositoryError, StockLedger, VariationStore};
use crate::models::{ChildShopProduct, NewProduct, Product, ResolvedCombination, ShopProduct};

/// Shop, supplier and parent a batch is working on.
#[derive(Debug, Clone, Copy)]
pub struct VariationContext<'a> {
    pub shop: ShopId,
    /// Supplier named by the request, if any.
    pub supplier: Option<SupplierId>,
    pub parent: &'a Product,
    pub parent_shop_product: &'a ShopProduct,
    /// Language used to name children.
    pub language: &'a str,
}

impl VariationContext<'_> {
    /// The request's supplier, else the parent's only supplier in the shop.
    #[must_use]
    pub fn effective_supplier(&self) -> Option<SupplierId> {
        self.supplier
            .or_else(|| self.parent_shop_product.sole_supplier())
    }
}

/// One resolved combination and the values to apply to its child.
#[derive(Debug, Clone, Copy)]
pub struct CombinationUpdate<'a> {
    pub combination: &'a ResolvedCombination,
    pub sku: &'a Sku,
    /// New default price; `None` leaves the price untouched.
    pub price: Option<Decimal>,
    /// Absolute stock target; `None` leaves stock untouched.
    pub stock_count: Option<Decimal>,
}

/// Strategy creating, updating and hiding variation children.
#[async_trait]
pub trait VariationUpdater: Send + Sync {
    /// Reconcile a combination with its child product and shop product.
    ///
    /// # Errors
    ///
    /// Returns `VariationError::SkuConflict` if the SKU belongs to another
    /// product, `VariationError::ValidationFail` if the derived child is
    /// invalid, or `VariationError::Repository` on storage failures.
    async fn update_or_create_variation(
        &self,
        tx: &mut dyn CatalogTx,
        ctx: &VariationContext<'_>,
        update: &CombinationUpdate<'_>,
    ) -> Result<ChildShopProduct, VariationError>;

    /// Soft-delete a child and hide every result linking it to `parent`.
    ///
    /// # Errors
    ///
    /// Returns `VariationError::Repository` on storage failures.
    async fn delete_variation(
        &self,
        tx: &mut dyn CatalogTx,
        parent: &Product,
        child: &Product,
    ) -> Result<(), VariationError>;
}

/// Name of a child: `"{parent} - {Variable}:{Value} - ..."`.
#[must_use]
pub fn child_name(parent: &Product, combination: &ResolvedCombination, language: &str) -> String {
    let mut name = parent.name.clone();
    for part in combination.name_parts(language) {
        name.push_str(" - ");
        name.push_str(&part);
    }
    name
}

/// Reconciler used unless another strategy is injected.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultVariationUpdater;

impl DefaultVariationUpdater {
    /// Fail if a live product other than `owner` holds `sku`.
    async fn ensure_sku_available(
        tx: &mut dyn CatalogTx,
        sku: &Sku,
        owner: &Product,
    ) -> Result<(), VariationError> {
        let holders = tx.products_with_sku(sku).await?;
        if holders
            .iter()
            .any(|holder| holder.id != owner.id && holder.is_live())
        {
            return Err(VariationError::SkuConflict { sku: sku.clone() });
        }
        Ok(())
    }

    /// Reuse the child an existing result points at.
    async fn refresh_linked_child(
        tx: &mut dyn CatalogTx,
        ctx: &VariationContext<'_>,
        update: &CombinationUpdate<'_>,
        hash: &CombinationHash,
    ) -> Result<Option<Product>, VariationError> {
        let Some(result) = tx.find_result(ctx.parent.id, hash).await? else {
            return Ok(None);
        };

        let mut child = tx.get_product(result.result_id).await?.ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "variation result {} points at missing product {}",
                result.id, result.result_id
            ))
        })?;

        Self::ensure_sku_available(tx, update.sku, &child).await?;

        let hidden = !result.status.is_visible();
        if hidden {
            tx.update_result(result.id, child.id, VariationLinkStatus::Visible)
                .await?;
        }

        let mut changed = false;
        if child.sku != *update.sku {
            child.sku = update.sku.clone();
            changed = true;
        }
        if hidden || child.deleted {
            // A restored child takes the parent's current name and attributes
            child.name = child_name(ctx.parent, update.combination, ctx.language);
            child.attributes = ctx.parent.attributes.clone();
            child.deleted = false;
            child.validate()?;
            changed = true;
            info!(child_id = %child.id, "restored variation child");
        }
        if changed {
            tx.update_product(&child).await?;
        }

        Ok(Some(child))
    }

    /// Whether a soft-deleted SKU holder may be taken over for this shop and supplier.
    async fn can_recover(
        tx: &mut dyn CatalogTx,
        ctx: &VariationContext<'_>,
        holder: &Product,
        supplier: Option<SupplierId>,
    ) -> Result<bool, VariationError> {
        let recoverable = match tx.get_shop_product(ctx.shop, holder.id).await? {
            None => true,
            Some(shop_product) => supplier.is_some_and(|s| shop_product.has_supplier(s)),
        };
        Ok(recoverable)
    }

    /// Bring a soft-deleted product back as the child of this combination.
    async fn recover(
        tx: &mut dyn CatalogTx,
        ctx: &VariationContext<'_>,
        update: &CombinationUpdate<'_>,
        mut holder: Product,
    ) -> Result<Product, VariationError> {
        holder.name = child_name(ctx.parent, update.combination, ctx.language);
        holder.attributes = ctx.parent.attributes.clone();
        holder.deleted = false;
        holder.mode = ProductMode::VariationChild;
        holder.variation_parent_id = Some(ctx.parent.id);
        holder.validate()?;

        tx.update_product(&holder).await?;
        info!(child_id = %holder.id, sku = %holder.sku, "recovered soft-deleted product as variation child");
        Ok(holder)
    }

    /// Insert a fresh child for this combination.
    async fn create(
        tx: &mut dyn CatalogTx,
        ctx: &VariationContext<'_>,
        update: &CombinationUpdate<'_>,
    ) -> Result<Product, VariationError> {
        let new = NewProduct {
            name: child_name(ctx.parent, update.combination, ctx.language),
            sku: update.sku.clone(),
            mode: ProductMode::VariationChild,
            variation_parent_id: Some(ctx.parent.id),
            attributes: ctx.parent.attributes.clone(),
        };
        new.validate()?;

        let child = tx.create_product(new).await?;
        info!(child_id = %child.id, sku = %child.sku, "created variation child");
        Ok(child)
    }

    /// Point the parent's result for `hash` at `child` and mark the parent.
    async fn link_to_parent(
        tx: &mut dyn CatalogTx,
        ctx: &VariationContext<'_>,
        child: &Product,
        hash: &CombinationHash,
    ) -> Result<(), VariationError> {
        match tx.find_result(ctx.parent.id, hash).await? {
            Some(result) => {
                tx.update_result(result.id, child.id, VariationLinkStatus::Visible)
                    .await?;
            }
            None => {
                tx.create_result(ctx.parent.id, hash, child.id, VariationLinkStatus::Visible)
                    .await?;
            }
        }

        if ctx.parent.mode != ProductMode::VariableVariationParent {
            tx.set_product_mode(ctx.parent.id, ProductMode::VariableVariationParent)
                .await?;
        }
        Ok(())
    }

    /// Create the child's shop product if needed and sync suppliers, price and stock.
    async fn sync_shop_product(
        tx: &mut dyn CatalogTx,
        ctx: &VariationContext<'_>,
        update: &CombinationUpdate<'_>,
        child: &Product,
    ) -> Result<ShopProduct, VariationError> {
        let mut shop_product = match tx.get_shop_product(ctx.shop, child.id).await? {
            Some(shop_product) => shop_product,
            None => tx.create_shop_product(ctx.shop, child.id).await?,
        };

        if shop_product.suppliers != ctx.parent_shop_product.suppliers {
            tx.set_shop_product_suppliers(shop_product.id, &ctx.parent_shop_product.suppliers)
                .await?;
            shop_product
                .suppliers
                .clone_from(&ctx.parent_shop_product.suppliers);
        }

        if let Some(price) = update.price {
            tx.set_shop_product_price(shop_product.id, Some(price))
                .await?;
            shop_product.default_price = Some(price);
        }

        if let (Some(target), Some(supplier)) = (update.stock_count, ctx.effective_supplier()) {
            let current = tx.logical_count(supplier, child.id).await?;
            let delta = target - current;
            if !delta.is_zero() {
                tx.adjust_stock(supplier, child.id, delta).await?;
                debug!(child_id = %child.id, supplier_id = %supplier, %delta, "adjusted stock");
            }
        }

        Ok(shop_product)
    }
}

#[async_trait]
impl VariationUpdater for DefaultVariationUpdater {
    async fn update_or_create_variation(
        &self,
        tx: &mut dyn CatalogTx,
        ctx: &VariationContext<'_>,
        update: &CombinationUpdate<'_>,
    ) -> Result<ChildShopProduct, VariationError> {
        let hash = update.combination.hash();

        let child = match Self::refresh_linked_child(tx, ctx, update, &hash).await? {
            Some(child) => child,
            None => {
                let holders = tx.products_with_sku(update.sku).await?;
                if holders.iter().any(Product::is_live) {
                    return Err(VariationError::SkuConflict {
                        sku: update.sku.clone(),
                    });
                }
                let child = match holders.into_iter().next() {
                    Some(holder) => {
                        if Self::can_recover(tx, ctx, &holder, ctx.effective_supplier()).await? {
                            Self::recover(tx, ctx, update, holder).await?
                        } else {
                            Self::create(tx, ctx, update).await?
                        }
                    }
                    None => Self::create(tx, ctx, update).await?,
                };
                Self::link_to_parent(tx, ctx, &child, &hash).await?;
                child
            }
        };

        let shop_product = Self::sync_shop_product(tx, ctx, update, &child).await?;

        Ok(ChildShopProduct {
            product: child,
            shop_product,
        })
    }

    async fn delete_variation(
        &self,
        tx: &mut dyn CatalogTx,
        parent: &Product,
        child: &Product,
    ) -> Result<(), VariationError> {
        if child.is_live() {
            let mut tombstone = child.clone();
            tombstone.deleted = true;
            tx.update_product(&tombstone).await?;
        }

        for result in tx.list_results(parent.id).await? {
            if result.result_id == child.id && result.status.is_visible() {
                tx.update_result(result.id, child.id, VariationLinkStatus::Invisible)
                    .await?;
            }
        }

        info!(parent_id = %parent.id, child_id = %child.id, "deleted variation child");
        Ok(())
    }
}
