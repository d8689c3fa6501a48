//! Catalog models touched by variation reconciliation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use product_variations_core::{
    ManufacturerId, ProductId, ProductMode, ProductState, ProductTypeId, SalesUnitId,
    ShippingMode, ShopId, ShopProductId, Sku, StockAdjustmentId, SupplierId, TaxClassId,
};

use super::combination::FieldErrors;

/// A product row (parent or variation child).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Stock keeping unit. Unique among live products.
    pub sku: Sku,
    /// Variation mode.
    pub mode: ProductMode,
    /// Parent product, for variation children.
    pub variation_parent_id: Option<ProductId>,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Attributes a variation child copies from its parent.
    pub attributes: InheritedAttributes,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Maximum length of a product name.
    pub const MAX_NAME_LENGTH: usize = 256;

    /// Lifecycle state derived from the soft-delete flag.
    #[must_use]
    pub const fn state(&self) -> ProductState {
        ProductState::from_deleted(self.deleted)
    }

    /// Returns true if the product is live (not soft-deleted).
    #[must_use]
    pub const fn is_live(&self) -> bool {
        !self.deleted
    }

    /// Validate the fields a save would persist.
    ///
    /// # Errors
    ///
    /// Returns per-field messages for an over-long name or negative
    /// dimensions and weights.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        validate_fields(&self.name, &self.attributes)
    }
}

fn validate_fields(name: &str, attributes: &InheritedAttributes) -> Result<(), FieldErrors> {
    let mut errors = attributes.validate();
    if name.chars().count() > Product::MAX_NAME_LENGTH {
        errors.add(
            "name",
            format!(
                "Ensure this value has at most {} characters.",
                Product::MAX_NAME_LENGTH
            ),
        );
    }
    errors.into_result()
}

/// Input for creating a product row.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: Sku,
    pub mode: ProductMode,
    pub variation_parent_id: Option<ProductId>,
    pub attributes: InheritedAttributes,
}

impl NewProduct {
    /// Validate the row before inserting it.
    ///
    /// # Errors
    ///
    /// Returns the same per-field messages as [`Product::validate`].
    pub fn validate(&self) -> Result<(), FieldErrors> {
        validate_fields(&self.name, &self.attributes)
    }
}

/// Attributes copied from a parent product onto its variation children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritedAttributes {
    pub tax_class_id: Option<TaxClassId>,
    pub sales_unit_id: Option<SalesUnitId>,
    pub shipping_mode: ShippingMode,
    pub product_type_id: Option<ProductTypeId>,
    pub manufacturer_id: Option<ManufacturerId>,
    pub width: Decimal,
    pub height: Decimal,
    pub depth: Decimal,
    pub net_weight: Decimal,
    pub gross_weight: Decimal,
}

impl InheritedAttributes {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        for (field, value) in [
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
            ("net_weight", self.net_weight),
            ("gross_weight", self.gross_weight),
        ] {
            if value < Decimal::ZERO {
                errors.add(field, "Ensure this value is greater than or equal to 0.");
            }
        }
        errors
    }
}

/// A product's presence in a shop, with price and suppliers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopProduct {
    pub id: ShopProductId,
    pub shop_id: ShopId,
    pub product_id: ProductId,
    /// Default price in the shop currency, if set.
    pub default_price: Option<Decimal>,
    /// Suppliers delivering this product in the shop, ordered by ID.
    pub suppliers: Vec<SupplierId>,
}

impl ShopProduct {
    /// The supplier, when exactly one is attached.
    #[must_use]
    pub fn sole_supplier(&self) -> Option<SupplierId> {
        match self.suppliers.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Returns true if `supplier` delivers this shop product.
    #[must_use]
    pub fn has_supplier(&self, supplier: SupplierId) -> bool {
        self.suppliers.contains(&supplier)
    }
}

/// A variation child together with its shop product.
#[derive(Debug, Clone)]
pub struct ChildShopProduct {
    pub product: Product,
    pub shop_product: ShopProduct,
}

/// A supplier holding stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    /// Whether stock counts are tracked for this supplier.
    pub stock_managed: bool,
}

/// A recorded relative stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub id: StockAdjustmentId,
    pub supplier_id: SupplierId,
    pub product_id: ProductId,
    pub delta: Decimal,
    pub created_at: DateTime<Utc>,
}
