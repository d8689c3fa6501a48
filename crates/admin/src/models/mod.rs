//! Domain models for the variations admin.
//!
//! - [`product`] - Catalog rows the variation logic reads and writes
//!   (products, shop products, suppliers, stock adjustments)
//! - [`variation`] - Variables, values, translations and variation results
//! - [`combination`] - Request inputs and listing outputs for combinations

pub mod combination;
pub mod product;
pub mod variation;

pub use combination::{
    CombinationEntry, CombinationInput, CombinationListing, CombinationSummary, DeleteInput,
    DeleteTarget, FieldErrors, NON_FIELD_ERRORS, ProductData, SavedCombination,
};
pub use product::{
    ChildShopProduct, InheritedAttributes, NewProduct, Product, ShopProduct, StockAdjustment,
    Supplier,
};
pub use variation::{
    AttributeDetail, AttributeUpdate, LanguageName, PopulateSummary, ResolvedCombination,
    TemplateDelete, TemplateInput, TemplateSummary, Translations, ValueSummary, Variable,
    VariableScope, VariableSummary, VariableValue, VariationListing, VariationResult,
};
