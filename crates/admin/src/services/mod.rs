//! Business logic services for the variations admin.
//!
//! # Services
//!
//! - `updater` - Reconciles one combination with its child product
//! - `combinations` - Batch save/delete and listing of a parent's combinations
//! - `attributes` - Detail views of single variables and values
//! - `templates` - Global variation templates

pub mod attributes;
pub mod combinations;
pub mod error;
pub mod templates;
pub mod updater;

pub use attributes::{AttributeOwner, AttributeService};
pub use combinations::{CombinationService, ShopScope};
pub use error::VariationError;
pub use templates::TemplateService;
pub use updater::{
    CombinationUpdate, DefaultVariationUpdater, VariationContext, VariationUpdater, child_name,
};
