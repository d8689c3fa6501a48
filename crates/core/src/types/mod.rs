//! Core types for product variations.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod combination;
pub mod id;
pub mod sku;
pub mod slug;
pub mod status;

pub use combination::CombinationHash;
pub use id::*;
pub use sku::{Sku, SkuError};
pub use slug::slugify;
pub use status::*;
