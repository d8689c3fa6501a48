//! Status and mode enums for catalog and variation entities.

use serde::{Deserialize, Serialize};

/// Visibility of a variation result (parent, combination) -> child link.
///
/// Results are never removed once a combination has been used; hiding a
/// combination flips the link to `Invisible` so the child can be recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "variation_link_status", rename_all = "snake_case")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariationLinkStatus {
    #[default]
    Visible,
    Invisible,
}

impl VariationLinkStatus {
    /// Returns true if the link is visible.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}

/// Product mode with respect to variations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "product_mode", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProductMode {
    /// A plain product without variations.
    #[default]
    Normal,
    /// A parent whose children are addressed by variable/value combinations.
    VariableVariationParent,
    /// A child generated from a parent's combination.
    VariationChild,
}

impl ProductMode {
    /// Returns true if a product in this mode may own variation children.
    #[must_use]
    pub const fn can_be_parent(self) -> bool {
        !matches!(self, Self::VariationChild)
    }
}

/// Lifecycle of a product row.
///
/// Products are never hard-deleted; a tombstoned row can be recovered and
/// relinked when its SKU is reused for a variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductState {
    Active,
    Tombstoned,
}

impl ProductState {
    /// Map the stored soft-delete flag to a state.
    #[must_use]
    pub const fn from_deleted(deleted: bool) -> Self {
        if deleted { Self::Tombstoned } else { Self::Active }
    }

    /// Returns true if the row is soft-deleted.
    #[must_use]
    pub const fn is_tombstoned(self) -> bool {
        matches!(self, Self::Tombstoned)
    }
}

/// Shipping mode inherited by variation children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shipping_mode", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMode {
    #[default]
    Shipped,
    NotShipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_status_serializes_uppercase() {
        let json = serde_json::to_string(&VariationLinkStatus::Invisible).unwrap_or_default();
        assert_eq!(json, "\"INVISIBLE\"");
    }

    #[test]
    fn test_variation_child_cannot_be_parent() {
        assert!(ProductMode::Normal.can_be_parent());
        assert!(ProductMode::VariableVariationParent.can_be_parent());
        assert!(!ProductMode::VariationChild.can_be_parent());
    }

    #[test]
    fn test_product_state_from_deleted_flag() {
        assert_eq!(ProductState::from_deleted(false), ProductState::Active);
        assert!(ProductState::from_deleted(true).is_tombstoned());
    }
}
