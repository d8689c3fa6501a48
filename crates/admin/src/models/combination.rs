//! Request inputs and listing outputs for variation combinations.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use product_variations_core::{CombinationHash, ProductId, ShopProductId, Sku};

/// Key for messages that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Validation messages keyed by field path (e.g. `1.sku`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Errors holding a single message for `field`.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    /// Errors holding a single message not tied to a field.
    #[must_use]
    pub fn non_field(message: impl Into<String>) -> Self {
        Self::single(NON_FIELD_ERRORS, message)
    }

    /// Record a message for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Merge `other`, prefixing each field with `prefix.`.
    pub fn extend_prefixed(&mut self, prefix: &str, other: Self) {
        for (field, messages) in other.0 {
            self.0
                .entry(format!("{prefix}.{field}"))
                .or_default()
                .extend(messages);
        }
    }

    /// Returns true if no message was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if `field` has at least one message.
    #[must_use]
    pub fn contains_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if any message was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                write!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

/// A submitted combination entry, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationInput {
    /// Variable name to value name.
    pub combination: BTreeMap<String, String>,
    pub sku: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock_count: Option<i64>,
}

impl CombinationInput {
    /// Check the entry and convert it into a [`CombinationEntry`].
    ///
    /// # Errors
    ///
    /// Returns per-field messages for an empty combination, blank names,
    /// an invalid SKU or a negative price.
    pub fn validate(self) -> Result<CombinationEntry, FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.combination.is_empty() {
            errors.add("combination", "This field is required.");
        }
        if self
            .combination
            .iter()
            .any(|(variable, value)| variable.trim().is_empty() || value.trim().is_empty())
        {
            errors.add("combination", "Variable and value names may not be blank.");
        }

        let sku = match Sku::parse(&self.sku) {
            Ok(sku) => Some(sku),
            Err(e) => {
                errors.add("sku", e.to_string());
                None
            }
        };

        if self.price.is_some_and(|price| price < Decimal::ZERO) {
            errors.add("price", "Ensure this value is greater than or equal to 0.");
        }

        match (sku, errors.into_result()) {
            (Some(sku), Ok(())) => Ok(CombinationEntry {
                combination: self
                    .combination
                    .into_iter()
                    .map(|(variable, value)| (variable.trim().to_string(), value.trim().to_string()))
                    .collect(),
                sku,
                price: self.price,
                stock_count: self.stock_count.map(Decimal::from),
            }),
            (_, Err(errors)) => Err(errors),
            (None, Ok(())) => Err(FieldErrors::single("sku", "This field is required.")),
        }
    }
}

/// A validated combination entry ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinationEntry {
    pub combination: BTreeMap<String, String>,
    pub sku: Sku,
    pub price: Option<Decimal>,
    pub stock_count: Option<Decimal>,
}

/// A reconciled entry echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCombination {
    pub combination: BTreeMap<String, String>,
    pub sku: Sku,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_count: Option<Decimal>,
    pub product_id: ProductId,
}

/// A combination to remove, addressed by its names or by the child's SKU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteInput {
    #[serde(default)]
    pub combination: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub sku: Option<String>,
}

/// How a delete entry locates its variation child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Combination(BTreeMap<String, String>),
    Sku(Sku),
}

impl DeleteInput {
    /// Pick the lookup for this entry; a combination wins over a SKU.
    ///
    /// # Errors
    ///
    /// Returns a non-field message when neither is given, or the SKU error.
    pub fn target(self) -> Result<DeleteTarget, FieldErrors> {
        if let Some(combination) = self.combination.filter(|c| !c.is_empty()) {
            return Ok(DeleteTarget::Combination(combination));
        }
        match self.sku.filter(|sku| !sku.trim().is_empty()) {
            Some(sku) => Sku::parse(&sku)
                .map(DeleteTarget::Sku)
                .map_err(|e| FieldErrors::single("sku", e.to_string())),
            None => Err(FieldErrors::non_field(
                "Either combination or SKU must be informed.",
            )),
        }
    }
}

/// A visible combination of a parent in the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationSummary {
    /// The child product realizing the combination.
    pub product: ProductId,
    pub sku_part: String,
    pub hash: CombinationHash,
    /// Variable name to value name.
    pub combination: BTreeMap<String, String>,
}

/// Shop data of a variation child in the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductData {
    /// The child's shop product ID.
    pub pk: ShopProductId,
    pub product_id: ProductId,
    pub sku: Sku,
    pub price: Option<Decimal>,
    /// Present only when the supplier manages stock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_count: Option<Decimal>,
}

/// Combinations of a parent and the shop data of their children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinationListing {
    pub combinations: Vec<CombinationSummary>,
    pub product_data: Vec<ProductData>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(sku: &str) -> CombinationInput {
        CombinationInput {
            combination: BTreeMap::from([
                ("Color".to_string(), "Red".to_string()),
                ("Size".to_string(), "L".to_string()),
            ]),
            sku: sku.to_string(),
            price: None,
            stock_count: None,
        }
    }

    #[test]
    fn test_validate_accepts_minimal_entry() {
        let entry = input("red-l").validate().unwrap();
        assert_eq!(entry.sku.as_str(), "red-l");
        assert_eq!(entry.combination.len(), 2);
        assert!(entry.price.is_none());
    }

    #[test]
    fn test_validate_collects_every_field_error() {
        let mut bad = input(" ");
        bad.combination.clear();
        bad.price = Some(Decimal::new(-5, 1));

        let errors = bad.validate().unwrap_err();
        assert!(errors.contains_field("sku"));
        assert!(errors.contains_field("combination"));
        assert!(errors.contains_field("price"));
    }

    #[test]
    fn test_validate_rejects_blank_names() {
        let mut bad = input("red-l");
        bad.combination.insert("Material".to_string(), "  ".to_string());
        assert!(bad.validate().unwrap_err().contains_field("combination"));
    }

    #[test]
    fn test_input_accepts_numeric_and_string_prices() {
        let numeric: CombinationInput = serde_json::from_str(
            r#"{"combination": {"Color": "Red"}, "sku": "a", "price": 15.5, "stock_count": 20}"#,
        )
        .unwrap();
        assert_eq!(numeric.price, Some(Decimal::new(155, 1)));
        assert_eq!(numeric.stock_count, Some(20));

        let text: CombinationInput =
            serde_json::from_str(r#"{"combination": {"Color": "Red"}, "sku": "a", "price": "3.5"}"#)
                .unwrap();
        assert_eq!(text.price, Some(Decimal::new(35, 1)));
        assert_eq!(text.stock_count, None);
    }

    #[test]
    fn test_field_errors_prefix_and_display() {
        let mut errors = FieldErrors::default();
        errors.extend_prefixed("2", FieldErrors::single("sku", "SKU cannot be blank"));
        assert!(errors.contains_field("2.sku"));
        assert_eq!(errors.to_string(), "2.sku: SKU cannot be blank");
    }

    #[test]
    fn test_delete_target() {
        let by_sku = DeleteInput {
            combination: None,
            sku: Some("red-xl".to_string()),
        };
        assert_eq!(
            by_sku.target().unwrap(),
            DeleteTarget::Sku(Sku::parse("red-xl").unwrap())
        );

        let by_combination = DeleteInput {
            combination: Some(BTreeMap::from([("Color".to_string(), "Red".to_string())])),
            sku: Some("ignored".to_string()),
        };
        assert!(matches!(
            by_combination.target().unwrap(),
            DeleteTarget::Combination(_)
        ));

        let neither = DeleteInput::default().target().unwrap_err();
        assert!(neither.contains_field(NON_FIELD_ERRORS));
    }
}
