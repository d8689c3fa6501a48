//! Variation variables, values and the results linking combinations to children.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use product_variations_core::{
    CombinationHash, ProductId, VariableId, VariableValueId, VariationLinkStatus,
    VariationResultId,
};

/// Owner of a variation variable.
///
/// Product-scoped variables belong to one parent and generate its children.
/// Template variables are shared across the catalog and only serve as presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "product_id")]
pub enum VariableScope {
    Product(ProductId),
    Template,
}

impl VariableScope {
    /// The owning product for product-scoped variables.
    #[must_use]
    pub const fn product_id(self) -> Option<ProductId> {
        match self {
            Self::Product(id) => Some(id),
            Self::Template => None,
        }
    }
}

/// Display names keyed by language code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translations(BTreeMap<String, String>);

impl Translations {
    /// Translations holding a single name.
    #[must_use]
    pub fn single(language_code: &str, name: &str) -> Self {
        let mut translations = Self::default();
        translations.set(language_code, name);
        translations
    }

    /// Name in the given language, if translated.
    #[must_use]
    pub fn get(&self, language_code: &str) -> Option<&str> {
        self.0.get(language_code).map(String::as_str)
    }

    /// Name in the given language, falling back to any available name.
    #[must_use]
    pub fn display(&self, language_code: &str) -> &str {
        self.get(language_code)
            .or_else(|| self.0.values().next().map(String::as_str))
            .unwrap_or_default()
    }

    /// Set the name for a language.
    pub fn set(&mut self, language_code: &str, name: &str) {
        self.0.insert(language_code.to_string(), name.to_string());
    }

    /// Iterate over `(language_code, name)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(code, name)| (code.as_str(), name.as_str()))
    }
}

/// A variation variable such as "Color".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
    pub scope: VariableScope,
    /// Slug used for equality independent of the display name.
    pub identifier: String,
    pub ordering: i32,
    pub names: Translations,
}

/// A value of a variation variable such as "Red".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableValue {
    pub id: VariableValueId,
    pub variable_id: VariableId,
    /// Slug, unique within the variable.
    pub identifier: String,
    pub ordering: i32,
    pub names: Translations,
}

/// Link from a parent's combination to the child product realizing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationResult {
    pub id: VariationResultId,
    /// The parent product.
    pub product_id: ProductId,
    pub combination_hash: CombinationHash,
    /// The child product.
    pub result_id: ProductId,
    pub status: VariationLinkStatus,
}

/// A combination whose names have been resolved to stored variables and values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedCombination {
    pairs: Vec<(Variable, VariableValue)>,
}

impl ResolvedCombination {
    /// Wrap resolved pairs, sorted by variable `(ordering, id)`.
    #[must_use]
    pub fn new(mut pairs: Vec<(Variable, VariableValue)>) -> Self {
        pairs.sort_by_key(|(variable, _)| (variable.ordering, variable.id));
        Self { pairs }
    }

    /// The resolved pairs, sorted by variable `(ordering, id)`.
    #[must_use]
    pub fn pairs(&self) -> &[(Variable, VariableValue)] {
        &self.pairs
    }

    /// Returns true if no pair was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Order-independent lookup key for this combination.
    #[must_use]
    pub fn hash(&self) -> CombinationHash {
        CombinationHash::from_pairs(
            self.pairs
                .iter()
                .map(|(variable, value)| (variable.id, value.id)),
        )
    }

    /// `Variable:Value` parts used to name the child product.
    #[must_use]
    pub fn name_parts(&self, language_code: &str) -> Vec<String> {
        self.pairs
            .iter()
            .map(|(variable, value)| {
                format!(
                    "{}:{}",
                    variable.names.display(language_code),
                    value.names.display(language_code)
                )
            })
            .collect()
    }
}

/// Variable name and ordering in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSummary {
    pub name: String,
    pub order: i32,
}

/// Value entry in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSummary {
    pub id: VariableValueId,
    pub order: i32,
    pub name: String,
}

/// Variables and their values, keyed by variable ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationListing {
    pub variables: BTreeMap<VariableId, VariableSummary>,
    pub values: BTreeMap<VariableId, Vec<ValueSummary>>,
}

impl VariationListing {
    /// Build a listing from variables and values sorted by `(ordering, id)`.
    #[must_use]
    pub fn build(variables: &[Variable], values: &[VariableValue], language_code: &str) -> Self {
        let mut listing = Self::default();
        for variable in variables {
            listing.variables.insert(
                variable.id,
                VariableSummary {
                    name: variable.names.display(language_code).to_string(),
                    order: variable.ordering,
                },
            );
        }
        for value in values {
            if !listing.variables.contains_key(&value.variable_id) {
                continue;
            }
            listing
                .values
                .entry(value.variable_id)
                .or_default()
                .push(ValueSummary {
                    id: value.id,
                    order: value.ordering,
                    name: value.names.display(language_code).to_string(),
                });
        }
        listing
    }
}

/// One language's entry in an attribute detail response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageName {
    pub language_name: String,
    pub name: String,
}

/// Names of a variable or value in every configured language.
pub type AttributeDetail = BTreeMap<String, LanguageName>;

/// Change applied to a variable or value through its detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeUpdate {
    /// Move the attribute to a new position.
    Ordering { ordering: i32 },
    /// Set the display name in one language.
    Translation { language_code: String, name: String },
}

/// Result of upserting a template variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: VariableId,
    pub name: String,
    pub values: Vec<String>,
}

/// Request body for upserting a template variable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateInput {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Request body for deleting a template variable by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateDelete {
    pub name: String,
}

/// Counts from copying product variables into templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PopulateSummary {
    pub variables_created: usize,
    pub values_created: usize,
}
