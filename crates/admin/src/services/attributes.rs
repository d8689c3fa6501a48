//! Detail views of single variables and values.
//!
//! The same operations serve product-scoped attributes, which are visible
//! only through their parent's shop and supplier scope, and template
//! attributes, which are global.

use std::sync::Arc;

use tracing::{info, instrument};

use product_variations_core::{VariableId, VariableValueId};

use super::VariationError;
use super::combinations::{ShopScope, load_parent};
use crate::config::VariationSettings;
use crate::db::{CatalogBackend, CatalogTx, VariationStore};
use crate::models::{
    AttributeDetail, AttributeUpdate, LanguageName, Translations, Variable, VariableScope,
};

/// Which flavor of attribute a request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOwner {
    /// Variables owned by a parent the request's shop scope can see.
    Product(ShopScope),
    /// Global template variables.
    Template,
}

/// Service for reading and editing one variable or value.
#[derive(Clone)]
pub struct AttributeService {
    backend: Arc<dyn CatalogBackend>,
    settings: VariationSettings,
}

impl AttributeService {
    /// Create a new attribute service.
    #[must_use]
    pub fn new(backend: Arc<dyn CatalogBackend>, settings: VariationSettings) -> Self {
        Self { backend, settings }
    }

    /// Names of a variable in every configured language.
    ///
    /// # Errors
    ///
    /// Returns `VariationError::NotFound` if the variable does not exist for
    /// the owner and `VariationError::ProductNotFound` if its parent is not
    /// visible.
    #[instrument(skip(self))]
    pub async fn variable_detail(
        &self,
        owner: AttributeOwner,
        id: VariableId,
    ) -> Result<AttributeDetail, VariationError> {
        let mut tx = self.backend.begin().await?;
        let variable = load_variable(tx.as_mut(), owner, id).await?;
        Ok(self.detail(&variable.names))
    }

    /// Reorder or rename a variable.
    ///
    /// # Errors
    ///
    /// Returns `VariationError::ValidationFail` for an unknown language or a
    /// blank name, plus the lookup errors of [`Self::variable_detail`].
    #[instrument(skip(self))]
    pub async fn update_variable(
        &self,
        owner: AttributeOwner,
        id: VariableId,
        update: AttributeUpdate,
    ) -> Result<(), VariationError> {
        self.validate(&update)?;
        let mut tx = self.backend.begin().await?;
        let variable = load_variable(tx.as_mut(), owner, id).await?;
        match &update {
            AttributeUpdate::Ordering { ordering } => {
                tx.set_variable_ordering(variable.id, *ordering).await?;
            }
            AttributeUpdate::Translation {
                language_code,
                name,
            } => {
                tx.set_variable_name(variable.id, language_code, name.trim())
                    .await?;
            }
        }
        tx.commit().await?;
        info!(variable_id = %id, "updated variable");
        Ok(())
    }

    /// Names of a value in every configured language.
    ///
    /// # Errors
    ///
    /// Returns `VariationError::NotFound` if the value does not exist for the
    /// owner and `VariationError::ProductNotFound` if its parent is not
    /// visible.
    #[instrument(skip(self))]
    pub async fn value_detail(
        &self,
        owner: AttributeOwner,
        id: VariableValueId,
    ) -> Result<AttributeDetail, VariationError> {
        let mut tx = self.backend.begin().await?;
        let names = load_value_names(tx.as_mut(), owner, id).await?;
        Ok(self.detail(&names))
    }

    /// Reorder or rename a value.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_variable`].
    #[instrument(skip(self))]
    pub async fn update_value(
        &self,
        owner: AttributeOwner,
        id: VariableValueId,
        update: AttributeUpdate,
    ) -> Result<(), VariationError> {
        self.validate(&update)?;
        let mut tx = self.backend.begin().await?;
        load_value_names(tx.as_mut(), owner, id).await?;
        match &update {
            AttributeUpdate::Ordering { ordering } => {
                tx.set_value_ordering(id, *ordering).await?;
            }
            AttributeUpdate::Translation {
                language_code,
                name,
            } => {
                tx.set_value_name(id, language_code, name.trim()).await?;
            }
        }
        tx.commit().await?;
        info!(value_id = %id, "updated value");
        Ok(())
    }

    fn detail(&self, names: &Translations) -> AttributeDetail {
        let fallback = names.display(&self.settings.default_language);
        self.settings
            .languages
            .iter()
            .map(|language| {
                (
                    language.code.clone(),
                    LanguageName {
                        language_name: language.name.clone(),
                        name: names.get(&language.code).unwrap_or(fallback).to_string(),
                    },
                )
            })
            .collect()
    }

    fn validate(&self, update: &AttributeUpdate) -> Result<(), VariationError> {
        if let AttributeUpdate::Translation {
            language_code,
            name,
        } = update
        {
            if !self.settings.has_language(language_code) {
                return Err(VariationError::field(
                    "language_code",
                    format!("'{language_code}' is not a configured language."),
                ));
            }
            if name.trim().is_empty() {
                return Err(VariationError::field("name", "This field may not be blank."));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

async fn load_variable(
    tx: &mut dyn CatalogTx,
    owner: AttributeOwner,
    id: VariableId,
) -> Result<Variable, VariationError> {
    let variable = tx
        .get_variable(id)
        .await?
        .ok_or_else(|| VariationError::NotFound(format!("variable {id}")))?;

    match (owner, variable.scope) {
        (AttributeOwner::Template, VariableScope::Template) => Ok(variable),
        (AttributeOwner::Product(scope), VariableScope::Product(parent)) => {
            load_parent(tx, scope, parent).await?;
            Ok(variable)
        }
        _ => Err(VariationError::NotFound(format!("variable {id}"))),
    }
}

async fn load_value_names(
    tx: &mut dyn CatalogTx,
    owner: AttributeOwner,
    id: VariableValueId,
) -> Result<Translations, VariationError> {
    let value = tx
        .get_value(id)
        .await?
        .ok_or_else(|| VariationError::NotFound(format!("value {id}")))?;
    match load_variable(tx, owner, value.variable_id).await {
        Ok(_) => Ok(value.names),
        Err(VariationError::NotFound(_)) => Err(VariationError::NotFound(format!("value {id}"))),
        Err(e) => Err(e),
    }
}
