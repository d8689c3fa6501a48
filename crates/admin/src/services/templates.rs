//! Global variation templates.
//!
//! Templates are variables without an owning product. They carry no
//! combinations of their own; merchants pick them as presets when building a
//! parent's variables.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use product_variations_core::{VariableValueId, slugify};

use super::VariationError;
use super::combinations::{find_value, find_variable, variable_ids};
use crate::config::VariationSettings;
use crate::db::{CatalogBackend, VariationStore};
use crate::models::{
    FieldErrors, PopulateSummary, TemplateDelete, TemplateInput, TemplateSummary, VariableScope,
    VariationListing,
};

/// Service for template variables and their values.
#[derive(Clone)]
pub struct TemplateService {
    backend: Arc<dyn CatalogBackend>,
    settings: VariationSettings,
}

impl TemplateService {
    /// Create a new template service.
    #[must_use]
    pub fn new(backend: Arc<dyn CatalogBackend>, settings: VariationSettings) -> Self {
        Self { backend, settings }
    }

    /// Every template variable and its values in the default language.
    ///
    /// # Errors
    ///
    /// Returns `VariationError::Repository` if the catalog cannot be read.
    #[instrument(skip(self))]
    pub async fn list_templates(&self) -> Result<VariationListing, VariationError> {
        let mut tx = self.backend.begin().await?;
        let variables = tx.list_variables(VariableScope::Template).await?;
        let values = tx.list_values(&variable_ids(&variables)).await?;
        Ok(VariationListing::build(
            &variables,
            &values,
            &self.settings.default_language,
        ))
    }

    /// Create or replace a template variable and its value list.
    ///
    /// Values missing from `input` are deleted; new ones are appended in the
    /// submitted order.
    ///
    /// # Errors
    ///
    /// Returns `VariationError::ValidationFail` for a blank name or value.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn upsert_template(
        &self,
        input: TemplateInput,
    ) -> Result<TemplateSummary, VariationError> {
        let name = input.name.trim().to_string();
        let values = normalize_values(&input.values)?;
        let identifier = slugify(&name);
        if identifier.is_empty() {
            return Err(VariationError::field(
                "name",
                "Name must contain at least one letter or digit.",
            ));
        }

        let language = self.settings.default_language.as_str();
        let mut tx = self.backend.begin().await?;
        let variable = match find_variable(tx.as_mut(), VariableScope::Template, language, &name)
            .await?
        {
            Some(variable) => variable,
            None => {
                tx.create_variable(VariableScope::Template, &identifier, language, &name)
                    .await?
            }
        };

        let mut kept: BTreeSet<VariableValueId> = BTreeSet::new();
        for value_name in &values {
            let value = match find_value(tx.as_mut(), variable.id, language, value_name).await? {
                Some(value) => value,
                None => {
                    let ordering = i32::try_from(kept.len()).unwrap_or(i32::MAX);
                    tx.create_value(
                        variable.id,
                        &slugify(value_name),
                        ordering,
                        language,
                        value_name,
                    )
                    .await?
                }
            };
            kept.insert(value.id);
        }

        for value in tx.list_values(&[variable.id]).await? {
            if !kept.contains(&value.id) {
                debug!(value_id = %value.id, "removing template value");
                tx.delete_value(value.id).await?;
            }
        }
        tx.commit().await?;

        info!(variable_id = %variable.id, values = values.len(), "upserted template");
        Ok(TemplateSummary {
            id: variable.id,
            name,
            values,
        })
    }

    /// Delete a template variable and its values by default-language name.
    ///
    /// Unknown names are ignored.
    ///
    /// # Errors
    ///
    /// Returns `VariationError::Repository` if the catalog cannot be written.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn delete_template(&self, input: TemplateDelete) -> Result<(), VariationError> {
        let mut tx = self.backend.begin().await?;
        let found = tx
            .find_variable_by_name(
                VariableScope::Template,
                &self.settings.default_language,
                input.name.trim(),
            )
            .await?;
        let Some(variable) = found else {
            debug!("no template with that name");
            return Ok(());
        };
        tx.delete_variable(variable.id).await?;
        tx.commit().await?;
        info!(variable_id = %variable.id, "deleted template");
        Ok(())
    }

    /// Copy every product-scoped variable and value into the templates.
    ///
    /// Variables match by slug of their name, values by slug within the
    /// variable, so running this repeatedly creates nothing new.
    ///
    /// # Errors
    ///
    /// Returns `VariationError::Repository` if the catalog cannot be written.
    #[instrument(skip(self))]
    pub async fn populate_templates(&self) -> Result<PopulateSummary, VariationError> {
        let language = self.settings.default_language.as_str();
        let mut summary = PopulateSummary::default();
        let mut tx = self.backend.begin().await?;

        let variables = tx.list_product_scoped_variables().await?;
        let values = tx.list_values(&variable_ids(&variables)).await?;

        for variable in &variables {
            let name = variable.names.display(language);
            let identifier = slugify(name);
            if identifier.is_empty() {
                continue;
            }
            let template = match tx
                .find_variable_by_identifier(VariableScope::Template, &identifier)
                .await?
            {
                Some(template) => template,
                None => {
                    summary.variables_created += 1;
                    tx.create_variable(VariableScope::Template, &identifier, language, name)
                        .await?
                }
            };

            for value in values.iter().filter(|v| v.variable_id == variable.id) {
                let value_name = value.names.display(language);
                let value_identifier = slugify(value_name);
                if value_identifier.is_empty()
                    || tx
                        .find_value_by_identifier(template.id, &value_identifier)
                        .await?
                        .is_some()
                {
                    continue;
                }
                let ordering = i32::try_from(tx.list_values(&[template.id]).await?.len())
                    .unwrap_or(i32::MAX);
                tx.create_value(template.id, &value_identifier, ordering, language, value_name)
                    .await?;
                summary.values_created += 1;
            }
        }

        tx.commit().await?;
        info!(
            variables_created = summary.variables_created,
            values_created = summary.values_created,
            "populated templates"
        );
        Ok(summary)
    }
}

/// Trim value names, reject blanks and drop duplicates by slug.
fn normalize_values(values: &[String]) -> Result<Vec<String>, VariationError> {
    let mut errors = FieldErrors::default();
    let mut seen = BTreeSet::new();
    let mut normalized = Vec::with_capacity(values.len());
    for (index, value) in values.iter().enumerate() {
        let value = value.trim();
        let identifier = slugify(value);
        if identifier.is_empty() {
            errors.add(
                &format!("values.{index}"),
                "Value must contain at least one letter or digit.",
            );
        } else if seen.insert(identifier) {
            normalized.push(value.to_string());
        }
    }
    errors.into_result()?;
    Ok(normalized)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryCatalog;
    use crate::models::InheritedAttributes;
    use product_variations_core::Sku;

    fn service(catalog: &MemoryCatalog) -> TemplateService {
        TemplateService::new(
            Arc::new(catalog.clone()),
            VariationSettings::single_language("en", "English"),
        )
    }

    fn template(name: &str, values: &[&str]) -> TemplateInput {
        TemplateInput {
            name: name.to_string(),
            values: values.iter().map(|v| (*v).to_string()).collect(),
        }
    }

    fn value_names(listing: &VariationListing) -> Vec<String> {
        listing
            .values
            .values()
            .flatten()
            .map(|value| value.name.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_upsert_replaces_values() {
        let catalog = MemoryCatalog::new();
        let service = service(&catalog);

        let first = service
            .upsert_template(template("Color", &["Red", "Blue"]))
            .await
            .unwrap();
        assert_eq!(first.values, vec!["Red", "Blue"]);

        let second = service
            .upsert_template(template(" Color ", &["Blue", "Green", "green"]))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.values, vec!["Blue", "Green"]);

        let listing = service.list_templates().await.unwrap();
        assert_eq!(listing.variables.len(), 1);
        let mut names = value_names(&listing);
        names.sort();
        assert_eq!(names, vec!["Blue", "Green"]);
    }

    #[tokio::test]
    async fn test_upsert_rejects_blank_values() {
        let catalog = MemoryCatalog::new();
        let err = service(&catalog)
            .upsert_template(template("Size", &["S", "  "]))
            .await
            .unwrap_err();
        let VariationError::ValidationFail(errors) = err else {
            panic!("expected validation failure");
        };
        assert!(errors.contains_field("values.1"));
    }

    #[tokio::test]
    async fn test_delete_by_name_and_unknown_name() {
        let catalog = MemoryCatalog::new();
        let service = service(&catalog);
        service
            .upsert_template(template("Color", &["Red"]))
            .await
            .unwrap();

        service
            .delete_template(TemplateDelete {
                name: "Material".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(service.list_templates().await.unwrap().variables.len(), 1);

        service
            .delete_template(TemplateDelete {
                name: "Color".to_string(),
            })
            .await
            .unwrap();
        assert!(service.list_templates().await.unwrap().variables.is_empty());
    }

    #[tokio::test]
    async fn test_populate_copies_product_variables_once() {
        let catalog = MemoryCatalog::new();
        let parent = catalog
            .insert_product("Shirt", Sku::parse("shirt").unwrap(), InheritedAttributes::default())
            .await
            .unwrap();
        let mut tx = catalog.begin().await.unwrap();
        let color = tx
            .create_variable(VariableScope::Product(parent.id), "color", "en", "Color")
            .await
            .unwrap();
        tx.create_value(color.id, "red", 0, "en", "Red").await.unwrap();
        tx.create_value(color.id, "blue", 1, "en", "Blue").await.unwrap();
        tx.commit().await.unwrap();

        let service = service(&catalog);
        service
            .upsert_template(template("Color", &["Red"]))
            .await
            .unwrap();

        let summary = service.populate_templates().await.unwrap();
        assert_eq!(
            summary,
            PopulateSummary {
                variables_created: 0,
                values_created: 1,
            }
        );
        assert_eq!(
            service.populate_templates().await.unwrap(),
            PopulateSummary::default()
        );

        let listing = service.list_templates().await.unwrap();
        assert_eq!(value_names(&listing), vec!["Red", "Blue"]);
    }
}
