//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::db::CatalogBackend;
use crate::services::{
    AttributeService, CombinationService, DefaultVariationUpdater, TemplateService,
    VariationUpdater,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog backend, configuration and the services built on them.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: Arc<dyn CatalogBackend>,
    combinations: CombinationService,
    attributes: AttributeService,
    templates: TemplateService,
}

impl AppState {
    /// Create application state with the default combination reconciler.
    #[must_use]
    pub fn new(config: AdminConfig, backend: Arc<dyn CatalogBackend>) -> Self {
        Self::with_updater(config, backend, Arc::new(DefaultVariationUpdater))
    }

    /// Create application state with a custom combination reconciler.
    #[must_use]
    pub fn with_updater(
        config: AdminConfig,
        backend: Arc<dyn CatalogBackend>,
        updater: Arc<dyn VariationUpdater>,
    ) -> Self {
        let settings = config.variations.clone();
        let combinations =
            CombinationService::new(Arc::clone(&backend), updater, settings.clone());
        let attributes = AttributeService::new(Arc::clone(&backend), settings.clone());
        let templates = TemplateService::new(Arc::clone(&backend), settings);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                combinations,
                attributes,
                templates,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog backend.
    #[must_use]
    pub fn backend(&self) -> &dyn CatalogBackend {
        self.inner.backend.as_ref()
    }

    #[must_use]
    pub fn combinations(&self) -> &CombinationService {
        &self.inner.combinations
    }

    #[must_use]
    pub fn attributes(&self) -> &AttributeService {
        &self.inner.attributes
    }

    #[must_use]
    pub fn templates(&self) -> &TemplateService {
        &self.inner.templates
    }
}
