use std::path::{Path, PathBuf};

use staffquote_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use staffquote_core::cpq::pricing::DeterministicPricingEngine;
use staffquote_core::documents::read_catalog;
use staffquote_core::errors::ApplicationError;
use staffquote_core::{DeterministicQuoteRuntime, RateCatalog};

/// Effective config plus the live catalog it points at.
pub struct PricingContext {
    pub config: AppConfig,
    pub catalog: RateCatalog,
}

impl PricingContext {
    pub fn load(catalog_override: Option<&Path>) -> Result<Self, ApplicationError> {
        let config = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                catalog_path: catalog_override.map(Path::to_path_buf),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })?;

        let catalog = match config.pricing.catalog_path.as_deref() {
            Some(path) => read_catalog(path)?,
            None => RateCatalog::empty(),
        };

        tracing::debug!(
            event_name = "cli.context.loaded",
            catalog_entries = catalog.len(),
            catalog_path = ?config.pricing.catalog_path.as_ref().map(PathBuf::as_path),
            "pricing context loaded"
        );

        Ok(Self { config, catalog })
    }

    /// One evaluation per process, so `pricing.memoize` has nothing to reuse here; long-lived
    /// embedders get the memoized runtime from `AppConfig::quote_runtime`.
    pub fn runtime(&self) -> DeterministicQuoteRuntime<DeterministicPricingEngine> {
        DeterministicQuoteRuntime::new(DeterministicPricingEngine)
    }
}
