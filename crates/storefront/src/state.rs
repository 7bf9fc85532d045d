//! Application state shared across handlers.

use std::sync::Arc;

use bookstore_core::SpecificationProviderRegistry;

use crate::config::BookstoreConfig;
use crate::db::PgStore;
use crate::services::auth::AuthService;
use crate::services::cart::CartService;
use crate::services::catalog::CatalogService;
use crate::services::orders::OrderService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BookstoreConfig,
    store: PgStore,
    registry: SpecificationProviderRegistry,
}

impl AppState {
    /// Create a new application state with the default search providers.
    #[must_use]
    pub fn new(config: BookstoreConfig, store: PgStore) -> Self {
        Self::with_registry(config, store, SpecificationProviderRegistry::with_defaults())
    }

    /// Create a new application state with a custom provider registry.
    #[must_use]
    pub fn with_registry(
        config: BookstoreConfig,
        store: PgStore,
        registry: SpecificationProviderRegistry,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                registry,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &BookstoreConfig {
        &self.inner.config
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &PgStore {
        &self.inner.store
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_, PgStore> {
        AuthService::new(&self.inner.store)
    }

    #[must_use]
    pub fn cart(&self) -> CartService<'_, PgStore> {
        CartService::new(&self.inner.store)
    }

    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_, PgStore> {
        CatalogService::new(&self.inner.store, &self.inner.registry)
    }

    #[must_use]
    pub fn orders(&self) -> OrderService<'_, PgStore> {
        OrderService::new(&self.inner.store, self.inner.config.cart_policy)
    }
}
