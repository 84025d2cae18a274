//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::CustomerStore;
use crate::lookup::AddressLookup;
use crate::services::{CustomerService, LOOKUP_DEADLINE_GRACE};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The store and lookup port are
/// chosen by the caller, so tests can run the full router in memory.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    store: Arc<dyn CustomerStore>,
    customers: CustomerService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `store` - Customer record store
    /// * `lookup` - Postal code lookup port
    #[must_use]
    pub fn new(
        config: ApiConfig,
        store: Arc<dyn CustomerStore>,
        lookup: Arc<dyn AddressLookup>,
    ) -> Self {
        let customers = CustomerService::new(
            Arc::clone(&store),
            lookup,
            config.lookup.timeout + LOOKUP_DEADLINE_GRACE,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                customers,
            }),
        }
    }

    /// Get the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get the customer record store.
    #[must_use]
    pub fn store(&self) -> &dyn CustomerStore {
        self.inner.store.as_ref()
    }

    /// Get the customer service.
    #[must_use]
    pub fn customers(&self) -> &CustomerService {
        &self.inner.customers
    }
}
