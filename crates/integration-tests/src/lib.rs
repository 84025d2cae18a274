//! Integration tests for the customer registry.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p customer-registry-integration-tests
//! ```
//!
//! No database or network is needed: the router runs against the in-memory
//! store and a scripted lookup, and the ViaCEP client is exercised against a
//! local `wiremock` server.
//!
//! # Test Categories
//!
//! - `customers_api` - HTTP behaviour of the customer routes
//! - `viacep_client` - Lookup client against a mock ViaCEP

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use customer_registry_api::config::{ApiConfig, Environment};
use customer_registry_api::db::MemoryCustomerStore;
use customer_registry_api::lookup::{AddressLookup, LookupAddress, LookupError, LookupOutcome};
use customer_registry_api::{AppState, app};
use customer_registry_core::PostalCode;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Lookup port answering from a script keyed by normalized postal code.
///
/// Codes without a scripted answer resolve to `NotFound`.
#[derive(Debug, Default)]
pub struct ScriptedLookup {
    answers: Mutex<HashMap<String, Result<LookupOutcome, LookupError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedLookup {
    /// Create a lookup with no scripted answers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a complete address for a postal code.
    #[must_use]
    pub fn with_address(self, postal_code: &str, street: &str, city: &str, region: &str) -> Self {
        self.with_answer(
            postal_code,
            Ok(LookupOutcome::Found(LookupAddress {
                street: Some(street.to_owned()),
                city: Some(city.to_owned()),
                region: Some(region.to_owned()),
            })),
        )
    }

    /// Script any answer for a postal code.
    #[must_use]
    pub fn with_answer(
        self,
        postal_code: &str,
        answer: Result<LookupOutcome, LookupError>,
    ) -> Self {
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(postal_code.to_owned(), answer);
        self
    }

    /// Postal codes looked up so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl AddressLookup for ScriptedLookup {
    async fn lookup(&self, postal_code: &PostalCode) -> Result<LookupOutcome, LookupError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(postal_code.as_str().to_owned());

        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(postal_code.as_str())
            .cloned()
            .unwrap_or(Ok(LookupOutcome::NotFound))
    }
}

/// Router wired to in-memory collaborators.
pub struct TestApp {
    /// Router with the full middleware stack.
    pub router: Router,
    /// Store behind the router.
    pub store: Arc<MemoryCustomerStore>,
    /// Lookup behind the router.
    pub lookup: Arc<ScriptedLookup>,
}

impl TestApp {
    /// Build a production-mode app.
    #[must_use]
    pub fn new(lookup: ScriptedLookup) -> Self {
        Self::with_environment(lookup, Environment::Production)
    }

    /// Build an app in the given environment.
    #[must_use]
    pub fn with_environment(lookup: ScriptedLookup, environment: Environment) -> Self {
        let store = Arc::new(MemoryCustomerStore::new());
        let lookup = Arc::new(lookup);
        let config = ApiConfig {
            environment,
            ..ApiConfig::default()
        };
        let state = AppState::new(config, store.clone(), lookup.clone());

        Self {
            router: app(state),
            store,
            lookup,
        }
    }

    /// Send a request and return status, headers, and the JSON body
    /// (`Value::Null` when the body is empty).
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is not JSON.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        self.send_request(request).await
    }

    /// Send a prepared request.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body is not JSON.
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body is JSON")
        };

        (status, headers, json)
    }
}
