//! Customer enrichment workflow.
//!
//! Writes run as a straight pipeline: normalize the postal code, look up the
//! address, merge, persist. The first failing stage ends the call with one
//! [`AppError`]; nothing is retried. The lookup has no side effects on the
//! store, so a failed persist needs no compensation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use customer_registry_core::{Address, Customer, CustomerDraft, CustomerId, NewCustomer, PostalCode};
use tracing::instrument;

use crate::db::{CustomerStore, RepositoryError};
use crate::error::{AppError, UnresolvedReason};
use crate::lookup::{AddressLookup, LookupError, LookupOutcome};

/// Extra time allowed past the lookup client's own timeout before the
/// workflow gives up on it.
pub const LOOKUP_DEADLINE_GRACE: Duration = Duration::from_secs(1);

/// Orchestrates customer reads and enriched writes.
///
/// Holds shared handles to both ports for its lifetime; it does not own their
/// resources.
#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn CustomerStore>,
    lookup: Arc<dyn AddressLookup>,
    lookup_deadline: Duration,
}

impl CustomerService {
    /// Create a service over a store and a lookup port.
    ///
    /// `lookup_deadline` bounds every lookup call regardless of the port's own
    /// timeout.
    #[must_use]
    pub fn new(
        store: Arc<dyn CustomerStore>,
        lookup: Arc<dyn AddressLookup>,
        lookup_deadline: Duration,
    ) -> Self {
        Self {
            store,
            lookup,
            lookup_deadline,
        }
    }

    /// All customers, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Persistence` if the store cannot be read.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        self.store.list().await.map_err(|e| {
            tracing::error!(error = %e, "failed to list customers");
            AppError::Persistence(e)
        })
    }

    /// A single customer, or `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Persistence` if the store cannot be read.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, AppError> {
        self.store.get(id).await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch customer");
            AppError::Persistence(e)
        })
    }

    /// Create a customer, resolving its address from the postal code.
    ///
    /// # Errors
    ///
    /// - `AppError::InvalidPostalCode` if the postal code is not eight digits
    /// - `AppError::AddressNotResolved` if the lookup finds no usable address
    /// - `AppError::ExternalServiceUnavailable` if the lookup fails
    /// - `AppError::LookupTimeout` if the lookup outlives its deadline
    /// - `AppError::Persistence` if the store rejects the record
    #[instrument(skip_all, fields(postal_code = %draft.postal_code))]
    pub async fn create_customer(&self, draft: CustomerDraft) -> Result<Customer, AppError> {
        let (postal_code, address) = self.resolve_address(&draft.postal_code).await?;
        let new_customer = NewCustomer::from_draft(draft, postal_code, address, Utc::now());

        let customer = self.store.insert(new_customer).await.map_err(|e| {
            tracing::error!(error = %e, "failed to persist new customer");
            AppError::Persistence(e)
        })?;

        tracing::info!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    /// Replace a customer's fields, re-resolving the address.
    ///
    /// The address is looked up again even when the postal code is unchanged.
    ///
    /// # Errors
    ///
    /// - `AppError::RecordNotFound` if no customer has this id
    /// - otherwise as [`CustomerService::create_customer`]
    #[instrument(skip(self, draft), fields(customer_id = %id, postal_code = %draft.postal_code))]
    pub async fn update_customer(
        &self,
        id: CustomerId,
        draft: CustomerDraft,
    ) -> Result<Customer, AppError> {
        let Some(existing) = self.get_customer(id).await? else {
            tracing::warn!("customer not found for update");
            return Err(AppError::RecordNotFound(id));
        };

        let (postal_code, address) = self.resolve_address(&draft.postal_code).await?;
        let updated = existing.apply_update(draft, postal_code, address, Utc::now());

        let customer = self.store.replace(&updated).await.map_err(|e| match e {
            RepositoryError::NotFound => {
                tracing::warn!("customer removed before update was persisted");
                AppError::RecordNotFound(id)
            }
            e => {
                tracing::error!(error = %e, "failed to persist customer update");
                AppError::Persistence(e)
            }
        })?;

        tracing::info!("customer updated");
        Ok(customer)
    }

    /// Delete a customer. Returns whether a record was removed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Persistence` if the store fails.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn delete_customer(&self, id: CustomerId) -> Result<bool, AppError> {
        let removed = self.store.delete(id).await.map_err(|e| {
            tracing::error!(error = %e, "failed to delete customer");
            AppError::Persistence(e)
        })?;

        if removed {
            tracing::info!("customer deleted");
        } else {
            tracing::warn!("customer not found for deletion");
        }
        Ok(removed)
    }

    /// Whether a customer exists. Store failures are logged and read as `false`.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn customer_exists(&self, id: CustomerId) -> bool {
        self.store.exists(id).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "existence check failed");
            false
        })
    }

    /// Normalize the postal code and resolve it to a complete address.
    async fn resolve_address(&self, raw: &str) -> Result<(PostalCode, Address), AppError> {
        let postal_code = PostalCode::parse(raw).map_err(|e| {
            tracing::warn!(error = %e, "invalid postal code");
            AppError::InvalidPostalCode(e)
        })?;

        let outcome = tokio::time::timeout(self.lookup_deadline, self.lookup.lookup(&postal_code))
            .await
            .map_err(|_| {
                tracing::error!(
                    postal_code = %postal_code,
                    deadline = ?self.lookup_deadline,
                    "postal code lookup exceeded its deadline"
                );
                AppError::LookupTimeout
            })?
            .map_err(|e| {
                tracing::warn!(postal_code = %postal_code, error = %e, "postal code lookup failed");
                match e {
                    LookupError::Communication(message) => {
                        AppError::ExternalServiceUnavailable(message)
                    }
                    LookupError::Timeout => {
                        AppError::ExternalServiceUnavailable(LookupError::Timeout.to_string())
                    }
                }
            })?;

        let reason = match outcome {
            LookupOutcome::Found(found) => match found.into_complete() {
                Some(address) => return Ok((postal_code, address)),
                None => UnresolvedReason::Incomplete,
            },
            LookupOutcome::NotFound => UnresolvedReason::NotFound,
        };

        tracing::warn!(postal_code = %postal_code, reason = %reason, "address not resolved");
        Err(AppError::AddressNotResolved { reason })
    }
}
