//! Postal code address lookup.
//!
//! # Architecture
//!
//! - [`AddressLookup`] is the port the customer service depends on
//! - [`ViaCepClient`] is the HTTP implementation used in production
//! - No caching and no retries: every call reaches the remote service once
//!
//! The port reports two kinds of answers: a lookup that completed
//! ([`LookupOutcome`]) and a lookup that could not complete ([`LookupError`]).
//! Deciding whether a completed answer is usable (the incomplete-address
//! policy) is left to the caller.

mod viacep;

pub use viacep::{ViaCepClient, ViaCepResponse};

use async_trait::async_trait;
use customer_registry_core::{Address, PostalCode};
use thiserror::Error;

/// Errors that prevent a lookup from completing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// Network, transport, HTTP status, or decoding failure.
    #[error("communication failure: {0}")]
    Communication(String),

    /// The service did not answer within the bounded wait.
    #[error("lookup timed out")]
    Timeout,
}

/// Address parts as returned by the lookup service, before the
/// incomplete-address policy is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupAddress {
    /// Street name, possibly blank.
    pub street: Option<String>,
    /// City, possibly blank.
    pub city: Option<String>,
    /// Region, possibly blank.
    pub region: Option<String>,
}

impl LookupAddress {
    /// Convert into an [`Address`] if every part is present and non-blank.
    #[must_use]
    pub fn into_complete(self) -> Option<Address> {
        Address::complete(
            self.street.as_deref(),
            self.city.as_deref(),
            self.region.as_deref(),
        )
    }
}

/// Result of a completed lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The service knows this postal code.
    Found(LookupAddress),
    /// The service answered but does not know this postal code.
    NotFound,
}

/// Resolves postal codes to addresses.
///
/// Implementations must not retry and must not have side effects on the
/// record store. Dropping the returned future cancels the lookup.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Look up the address for a normalized postal code.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if the lookup could not complete.
    async fn lookup(&self, postal_code: &PostalCode) -> Result<LookupOutcome, LookupError>;
}
