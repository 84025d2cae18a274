//! Customer record types.
//!
//! Conversions between these types are pure functions that consume one value
//! and return another; nothing here touches a clock or a store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Address, CustomerId, CustomerName, Email, PostalCode};

/// A validated create/update request.
///
/// The postal code is kept raw: normalizing it is the first step of the
/// enrichment workflow, and its failure is reported separately from field
/// validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDraft {
    /// Trimmed customer name.
    pub name: CustomerName,
    /// Trimmed, lower-cased email.
    pub email: Email,
    /// Postal code as sent by the caller.
    pub postal_code: String,
}

/// A customer that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    /// Customer name.
    pub name: CustomerName,
    /// Customer email (unique across records).
    pub email: Email,
    /// Normalized postal code.
    pub postal_code: PostalCode,
    /// Address resolved from the postal code.
    pub address: Address,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewCustomer {
    /// Build a new record from a draft and the address resolved for it.
    #[must_use]
    pub fn from_draft(
        draft: CustomerDraft,
        postal_code: PostalCode,
        address: Address,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: draft.name,
            email: draft.email,
            postal_code,
            address,
            created_at: now,
        }
    }

    /// Attach a store-assigned identifier.
    #[must_use]
    pub fn with_id(self, id: CustomerId) -> Customer {
        Customer {
            id,
            name: self.name,
            email: self.email,
            postal_code: self.postal_code,
            address: Some(self.address),
            created_at: self.created_at,
            updated_at: None,
        }
    }
}

/// A persisted customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Store-assigned identifier, immutable once set.
    pub id: CustomerId,
    /// Customer name.
    pub name: CustomerName,
    /// Customer email.
    pub email: Email,
    /// Normalized postal code.
    pub postal_code: PostalCode,
    /// Address resolved from the postal code, present as a whole or not at all.
    pub address: Option<Address>,
    /// When the record was created. Never changes.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated. `None` until the first update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// Merge an update into an existing record.
    ///
    /// The identifier and creation timestamp are carried over; name, email,
    /// postal code and address are replaced; the update timestamp is set to
    /// `now`.
    #[must_use]
    pub fn apply_update(
        self,
        draft: CustomerDraft,
        postal_code: PostalCode,
        address: Address,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: self.id,
            name: draft.name,
            email: draft.email,
            postal_code,
            address: Some(address),
            created_at: self.created_at,
            updated_at: Some(now),
        }
    }
}
