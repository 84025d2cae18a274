//! Customer request and response bodies.
//!
//! Conversions to and from the core types are plain functions with no side
//! effects; timestamps and ids come from the record, never from the caller.

use chrono::{DateTime, Utc};
use customer_registry_core::Customer;
use serde::{Deserialize, Serialize};

/// Body of `POST /customers` and `PUT /customers/{id}`.
///
/// Fields are optional on the wire so a missing field is reported as a
/// validation message instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    /// Full name, 3-100 letters and spaces.
    #[serde(default)]
    pub name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Postal code, with or without punctuation.
    #[serde(default, alias = "cep")]
    pub postal_code: Option<String>,
}

/// Customer as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    /// Store-assigned id.
    pub id: i64,
    /// Full name.
    pub name: String,
    /// Lower-cased email.
    pub email: String,
    /// Eight-digit postal code.
    pub postal_code: String,
    /// Street resolved from the postal code.
    pub street: Option<String>,
    /// City resolved from the postal code.
    pub city: Option<String>,
    /// Region resolved from the postal code.
    pub region: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time, absent until the first update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        let (street, city, region) = customer
            .address
            .map_or((None, None, None), |a| {
                (Some(a.street), Some(a.city), Some(a.region))
            });

        Self {
            id: customer.id.as_i64(),
            name: customer.name.as_str().to_owned(),
            email: customer.email.into_inner(),
            postal_code: customer.postal_code.as_str().to_owned(),
            street,
            city,
            region,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use customer_registry_core::{
        Address, CustomerDraft, CustomerId, CustomerName, Email, NewCustomer, PostalCode,
    };

    use super::*;

    #[test]
    fn test_request_accepts_cep_alias() {
        let request: CustomerRequest =
            serde_json::from_str(r#"{"name": "Ana Lima", "email": "a@b.com", "cep": "01310-100"}"#)
                .unwrap();
        assert_eq!(request.postal_code.as_deref(), Some("01310-100"));
    }

    #[test]
    fn test_request_missing_fields_are_none() {
        let request: CustomerRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, CustomerRequest::default());
    }

    #[test]
    fn test_response_from_customer() {
        let customer = NewCustomer::from_draft(
            CustomerDraft {
                name: CustomerName::parse("Ana Lima").unwrap(),
                email: Email::parse("ana@example.com").unwrap(),
                postal_code: "01310-100".to_owned(),
            },
            PostalCode::parse("01310-100").unwrap(),
            Address::complete(Some("Avenida Paulista"), Some("São Paulo"), Some("SP")).unwrap(),
            Utc::now(),
        )
        .with_id(CustomerId::new(5));

        let json = serde_json::to_value(CustomerResponse::from(customer)).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["postalCode"], "01310100");
        assert_eq!(json["street"], "Avenida Paulista");
        assert_eq!(json["region"], "SP");
        assert!(json["updatedAt"].is_null());
        assert!(json.get("createdAt").is_some());
    }
}
