//! Request validation.
//!
//! Handlers take their body as `Result<Json<T>, JsonRejection>` and their path
//! as `Result<Path<i64>, PathRejection>`, then pass them through
//! [`extract_validated_json`] and [`extract_customer_id`]. Every rejection
//! becomes [`AppError::Validation`] so malformed input gets the same envelope
//! as a failed field rule.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{
        Path,
        rejection::{JsonRejection, PathRejection},
    },
};
use customer_registry_core::{
    CustomerDraft, CustomerId, CustomerName, CustomerNameError, Email, EmailError,
};

use crate::error::{AppError, FieldErrors};
use crate::models::CustomerRequest;

/// Request bodies that validate into a domain value.
pub trait Validate {
    /// Validated form of the request.
    type Output;

    /// Check every field, collecting all messages.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages if any field is invalid.
    fn validate(self) -> Result<Self::Output, FieldErrors>;
}

/// Unwrap a JSON body and validate it.
///
/// # Errors
///
/// Returns `AppError::Validation` if the body is not valid JSON for `T` or
/// fails validation.
pub fn extract_validated_json<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T::Output, AppError> {
    let Json(request) = body.map_err(|rejection| AppError::field("body", rejection.body_text()))?;
    request.validate().map_err(AppError::Validation)
}

/// Unwrap a customer id path segment.
///
/// # Errors
///
/// Returns `AppError::Validation` on the `id` field if the segment is not an
/// integer or is not positive.
pub fn extract_customer_id(
    path: Result<Path<i64>, PathRejection>,
) -> Result<CustomerId, AppError> {
    let Path(raw) = path.map_err(|_| AppError::field("id", "id must be an integer"))?;
    let id = CustomerId::new(raw);
    if !id.is_positive() {
        return Err(AppError::field("id", "id must be greater than zero"));
    }
    Ok(id)
}

impl Validate for CustomerRequest {
    type Output = CustomerDraft;

    fn validate(self) -> Result<CustomerDraft, FieldErrors> {
        let mut errors: FieldErrors = BTreeMap::new();

        let name = match self.name.as_deref().map(CustomerName::parse) {
            None | Some(Err(CustomerNameError::Empty)) => {
                push(&mut errors, "name", "name is required");
                None
            }
            Some(Err(e)) => {
                push(&mut errors, "name", e.to_string());
                None
            }
            Some(Ok(name)) => Some(name),
        };

        let email = match self.email.as_deref().map(Email::parse) {
            None | Some(Err(EmailError::Empty)) => {
                push(&mut errors, "email", "email is required");
                None
            }
            Some(Err(e @ EmailError::TooLong { .. })) => {
                push(&mut errors, "email", e.to_string());
                None
            }
            Some(Err(_)) => {
                push(&mut errors, "email", "email must be a valid email address");
                None
            }
            Some(Ok(email)) => Some(email),
        };

        let postal_code = self.postal_code.filter(|code| !code.trim().is_empty());
        if postal_code.is_none() {
            push(&mut errors, "postalCode", "postalCode is required");
        }

        match (name, email, postal_code) {
            (Some(name), Some(email), Some(postal_code)) if errors.is_empty() => {
                Ok(CustomerDraft {
                    name,
                    email,
                    postal_code,
                })
            }
            _ => Err(errors),
        }
    }
}

fn push(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_owned())
        .or_default()
        .push(message.into());
}
