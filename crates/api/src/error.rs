//! Error taxonomy and classification.
//!
//! Every failure a request can hit is an [`AppError`] variant. [`AppError::classify`]
//! maps each variant to a [`Classification`]: HTTP status, stable error code,
//! human message and optional diagnostics.
//!
//! Handlers return `Result<T, AppError>`. `IntoResponse` logs the error, reports
//! server-class errors to Sentry, and attaches the classification to an
//! otherwise empty response. The JSON envelope is rendered once, by
//! [`crate::middleware::error_boundary`], which also decides whether
//! diagnostics are visible.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::collections::BTreeMap;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use customer_registry_core::{CustomerId, PostalCodeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::RepositoryError;

/// Per-field validation messages, ordered by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Why a postal code did not yield a usable address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The lookup service does not know the postal code.
    NotFound,
    /// The lookup service knows the code but returned blank address parts.
    Incomplete,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("postal code not found"),
            Self::Incomplete => f.write_str("incomplete address"),
        }
    }
}

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request fields failed validation.
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// Postal code does not normalize to eight digits.
    #[error("invalid postal code: {0}")]
    InvalidPostalCode(#[from] PostalCodeError),

    /// Lookup completed without a usable address.
    #[error("address not resolved: {reason}")]
    AddressNotResolved {
        /// What the lookup returned.
        reason: UnresolvedReason,
    },

    /// No customer with this id.
    #[error("customer {0} not found")]
    RecordNotFound(CustomerId),

    /// Lookup service could not be reached, timed out, or answered with garbage.
    #[error("external service unavailable: {0}")]
    ExternalServiceUnavailable(String),

    /// Lookup call outlived the workflow's own deadline.
    #[error("postal code lookup exceeded its deadline")]
    LookupTimeout,

    /// Store rejected or failed the write.
    #[error("persistence failure: {0}")]
    Persistence(#[from] RepositoryError),

    /// Anything not covered above, including panics.
    #[error("unexpected error: {message}")]
    Unexpected {
        /// Description of the failure.
        message: String,
        /// Backtrace, when capture is enabled.
        trace: Option<String>,
    },
}

impl AppError {
    /// Build an [`AppError::Unexpected`], capturing a backtrace if
    /// `RUST_BACKTRACE` enables it.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        let backtrace = Backtrace::capture();
        let trace = (backtrace.status() == BacktraceStatus::Captured).then(|| backtrace.to_string());
        Self::Unexpected {
            message: message.into(),
            trace,
        }
    }

    /// Build a validation error for a single field.
    #[must_use]
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(BTreeMap::from([(field.to_owned(), vec![message.into()])]))
    }

    /// Map this error to its status, code, and user-facing text.
    #[must_use]
    pub fn classify(&self) -> Classification {
        match self {
            Self::Validation(errors) => Classification::new(
                StatusCode::BAD_REQUEST,
                ErrorCode::Validation,
                "Invalid request",
                "One or more fields contain invalid values.",
            )
            .with_errors(errors.clone()),
            Self::InvalidPostalCode(_) => Classification::new(
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidPostalCode,
                "Invalid postal code",
                "Postal code must contain exactly 8 digits.",
            ),
            Self::AddressNotResolved { reason } => Classification::new(
                StatusCode::BAD_REQUEST,
                ErrorCode::AddressNotResolved,
                "Address not resolved",
                match reason {
                    UnresolvedReason::NotFound => {
                        "Postal code not found. Check the postal code provided."
                    }
                    UnresolvedReason::Incomplete => {
                        "Postal code found but the address data is incomplete."
                    }
                },
            ),
            Self::RecordNotFound(id) => Classification::new(
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                "Customer not found",
                format!("Customer with ID {id} was not found."),
            ),
            Self::ExternalServiceUnavailable(detail) => Classification::new(
                StatusCode::BAD_REQUEST,
                ErrorCode::ExternalService,
                "External service error",
                "Failed to query the postal code service. Try again in a few moments.",
            )
            .with_details(Diagnostic {
                message: detail.clone(),
                trace: None,
            }),
            Self::LookupTimeout => Classification::new(
                StatusCode::REQUEST_TIMEOUT,
                ErrorCode::Timeout,
                "Timeout",
                "The operation exceeded the time limit.",
            ),
            Self::Persistence(_) => Classification::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::Persistence,
                "Persistence failure",
                "The customer could not be saved. Try again later.",
            ),
            Self::Unexpected { message, trace } => Classification::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::Internal,
                "Internal server error",
                "An unexpected error occurred. Try again later.",
            )
            .with_details(Diagnostic {
                message: message.clone(),
                trace: trace.clone(),
            }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let classification = self.classify();

        if classification.status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                error_code = %classification.code,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(
                error = %self,
                error_code = %classification.code,
                "Request rejected"
            );
        }

        let mut response = classification.status.into_response();
        response.extensions_mut().insert(classification);
        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Stable, machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Field validation failure.
    #[serde(rename = "validation_error")]
    Validation,
    /// Postal code is not eight digits.
    InvalidPostalCode,
    /// Lookup found nothing usable.
    AddressNotResolved,
    /// Record does not exist.
    NotFound,
    /// Lookup service unavailable.
    #[serde(rename = "external_service_error")]
    ExternalService,
    /// Lookup service timed out.
    #[serde(rename = "timeout_error")]
    Timeout,
    /// Store failure.
    #[serde(rename = "persistence_error")]
    Persistence,
    /// Anything else.
    #[serde(rename = "internal_error")]
    Internal,
}

impl ErrorCode {
    /// Wire representation of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::InvalidPostalCode => "invalid_postal_code",
            Self::AddressNotResolved => "address_not_resolved",
            Self::NotFound => "not_found",
            Self::ExternalService => "external_service_error",
            Self::Timeout => "timeout_error",
            Self::Persistence => "persistence_error",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic detail shown only in development.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Raw error message.
    pub message: String,
    /// Backtrace, if one was captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// Outcome of [`AppError::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Response status.
    pub status: StatusCode,
    /// Stable error code.
    pub code: ErrorCode,
    /// Short title.
    pub title: &'static str,
    /// Human-readable message, safe to show to callers.
    pub message: String,
    /// Per-field validation messages.
    pub errors: Option<FieldErrors>,
    /// Diagnostics, withheld outside development.
    pub details: Option<Diagnostic>,
}

impl Classification {
    fn new(
        status: StatusCode,
        code: ErrorCode,
        title: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code,
            title,
            message: message.into(),
            errors: None,
            details: None,
        }
    }

    fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }

    fn with_details(mut self, details: Diagnostic) -> Self {
        self.details = Some(details);
        self
    }

    /// Build the JSON envelope, keeping diagnostics only if asked to.
    #[must_use]
    pub fn envelope(&self, include_details: bool) -> ErrorEnvelope {
        ErrorEnvelope {
            error: self.title.to_owned(),
            message: self.message.clone(),
            code: self.code,
            errors: self.errors.clone(),
            details: if include_details {
                self.details.clone()
            } else {
                None
            },
        }
    }
}

/// JSON body returned for every classified failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Short title.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Stable error code.
    #[serde(rename = "type")]
    pub code: ErrorCode,
    /// Per-field validation messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    /// Diagnostics (development only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Diagnostic>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn all_errors() -> Vec<AppError> {
        vec![
            AppError::field("name", "name is required"),
            AppError::InvalidPostalCode(PostalCodeError::InvalidFormat {
                expected: 8,
                actual: 5,
            }),
            AppError::AddressNotResolved {
                reason: UnresolvedReason::NotFound,
            },
            AppError::RecordNotFound(CustomerId::new(999)),
            AppError::ExternalServiceUnavailable("connection refused".to_owned()),
            AppError::LookupTimeout,
            AppError::Persistence(RepositoryError::Conflict("email already exists".to_owned())),
            AppError::unexpected("boom"),
        ]
    }

    #[test]
    fn test_status_and_code_mapping() {
        let expected = [
            (StatusCode::BAD_REQUEST, "validation_error"),
            (StatusCode::BAD_REQUEST, "invalid_postal_code"),
            (StatusCode::BAD_REQUEST, "address_not_resolved"),
            (StatusCode::NOT_FOUND, "not_found"),
            (StatusCode::BAD_REQUEST, "external_service_error"),
            (StatusCode::REQUEST_TIMEOUT, "timeout_error"),
            (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error"),
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        ];

        for (error, (status, code)) in all_errors().iter().zip(expected) {
            let classification = error.classify();
            assert_eq!(classification.status, status, "{error}");
            assert_eq!(classification.code.as_str(), code, "{error}");
        }
    }

    #[test]
    fn test_code_serializes_as_wire_string() {
        for error in all_errors() {
            let code = error.classify().code;
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, serde_json::Value::String(code.as_str().to_owned()));
        }
    }

    #[test]
    fn test_not_found_message_names_id() {
        let classification = AppError::RecordNotFound(CustomerId::new(999)).classify();
        assert_eq!(classification.message, "Customer with ID 999 was not found.");
    }

    #[test]
    fn test_unresolved_messages_differ() {
        let not_found = AppError::AddressNotResolved {
            reason: UnresolvedReason::NotFound,
        }
        .classify();
        let incomplete = AppError::AddressNotResolved {
            reason: UnresolvedReason::Incomplete,
        }
        .classify();
        assert_eq!(not_found.code, incomplete.code);
        assert_ne!(not_found.message, incomplete.message);
    }

    #[test]
    fn test_server_errors_hide_internals_in_message() {
        let classification =
            AppError::Persistence(RepositoryError::Conflict("email already exists".to_owned()))
                .classify();
        assert!(!classification.message.contains("email"));
        assert!(classification.details.is_none());
    }

    #[test]
    fn test_envelope_drops_details_in_production() {
        let classification =
            AppError::ExternalServiceUnavailable("connection refused".to_owned()).classify();

        let production = serde_json::to_value(classification.envelope(false)).unwrap();
        assert!(production.get("details").is_none());
        assert_eq!(production["type"], "external_service_error");

        let development = serde_json::to_value(classification.envelope(true)).unwrap();
        assert_eq!(development["details"]["message"], "connection refused");
    }

    #[test]
    fn test_envelope_keeps_field_errors_everywhere() {
        let classification = AppError::field("email", "email is required").classify();
        let json = serde_json::to_value(classification.envelope(false)).unwrap();
        assert_eq!(json["errors"]["email"][0], "email is required");
        assert_eq!(json["error"], "Invalid request");
    }

    #[test]
    fn test_into_response_attaches_classification() {
        let response = AppError::LookupTimeout.into_response();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let classification = response.extensions().get::<Classification>().unwrap();
        assert_eq!(classification.code, ErrorCode::Timeout);
    }
}
