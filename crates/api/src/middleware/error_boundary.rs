//! Error envelope rendering at the edge of the application.
//!
//! Handlers and extractors fail with [`AppError`], whose response carries a
//! [`Classification`] extension and no body. This layer is the only place that
//! turns a classification into JSON. The extension is removed as it is
//! rendered, so a response passing through twice is rendered once.

use std::any::Any;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{AppError, Classification};
use crate::state::AppState;

/// Render the JSON error envelope for classified responses.
///
/// Diagnostics are included only in development.
pub async fn error_boundary(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    render_error_envelope(response, state.config().environment.is_development())
}

/// Replace the body of a classified response with its JSON envelope.
///
/// Status and headers are kept. Responses without a [`Classification`]
/// pass through untouched.
#[must_use]
pub fn render_error_envelope(response: Response, include_details: bool) -> Response {
    let (mut parts, body) = response.into_parts();
    let Some(classification) = parts.extensions.remove::<Classification>() else {
        return Response::from_parts(parts, body);
    };

    let envelope = classification.envelope(include_details);
    match serde_json::to_vec(&envelope) {
        Ok(bytes) => {
            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize error envelope");
            Response::from_parts(parts, Body::empty())
        }
    }
}

/// Turn a caught panic into a classified internal error.
///
/// Used with `tower_http::catch_panic::CatchPanicLayer::custom`.
#[allow(clippy::needless_pass_by_value)]
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|s| (*s).to_owned()))
        .unwrap_or_else(|| "handler panicked".to_owned());

    AppError::unexpected(format!("panic: {message}")).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;

    use super::*;
    use crate::error::ErrorEnvelope;

    async fn envelope(response: Response) -> ErrorEnvelope {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_renders_classified_response() {
        let response = render_error_envelope(AppError::LookupTimeout.into_response(), false);

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            HeaderValue::from_static("application/json")
        );
        let body = envelope(response).await;
        assert_eq!(body.code.as_str(), "timeout_error");
        assert_eq!(body.message, "The operation exceeded the time limit.");
    }

    #[tokio::test]
    async fn test_passes_unclassified_response_through() {
        let response = render_error_envelope((StatusCode::OK, "hello").into_response(), true);
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"hello");
    }

    #[tokio::test]
    async fn test_renders_once() {
        let once = render_error_envelope(AppError::LookupTimeout.into_response(), false);
        assert!(once.extensions().get::<Classification>().is_none());

        let twice = render_error_envelope(once, true);
        let body = envelope(twice).await;
        assert_eq!(body.code.as_str(), "timeout_error");
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn test_panic_is_internal_error() {
        let response = handle_panic(Box::new("index out of bounds"));
        let response = render_error_envelope(response, true);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = envelope(response).await;
        assert_eq!(body.code.as_str(), "internal_error");
        assert_eq!(
            body.details.unwrap().message,
            "panic: index out of bounds"
        );
    }

    #[tokio::test]
    async fn test_panic_details_hidden_in_production() {
        let response = render_error_envelope(handle_panic(Box::new(String::from("boom"))), false);
        let body = envelope(response).await;
        assert!(body.details.is_none());
        assert_eq!(body.message, "An unexpected error occurred. Try again later.");
    }
}
