//! Customer CRUD handlers.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::error::{AppError, Result};
use crate::models::{CustomerRequest, CustomerResponse};
use crate::state::AppState;
use crate::validation::{extract_customer_id, extract_validated_json};

/// List all customers, ordered by name.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<CustomerResponse>>> {
    let customers = state.customers().list_customers().await?;
    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

/// Show a single customer.
pub async fn show(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<CustomerResponse>> {
    let id = extract_customer_id(path)?;
    let customer = state
        .customers()
        .get_customer(id)
        .await?
        .ok_or(AppError::RecordNotFound(id))?;
    Ok(Json(customer.into()))
}

/// Create a customer.
///
/// Responds `201 Created` with a `Location` header pointing at the new record.
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<CustomerRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let draft = extract_validated_json(body)?;
    let customer = state.customers().create_customer(draft).await?;
    let location = format!("/customers/{}", customer.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CustomerResponse::from(customer)),
    ))
}

/// Replace a customer's fields.
pub async fn update(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<CustomerRequest>, JsonRejection>,
) -> Result<Json<CustomerResponse>> {
    let id = extract_customer_id(path)?;
    let draft = extract_validated_json(body)?;
    let customer = state.customers().update_customer(id, draft).await?;
    Ok(Json(customer.into()))
}

/// Delete a customer.
pub async fn destroy(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<StatusCode> {
    let id = extract_customer_id(path)?;
    if state.customers().delete_customer(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::RecordNotFound(id))
    }
}

/// Existence check without a body.
pub async fn exists(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<StatusCode> {
    let id = extract_customer_id(path)?;
    if state.customers().customer_exists(id).await {
        Ok(StatusCode::OK)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}
