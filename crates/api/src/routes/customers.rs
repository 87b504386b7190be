//! Customer endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use doc_store::DocumentStore;
use domain::{Customer, CustomerId};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

use super::AppState;

#[derive(Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl CustomerRequest {
    fn into_customer(self) -> Customer {
        Customer {
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
        }
    }
}

#[derive(Serialize)]
pub struct CustomerResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl CustomerResponse {
    fn from_customer(id: CustomerId, customer: Customer) -> Self {
        Self {
            id: id.to_string(),
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
        }
    }
}

#[derive(Serialize)]
pub struct CustomerCreatedResponse {
    pub customer_id: String,
}

/// GET /customers — list customers, sorted by name.
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CustomerResponse>>, ApiError> {
    let customers = state.customers.list_customers().await?;
    Ok(Json(
        customers
            .into_iter()
            .map(|(id, customer)| CustomerResponse::from_customer(id, customer))
            .collect(),
    ))
}

/// POST /customers — add a customer.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<CustomerCreatedResponse>), ApiError> {
    let id = state.customers.add_customer(req.into_customer()).await?;
    Ok((
        StatusCode::CREATED,
        Json(CustomerCreatedResponse {
            customer_id: id.to_string(),
        }),
    ))
}

/// PUT /customers/{id} — replace a customer's fields.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<CustomerRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let customer_id = parse_customer_id(&id)?;
    state
        .customers
        .update_customer(customer_id, req.into_customer())
        .await?;

    let customer = state
        .customers
        .get_customer(customer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Customer {id} not found")))?;
    Ok(Json(CustomerResponse::from_customer(customer_id, customer)))
}

/// DELETE /customers/{id} — remove a customer.
#[tracing::instrument(skip(state))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let customer_id = parse_customer_id(&id)?;
    state.customers.delete_customer(customer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_customer_id(id: &str) -> Result<CustomerId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid customer ID: {e}")))?;
    Ok(CustomerId::from_uuid(uuid))
}
