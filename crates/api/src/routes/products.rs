//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use doc_store::DocumentStore;
use domain::{Money, Product, ProductId, ProductInput, ProductStatus};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

use super::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub price_cents: i64,
    pub category: String,
    pub stock: u32,
    #[serde(default)]
    pub status: ProductStatus,
}

impl ProductRequest {
    fn into_input(self) -> ProductInput {
        ProductInput {
            name: self.name,
            price: Money::from_cents(self.price_cents),
            category: self.category,
            stock: self.stock,
            status: self.status,
        }
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub category: String,
    pub stock: u32,
    pub status: String,
}

impl ProductResponse {
    fn from_product(id: ProductId, product: Product) -> Self {
        Self {
            id: id.to_string(),
            name: product.name,
            price_cents: product.price.cents(),
            category: product.category,
            stock: product.stock,
            status: product.status.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct ProductCreatedResponse {
    pub product_id: String,
}

// -- Handlers --

/// GET /products — list the catalog.
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.list_products().await?;
    Ok(Json(
        products
            .into_iter()
            .map(|(id, product)| ProductResponse::from_product(id, product))
            .collect(),
    ))
}

/// POST /products — add a product.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductCreatedResponse>), ApiError> {
    let id = state.catalog.add_product(req.into_input()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductCreatedResponse {
            product_id: id.to_string(),
        }),
    ))
}

/// GET /products/{id} — load a product.
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = parse_product_id(&id)?;
    let product = state
        .catalog
        .get_product(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;

    Ok(Json(ProductResponse::from_product(product_id, product)))
}

/// PUT /products/{id} — replace a product's fields.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id = parse_product_id(&id)?;
    state
        .catalog
        .update_product(product_id, req.into_input())
        .await?;

    let product = state
        .catalog
        .get_product(product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;
    Ok(Json(ProductResponse::from_product(product_id, product)))
}

/// DELETE /products/{id} — remove a product.
#[tracing::instrument(skip(state))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let product_id = parse_product_id(&id)?;
    state.catalog.delete_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_product_id(id: &str) -> Result<ProductId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid product ID: {e}")))?;
    Ok(ProductId::from_uuid(uuid))
}
