//! Quote submission, listing, export, and approval endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::NaiveDate;
use doc_store::DocumentStore;
use domain::{Customer, CustomerId, ProductId, QuoteId, QuoteStatus};
use quoting::LineItemRequest;
use reporting::{QuoteFilter, QuoteRecord, quotes_csv};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

use super::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct SubmitQuoteRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
    pub customer: CustomerPayload,
    pub items: Vec<QuoteItemPayload>,
}

#[derive(Deserialize)]
pub struct CustomerPayload {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Deserialize)]
pub struct QuoteItemPayload {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Deserialize, Default)]
pub struct QuoteListParams {
    pub status: Option<String>,
    pub search: Option<String>,
    pub date: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct QuoteItemResponse {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub id: String,
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub status: String,
    pub total_cents: i64,
    pub created_at: String,
    pub items: Vec<QuoteItemResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl QuoteResponse {
    fn from_record(record: QuoteRecord) -> Self {
        let quote = record.quote;
        Self {
            id: record.id.to_string(),
            customer_id: quote.buyer.id.map(|id| id.to_string()),
            customer_name: quote.buyer.contact.name,
            customer_email: quote.buyer.contact.email,
            status: quote.status.to_string(),
            total_cents: quote.total_amount.cents(),
            created_at: quote.created_at.to_rfc3339(),
            items: quote
                .items
                .into_iter()
                .map(|item| QuoteItemResponse {
                    product_id: item.product_id.to_string(),
                    name: item.name,
                    category: item.category,
                    unit_price_cents: item.unit_price.cents(),
                    quantity: item.quantity,
                })
                .collect(),
            accepted_at: quote.accepted_at.map(|t| t.to_rfc3339()),
            rejected_at: quote.rejected_at.map(|t| t.to_rfc3339()),
            rejection_reason: quote.rejection_reason,
        }
    }
}

#[derive(Serialize)]
pub struct QuoteCreatedResponse {
    pub quote_id: String,
    pub status: String,
    pub total_cents: i64,
}

// -- Handlers --

/// POST /quotes — submit a quote; decrements stock atomically.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<SubmitQuoteRequest>,
) -> Result<(StatusCode, Json<QuoteCreatedResponse>), ApiError> {
    let customer_id = req
        .customer_id
        .as_deref()
        .map(|id| {
            uuid::Uuid::parse_str(id)
                .map(CustomerId::from_uuid)
                .map_err(|e| ApiError::BadRequest(format!("Invalid customer_id: {e}")))
        })
        .transpose()?;

    let contact = Customer {
        name: req.customer.name,
        email: req.customer.email,
        phone: req.customer.phone,
        address: req.customer.address,
    };

    let mut items = Vec::with_capacity(req.items.len());
    for item in &req.items {
        let uuid = uuid::Uuid::parse_str(&item.product_id)
            .map_err(|e| ApiError::BadRequest(format!("Invalid product_id: {e}")))?;
        items.push(LineItemRequest::new(
            ProductId::from_uuid(uuid),
            item.quantity,
        ));
    }

    let committed = state.quotes.submit_quote(customer_id, contact, &items).await?;

    Ok((
        StatusCode::CREATED,
        Json(QuoteCreatedResponse {
            quote_id: committed.id.to_string(),
            status: committed.quote.status.to_string(),
            total_cents: committed.quote.total_amount.cents(),
        }),
    ))
}

/// GET /quotes — list quotes matching the filter params, newest first.
#[tracing::instrument(skip(state, params))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<QuoteListParams>,
) -> Result<Json<Vec<QuoteResponse>>, ApiError> {
    let filter = build_filter(&params)?;
    let records = state.quote_list.list(&filter).await?;
    Ok(Json(
        records.into_iter().map(QuoteResponse::from_record).collect(),
    ))
}

/// GET /quotes/export — download the filtered quotes as CSV.
#[tracing::instrument(skip(state, params))]
pub async fn export<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<QuoteListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = build_filter(&params)?;
    let bytes = quotes_csv(&state.store, &filter).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"quotes_export.csv\"",
            ),
        ],
        bytes,
    ))
}

/// GET /quotes/{id} — load a single quote.
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let quote_id = parse_quote_id(&id)?;
    let record = state
        .quote_list
        .get(quote_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Quote {id} not found")))?;

    Ok(Json(QuoteResponse::from_record(record)))
}

/// POST /quotes/{id}/accept — accept a Pending quote.
#[tracing::instrument(skip(state))]
pub async fn accept<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let quote_id = parse_quote_id(&id)?;
    let quote = state.quotes.accept_quote(quote_id).await?;
    Ok(Json(QuoteResponse::from_record(QuoteRecord {
        id: quote_id,
        quote,
    })))
}

/// POST /quotes/{id}/reject — reject a Pending quote; the body may carry
/// an optional reason (`{}` rejects without one).
#[tracing::instrument(skip(state, req))]
pub async fn reject<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let quote_id = parse_quote_id(&id)?;
    let reason = req.reason;
    let quote = state.quotes.reject_quote(quote_id, reason).await?;
    Ok(Json(QuoteResponse::from_record(QuoteRecord {
        id: quote_id,
        quote,
    })))
}

fn build_filter(params: &QuoteListParams) -> Result<QuoteFilter, ApiError> {
    let mut filter = QuoteFilter::new();

    if let Some(ref status) = params.status {
        filter = filter.status(parse_status(status)?);
    }
    if let Some(ref search) = params.search
        && !search.trim().is_empty()
    {
        filter = filter.search(search.trim());
    }
    if let Some(ref date) = params.date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| ApiError::BadRequest(format!("Invalid date: {e}")))?;
        filter = filter.date(date);
    }

    Ok(filter)
}

fn parse_status(status: &str) -> Result<QuoteStatus, ApiError> {
    match status {
        "Pending" => Ok(QuoteStatus::Pending),
        "Accepted" => Ok(QuoteStatus::Accepted),
        "Rejected" => Ok(QuoteStatus::Rejected),
        other => Err(ApiError::BadRequest(format!("Unknown status: {other}"))),
    }
}

fn parse_quote_id(id: &str) -> Result<QuoteId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid quote ID: {e}")))?;
    Ok(QuoteId::from_uuid(uuid))
}
