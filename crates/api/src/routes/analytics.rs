//! Analytics endpoints: the numbers behind the dashboard charts.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use doc_store::DocumentStore;
use domain::ActivityEntry;
use reporting::{ProductStats, QuoteRecord, QuoteStats};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

use super::AppState;

const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;
const DEFAULT_RECENT_QUOTES: usize = 5;

#[derive(Deserialize, Default)]
pub struct ProductAnalyticsParams {
    pub low_stock_threshold: Option<u32>,
}

#[derive(Deserialize, Default)]
pub struct ActivityParams {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct QuoteAnalyticsResponse {
    pub summary: QuoteStats,
    pub recent: Vec<QuoteRecord>,
}

/// GET /analytics/products — catalog summary.
#[tracing::instrument(skip(state, params))]
pub async fn products<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ProductAnalyticsParams>,
) -> Result<Json<ProductStats>, ApiError> {
    let threshold = params
        .low_stock_threshold
        .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    let stats = state.product_stats.summarize(threshold).await?;
    Ok(Json(stats))
}

/// GET /analytics/quotes — quote summary with the most recent quotes.
#[tracing::instrument(skip(state))]
pub async fn quotes<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<QuoteAnalyticsResponse>, ApiError> {
    let summary = state.quote_stats.summarize().await?;
    let recent = state.quote_stats.recent(DEFAULT_RECENT_QUOTES).await?;
    Ok(Json(QuoteAnalyticsResponse { summary, recent }))
}

/// GET /activity — recent audit trail entries, newest first.
#[tracing::instrument(skip(state, params))]
pub async fn activity<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ActivityParams>,
) -> Result<Json<Vec<ActivityEntry>>, ApiError> {
    let entries = state.activity.recent(params.limit.unwrap_or(20)).await?;
    Ok(Json(entries))
}
