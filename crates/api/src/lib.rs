//! HTTP API server with observability for the quoting backend.
//!
//! Exposes the catalog, customers, quote submission and approval, and
//! analytics views over REST, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use doc_store::DocumentStore;
use domain::{ActivityLog, CatalogService, CustomerService};
use metrics_exporter_prometheus::PrometheusHandle;
use quoting::QuoteService;
use reporting::{ProductStatsView, QuoteListView, QuoteStatsView};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/products", get(routes::products::list::<S>))
        .route("/products", post(routes::products::create::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/products/{id}", put(routes::products::update::<S>))
        .route("/products/{id}", delete(routes::products::delete::<S>))
        .route("/customers", get(routes::customers::list::<S>))
        .route("/customers", post(routes::customers::create::<S>))
        .route("/customers/{id}", put(routes::customers::update::<S>))
        .route("/customers/{id}", delete(routes::customers::delete::<S>))
        .route("/quotes", post(routes::quotes::create::<S>))
        .route("/quotes", get(routes::quotes::list::<S>))
        .route("/quotes/export", get(routes::quotes::export::<S>))
        .route("/quotes/{id}", get(routes::quotes::get::<S>))
        .route("/quotes/{id}/accept", post(routes::quotes::accept::<S>))
        .route("/quotes/{id}/reject", post(routes::quotes::reject::<S>))
        .route("/analytics/products", get(routes::analytics::products::<S>))
        .route("/analytics/quotes", get(routes::analytics::quotes::<S>))
        .route("/activity", get(routes::analytics::activity::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over the given store.
pub fn create_state<S: DocumentStore + Clone + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        catalog: CatalogService::new(store.clone()),
        customers: CustomerService::new(store.clone()),
        quotes: QuoteService::new(store.clone()),
        quote_list: QuoteListView::new(store.clone()),
        product_stats: ProductStatsView::new(store.clone()),
        quote_stats: QuoteStatsView::new(store.clone()),
        activity: ActivityLog::new(store.clone()),
        store,
    })
}
