pub mod analytics;
pub mod customers;
pub mod health;
pub mod metrics;
pub mod products;
pub mod quotes;

use doc_store::DocumentStore;
use domain::{ActivityLog, CatalogService, CustomerService};
use quoting::QuoteService;
use reporting::{ProductStatsView, QuoteListView, QuoteStatsView};

/// Shared application state accessible from all handlers.
pub struct AppState<S: DocumentStore> {
    pub catalog: CatalogService<S>,
    pub customers: CustomerService<S>,
    pub quotes: QuoteService<S>,
    pub quote_list: QuoteListView<S>,
    pub product_stats: ProductStatsView<S>,
    pub quote_stats: QuoteStatsView<S>,
    pub activity: ActivityLog<S>,
    pub store: S,
}
