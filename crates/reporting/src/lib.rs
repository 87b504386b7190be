pub mod error;
pub mod export;
pub mod product_stats;
pub mod quote_list;
pub mod quote_stats;

pub use error::{ReportingError, Result};
pub use export::quotes_csv;
pub use product_stats::{CategoryBreakdown, LowStockProduct, ProductStats, ProductStatsView};
pub use quote_list::{QuoteFilter, QuoteListView, QuoteRecord};
pub use quote_stats::{QuoteStats, QuoteStatsView};
