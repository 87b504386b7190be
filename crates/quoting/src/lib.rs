pub mod committer;
pub mod directory;
pub mod error;
pub mod plan;
pub mod service;

pub use committer::{CommittedQuote, QuoteCommitter};
pub use directory::CustomerDirectory;
pub use error::{QuotingError, Result};
pub use plan::LineItemRequest;
pub use service::QuoteService;
