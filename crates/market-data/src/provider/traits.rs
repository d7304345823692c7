//! Listing source trait definitions.
//!
//! Upstream services come in two shapes: paged queries that report a total
//! row count, and single documents that carry the whole listing at once.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{BoardQuery, RawListing, SourcePage};

/// A listing service that answers board queries one page at a time.
///
/// The orchestrator probes each query with a page size of 1 to learn the
/// total, then fetches pages `1..=ceil(total / max_page_size)`.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use secmaster_market_data::provider::PagedSource;
///
/// struct MySource;
///
/// #[async_trait]
/// impl PagedSource for MySource {
///     fn id(&self) -> &'static str {
///         "MY_SOURCE"
///     }
///
///     fn max_page_size(&self) -> usize {
///         50
///     }
///
///     fn board_queries(&self) -> Vec<BoardQuery> {
///         vec![BoardQuery::new(Board::All, "everything")]
///     }
///
///     // ... implement fetch_page
/// }
/// ```
#[async_trait]
pub trait PagedSource: Send + Sync {
    /// Constant identifier like "EASTMONEY" or "SSE", used in logs and errors.
    fn id(&self) -> &'static str;

    /// Largest page size the upstream honors.
    fn max_page_size(&self) -> usize;

    /// The board queries that together make up the exchange's listing.
    fn board_queries(&self) -> Vec<BoardQuery>;

    /// Fetch one page (1-based) of a board query.
    async fn fetch_page(
        &self,
        query: &BoardQuery,
        page_no: usize,
        page_size: usize,
    ) -> Result<SourcePage, MarketDataError>;
}

/// A listing service that publishes the whole listing as one document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    fn id(&self) -> &'static str;

    /// Download and parse the document into raw rows.
    async fn fetch_listings(&self) -> Result<Vec<RawListing>, MarketDataError>;
}
