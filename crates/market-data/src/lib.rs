//! Security master market data crate
//!
//! Fetches exchange listings from heterogeneous upstream services and turns
//! them into canonical security rows.
//!
//! # Overview
//!
//! The crate supports:
//! - Paged JSON listings (Eastmoney: SZ, US, BSE)
//! - Paged JSONP listings (SSE: SH)
//! - Spreadsheet listings (HKEX: HK)
//! - Bounded-concurrency page fetching with fail-fast cancellation
//! - Per-exchange code padding and board mapping
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | ExchangePipeline |  (one per exchange)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |     Ingestor     | --> |  PagedSource /   |  (Eastmoney, SSE, HKEX)
//! | probe + pages    |     |  DocumentSource  |
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |    Normalizer    |  (padding, board taxonomy, dedupe)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  SecurityRecord  |  (exchange, code, name, board)
//! +------------------+
//! ```
//!
//! Writing the rows is the storage crate's job; this crate never touches the
//! database.

pub mod errors;
pub mod ingest;
pub mod models;
pub mod normalizer;
pub mod provider;

pub use errors::{MarketDataError, RetryClass};
pub use ingest::{ExchangePipeline, IngestConfig, Ingestor, ListingSource, DEFAULT_MAX_WORKERS};
pub use models::{Board, BoardQuery, Exchange, RawListing, SecurityRecord, SourcePage};
pub use provider::{DocumentSource, PagedSource, UpstreamClient};
