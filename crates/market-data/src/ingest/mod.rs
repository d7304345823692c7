//! Ingestion orchestrator.
//!
//! For every board query of a paged source:
//!
//! ```text
//! probe (page size 1) --> total == 0 ? skip
//!                     --> page_count = ceil(total / max_page_size)
//!                     --> pages 1..=page_count over max_workers slots
//!                     --> join, merge in page order, tag with the board
//! ```
//!
//! The first failing page aborts the board. Pages still in flight are
//! dropped with the stream, and nothing from the board is returned.

mod pipeline;

pub use pipeline::{ExchangePipeline, ListingSource};

use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{info, warn};

use crate::errors::MarketDataError;
use crate::models::{BoardQuery, RawListing, SourcePage};
use crate::provider::http::DEFAULT_REQUEST_TIMEOUT;
use crate::provider::{DocumentSource, PagedSource, UpstreamClient};

/// Default number of concurrent page fetches per board
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Settings shared by every ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Page fetches in flight per board
    pub max_workers: usize,
    /// Per-request timeout of the client built by [`IngestConfig::upstream_client`]
    pub request_timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl IngestConfig {
    pub fn validate(&self) -> Result<(), MarketDataError> {
        if self.max_workers == 0 {
            return Err(MarketDataError::InvalidConfig(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(MarketDataError::InvalidConfig(
                "request_timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// HTTP client for the upstream sources, bounded by `request_timeout`.
    pub fn upstream_client(&self) -> Result<UpstreamClient, MarketDataError> {
        self.validate()?;
        UpstreamClient::new(self.request_timeout)
    }
}

/// Runs probe-then-fetch ingestion against listing sources.
#[derive(Debug, Clone)]
pub struct Ingestor {
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(config: IngestConfig) -> Result<Self, MarketDataError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Fetch every board of `source`, concatenated in board order.
    pub async fn ingest_paged(&self, source: &dyn PagedSource) -> Result<Vec<RawListing>, MarketDataError> {
        let started = Instant::now();
        let mut rows = Vec::new();

        for query in source.board_queries() {
            rows.extend(self.ingest_board(source, &query).await?);
        }

        info!(
            source = source.id(),
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "paged ingestion finished"
        );
        Ok(rows)
    }

    /// Fetch a single-document source.
    pub async fn ingest_document(
        &self,
        source: &dyn DocumentSource,
    ) -> Result<Vec<RawListing>, MarketDataError> {
        let started = Instant::now();
        let rows = source.fetch_listings().await?;

        info!(
            source = source.id(),
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "document ingestion finished"
        );
        Ok(rows)
    }

    async fn ingest_board(
        &self,
        source: &dyn PagedSource,
        query: &BoardQuery,
    ) -> Result<Vec<RawListing>, MarketDataError> {
        let started = Instant::now();

        let probe = source.fetch_page(query, 1, 1).await?;
        if probe.total == 0 {
            info!(source = source.id(), board = %query.board, "board reports no rows, skipping");
            return Ok(Vec::new());
        }

        let page_size = source.max_page_size().max(1);
        let page_count = probe.total.div_ceil(page_size);

        let mut pages: Vec<SourcePage> = stream::iter(1..=page_count)
            .map(move |page_no| source.fetch_page(query, page_no, page_size))
            .buffer_unordered(self.config.max_workers)
            .try_collect()
            .await?;
        pages.sort_by_key(|page| page.page_no);

        let label = query.board.label();
        let rows: Vec<RawListing> = pages
            .into_iter()
            .flat_map(|page| page.rows)
            .map(|mut row| {
                row.board = label.to_string();
                row
            })
            .collect();

        if rows.len() != probe.total {
            warn!(
                source = source.id(),
                board = %query.board,
                expected = probe.total,
                received = rows.len(),
                "row count differs from the probed total"
            );
        }
        info!(
            source = source.id(),
            board = %query.board,
            total = probe.total,
            page_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "board fetched"
        );

        Ok(rows)
    }
}
