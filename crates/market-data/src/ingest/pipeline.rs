use std::sync::Arc;

use crate::errors::MarketDataError;
use crate::models::{Exchange, SecurityRecord};
use crate::normalizer::normalize;
use crate::provider::eastmoney::EastmoneySource;
use crate::provider::hkex::HkexSource;
use crate::provider::sse::SseSource;
use crate::provider::{DocumentSource, PagedSource, UpstreamClient};

use super::Ingestor;

/// Where an exchange's listing comes from.
#[derive(Clone)]
pub enum ListingSource {
    Paged(Arc<dyn PagedSource>),
    Document(Arc<dyn DocumentSource>),
}

impl ListingSource {
    pub fn id(&self) -> &'static str {
        match self {
            ListingSource::Paged(source) => source.id(),
            ListingSource::Document(source) => source.id(),
        }
    }
}

/// Source plus normalizer for one exchange.
#[derive(Clone)]
pub struct ExchangePipeline {
    exchange: Exchange,
    source: ListingSource,
}

impl ExchangePipeline {
    pub fn new(exchange: Exchange, source: ListingSource) -> Self {
        Self { exchange, source }
    }

    /// Pipeline wired to the production upstream for `exchange`.
    pub fn upstream(exchange: Exchange, client: &UpstreamClient) -> Result<Self, MarketDataError> {
        let source = match exchange {
            Exchange::Sh => ListingSource::Paged(Arc::new(SseSource::new(client.clone()))),
            Exchange::Hk => ListingSource::Document(Arc::new(HkexSource::new(client.clone()))),
            Exchange::Sz | Exchange::Us | Exchange::Bse => ListingSource::Paged(Arc::new(
                EastmoneySource::for_exchange(client.clone(), exchange)?,
            )),
        };
        Ok(Self::new(exchange, source))
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    pub fn source_id(&self) -> &'static str {
        self.source.id()
    }

    /// Fetch and normalize the exchange's full listing.
    pub async fn run(&self, ingestor: &Ingestor) -> Result<Vec<SecurityRecord>, MarketDataError> {
        let raw = match &self.source {
            ListingSource::Paged(source) => ingestor.ingest_paged(source.as_ref()).await?,
            ListingSource::Document(source) => ingestor.ingest_document(source.as_ref()).await?,
        };
        normalize(self.exchange, raw)
    }
}
