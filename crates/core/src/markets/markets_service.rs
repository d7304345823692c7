use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use log::{debug, info};
use secmaster_market_data::{ExchangePipeline, Ingestor, UpstreamClient};
use tokio::sync::Mutex;

use super::markets_model::{MarketKind, TradingHours};
use super::markets_traits::{MarketServiceTrait, PipelineFactory};
use crate::constants::SECURITY_TABLE;
use crate::errors::Result;
use crate::securities::{Exchange, SecurityFilter, SecurityList, SecurityRepositoryTrait};

/// Pipelines backed by the production upstream services.
pub struct UpstreamPipelineFactory {
    client: UpstreamClient,
}

impl UpstreamPipelineFactory {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }
}

impl PipelineFactory for UpstreamPipelineFactory {
    fn pipeline(&self, exchange: Exchange) -> Result<ExchangePipeline> {
        Ok(ExchangePipeline::upstream(exchange, &self.client)?)
    }
}

/// One market instance: its pipelines, the store and the cached security list.
pub struct MarketService {
    kind: MarketKind,
    pipelines: Vec<ExchangePipeline>,
    ingestor: Arc<Ingestor>,
    repository: Arc<dyn SecurityRepositoryTrait>,
    cache: Mutex<Option<Arc<SecurityList>>>,
    refresh_lock: Mutex<()>,
}

impl MarketService {
    /// Creates a new MarketService with one pipeline per exchange of `kind`.
    pub fn new(
        kind: MarketKind,
        factory: &dyn PipelineFactory,
        ingestor: Arc<Ingestor>,
        repository: Arc<dyn SecurityRepositoryTrait>,
    ) -> Result<Self> {
        let pipelines = kind
            .exchanges()
            .iter()
            .map(|exchange| factory.pipeline(*exchange))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            kind,
            pipelines,
            ingestor,
            repository,
            cache: Mutex::new(None),
            refresh_lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl MarketServiceTrait for MarketService {
    fn kind(&self) -> MarketKind {
        self.kind
    }

    fn exchanges(&self) -> &[Exchange] {
        self.kind.exchanges()
    }

    async fn refresh(&self) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;
        let started = Instant::now();

        // Ingest everything before touching the store; any failure leaves the
        // stored partition as it was.
        let mut rows = Vec::new();
        for pipeline in &self.pipelines {
            let records = pipeline.run(&self.ingestor).await?;
            debug!(
                "{}: {} securities from {}",
                pipeline.exchange(),
                records.len(),
                pipeline.source_id()
            );
            rows.extend(records);
        }

        let report = self
            .repository
            .replace_partition(self.exchanges(), rows)
            .await?;
        self.invalidate().await;

        info!(
            "Market {} refreshed: {} rows replaced by {} in {:?}",
            self.kind,
            report.deleted,
            report.inserted,
            started.elapsed()
        );

        Ok(SECURITY_TABLE.to_string())
    }

    fn trading_hours(&self) -> TradingHours {
        self.kind.trading_hours()
    }

    async fn security_list(&self) -> Result<Arc<SecurityList>> {
        let mut cache = self.cache.lock().await;
        if let Some(list) = cache.as_ref() {
            return Ok(Arc::clone(list));
        }

        let records = self
            .repository
            .query(&SecurityFilter::exchanges(self.exchanges()))?;
        debug!("Market {}: loaded {} securities", self.kind, records.len());

        let list = Arc::new(SecurityList::new(self.exchanges().to_vec(), records));
        *cache = Some(Arc::clone(&list));
        Ok(list)
    }

    async fn invalidate(&self) {
        self.cache.lock().await.take();
    }
}
