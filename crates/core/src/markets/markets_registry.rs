use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use secmaster_market_data::Ingestor;

use super::markets_model::MarketKind;
use super::markets_service::MarketService;
use super::markets_traits::{MarketServiceTrait, PipelineFactory};
use crate::errors::Result;
use crate::securities::SecurityRepositoryTrait;

/// Hands out one shared market instance per kind.
///
/// Built once at startup; every caller asking for the same kind gets the same
/// `Arc`, so the cached security list and the refresh lock are shared.
pub struct MarketRegistry {
    repository: Arc<dyn SecurityRepositoryTrait>,
    factory: Arc<dyn PipelineFactory>,
    ingestor: Arc<Ingestor>,
    markets: Mutex<HashMap<MarketKind, Arc<dyn MarketServiceTrait>>>,
}

impl MarketRegistry {
    pub fn new(
        repository: Arc<dyn SecurityRepositoryTrait>,
        factory: Arc<dyn PipelineFactory>,
        ingestor: Arc<Ingestor>,
    ) -> Self {
        Self {
            repository,
            factory,
            ingestor,
            markets: Mutex::new(HashMap::new()),
        }
    }

    /// The market instance for `kind`, created on first request.
    pub fn market(&self, kind: MarketKind) -> Result<Arc<dyn MarketServiceTrait>> {
        let mut markets = self.markets.lock().unwrap_or_else(|poisoned| {
            warn!("Market registry mutex was poisoned, recovering");
            poisoned.into_inner()
        });

        if let Some(market) = markets.get(&kind) {
            return Ok(Arc::clone(market));
        }

        let market: Arc<dyn MarketServiceTrait> = Arc::new(MarketService::new(
            kind,
            self.factory.as_ref(),
            Arc::clone(&self.ingestor),
            Arc::clone(&self.repository),
        )?);
        debug!("Created market instance for {}", kind);
        markets.insert(kind, Arc::clone(&market));
        Ok(market)
    }
}
