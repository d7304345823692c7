use std::sync::Arc;

use secmaster_market_data::ExchangePipeline;

use super::markets_model::{MarketKind, TradingHours};
use crate::errors::Result;
use crate::securities::{Exchange, SecurityList};

/// Trait defining the contract for a market instance.
#[async_trait::async_trait]
pub trait MarketServiceTrait: Send + Sync {
    fn kind(&self) -> MarketKind;

    fn exchanges(&self) -> &[Exchange];

    /// Re-ingest every exchange of the market and replace its partition.
    /// Returns the identifier of the table that was written.
    async fn refresh(&self) -> Result<String>;

    fn trading_hours(&self) -> TradingHours;

    /// Cached snapshot of the market's securities, loaded on first access.
    async fn security_list(&self) -> Result<Arc<SecurityList>>;

    /// Drop the cached snapshot so the next read reloads it.
    async fn invalidate(&self);
}

/// Builds the ingestion pipeline for an exchange.
pub trait PipelineFactory: Send + Sync {
    fn pipeline(&self, exchange: Exchange) -> Result<ExchangePipeline>;
}
