use std::sync::Arc;

use secmaster_core::{MarketKind, MarketRegistry, MarketServiceTrait, UpstreamPipelineFactory};
use secmaster_market_data::{IngestConfig, Ingestor};
use secmaster_storage_sqlite::{db, SecurityRepository};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub registry: MarketRegistry,
}

impl AppState {
    pub fn market(&self, kind: MarketKind) -> anyhow::Result<Arc<dyn MarketServiceTrait>> {
        Ok(self.registry.market(kind)?)
    }
}

/// Installs the global subscriber. `log` records from the library crates are
/// forwarded through tracing-subscriber's log bridge.
pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    let writer = db::spawn_writer(&pool)?;
    let repository = Arc::new(SecurityRepository::new(pool, writer));

    let ingest_config = IngestConfig {
        max_workers: config.max_workers,
        request_timeout: config.request_timeout,
    };
    let client = ingest_config.upstream_client()?;
    let ingestor = Ingestor::new(ingest_config)?;
    let factory = Arc::new(UpstreamPipelineFactory::new(client));

    let registry = MarketRegistry::new(repository, factory, Arc::new(ingestor));
    Ok(AppState { registry })
}
