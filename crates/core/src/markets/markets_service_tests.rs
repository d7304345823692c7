use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use secmaster_market_data::{
    DocumentSource, ExchangePipeline, IngestConfig, Ingestor, ListingSource, MarketDataError,
    RawListing,
};

use super::*;
use crate::errors::{Error, Result};
use crate::securities::{
    Board, Exchange, InsertMode, InsertReport, PartitionReport, SecurityFilter, SecurityRecord,
    SecurityRepositoryTrait,
};

// ============== Mock Repository ==============

#[derive(Default)]
struct MockSecurityRepository {
    records: RwLock<Vec<SecurityRecord>>,
    query_calls: AtomicUsize,
}

impl MockSecurityRepository {
    fn with_records(records: Vec<SecurityRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            query_calls: AtomicUsize::new(0),
        }
    }

    fn snapshot(&self) -> Vec<SecurityRecord> {
        let mut records = self.records.read().unwrap().clone();
        records.sort_by(|a, b| (a.exchange, &a.code).cmp(&(b.exchange, &b.code)));
        records
    }
}

#[async_trait]
impl SecurityRepositoryTrait for MockSecurityRepository {
    fn table_exists(&self, _table: &str) -> Result<bool> {
        Ok(true)
    }

    async fn execute(&self, _statement: &str, _params: Vec<String>) -> Result<usize> {
        unimplemented!()
    }

    async fn insert(
        &self,
        _table: &str,
        _rows: Vec<SecurityRecord>,
        _mode: InsertMode,
    ) -> Result<InsertReport> {
        unimplemented!()
    }

    fn query(&self, filter: &SecurityFilter) -> Result<Vec<SecurityRecord>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|r| filter.exchanges.is_empty() || filter.exchanges.contains(&r.exchange))
            .collect())
    }

    async fn replace_partition(
        &self,
        exchanges: &[Exchange],
        rows: Vec<SecurityRecord>,
    ) -> Result<PartitionReport> {
        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|r| !exchanges.contains(&r.exchange));
        let deleted = before - records.len();
        let inserted = rows.len();
        records.extend(rows);
        Ok(PartitionReport {
            deleted,
            inserted,
            created: None,
        })
    }
}

// ============== Mock Sources ==============

struct StaticSource {
    rows: RwLock<Vec<RawListing>>,
    fail: bool,
}

#[async_trait]
impl DocumentSource for StaticSource {
    fn id(&self) -> &'static str {
        "STATIC"
    }

    async fn fetch_listings(&self) -> std::result::Result<Vec<RawListing>, MarketDataError> {
        if self.fail {
            return Err(MarketDataError::UpstreamStatus {
                provider: "STATIC".to_string(),
                status: 500,
            });
        }
        Ok(self.rows.read().unwrap().clone())
    }
}

#[derive(Default)]
struct MockPipelineFactory {
    sources: HashMap<Exchange, Arc<StaticSource>>,
}

impl MockPipelineFactory {
    fn with_rows(mut self, exchange: Exchange, rows: Vec<RawListing>) -> Self {
        self.sources.insert(
            exchange,
            Arc::new(StaticSource {
                rows: RwLock::new(rows),
                fail: false,
            }),
        );
        self
    }

    fn failing(mut self, exchange: Exchange) -> Self {
        self.sources.insert(
            exchange,
            Arc::new(StaticSource {
                rows: RwLock::new(Vec::new()),
                fail: true,
            }),
        );
        self
    }
}

impl PipelineFactory for MockPipelineFactory {
    fn pipeline(&self, exchange: Exchange) -> Result<ExchangePipeline> {
        let source = self
            .sources
            .get(&exchange)
            .cloned()
            .ok_or_else(|| Error::Config(format!("no source for {}", exchange)))?;
        Ok(ExchangePipeline::new(exchange, ListingSource::Document(source)))
    }
}

// ============== Helpers ==============

fn raw(code: &str, board: &str) -> RawListing {
    let mut row = RawListing::new(code, format!("Security {}", code));
    row.board = board.to_string();
    row
}

fn record(exchange: Exchange, code: &str, board: Board) -> SecurityRecord {
    SecurityRecord {
        exchange,
        code: code.to_string(),
        name: format!("Old {}", code),
        board,
    }
}

fn cn_factory() -> MockPipelineFactory {
    MockPipelineFactory::default()
        .with_rows(
            Exchange::Sh,
            vec![raw("600000", "A-shares"), raw("688001", "STAR")],
        )
        .with_rows(
            Exchange::Sz,
            vec![raw("1", "A-shares"), raw("300750", "ChiNext")],
        )
}

fn ingestor() -> Arc<Ingestor> {
    Arc::new(Ingestor::new(IngestConfig::default()).unwrap())
}

fn cn_market(
    factory: &MockPipelineFactory,
    repository: Arc<MockSecurityRepository>,
) -> MarketService {
    MarketService::new(MarketKind::Cn, factory, ingestor(), repository).unwrap()
}

// ============== Tests ==============

#[tokio::test]
async fn test_refresh_writes_partition_and_returns_table() {
    let repository = Arc::new(MockSecurityRepository::default());
    let market = cn_market(&cn_factory(), repository.clone());

    let table = market.refresh().await.unwrap();

    assert_eq!(table, "SECURITY");
    let codes: Vec<String> = repository.snapshot().into_iter().map(|r| r.code).collect();
    assert_eq!(codes, vec!["600000", "688001", "000001", "300750"]);
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let repository = Arc::new(MockSecurityRepository::default());
    let market = cn_market(&cn_factory(), repository.clone());

    market.refresh().await.unwrap();
    let first = repository.snapshot();
    market.refresh().await.unwrap();

    assert_eq!(repository.snapshot(), first);
}

#[tokio::test]
async fn test_refresh_leaves_other_partitions_untouched() {
    let us_row = record(Exchange::Us, "AAPL", Board::All);
    let repository = Arc::new(MockSecurityRepository::with_records(vec![
        us_row.clone(),
        record(Exchange::Sz, "000004", Board::AShares),
    ]));
    let market = cn_market(&cn_factory(), repository.clone());

    market.refresh().await.unwrap();

    let records = repository.snapshot();
    assert!(records.contains(&us_row));
    assert!(!records.iter().any(|r| r.code == "000004"));
}

#[tokio::test]
async fn test_security_list_is_cached() {
    let repository = Arc::new(MockSecurityRepository::with_records(vec![record(
        Exchange::Sh,
        "600000",
        Board::AShares,
    )]));
    let market = cn_market(&cn_factory(), repository.clone());

    let first = market.security_list().await.unwrap();
    let second = market.security_list().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(repository.query_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_first_access_loads_once() {
    let repository = Arc::new(MockSecurityRepository::default());
    let market = cn_market(&cn_factory(), repository.clone());

    let (a, b) = futures::join!(market.security_list(), market.security_list());

    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    assert_eq!(repository.query_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_refresh_invalidates_cached_list() {
    let repository = Arc::new(MockSecurityRepository::default());
    let market = cn_market(&cn_factory(), repository.clone());

    assert!(market.security_list().await.unwrap().is_empty());
    market.refresh().await.unwrap();

    let list = market.security_list().await.unwrap();
    assert_eq!(list.len(), 4);
    assert!(list.find(Exchange::Sz, "000001").is_some());
    assert_eq!(repository.query_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_ingestion_keeps_partition_and_cache() {
    let existing = vec![
        record(Exchange::Sh, "600000", Board::AShares),
        record(Exchange::Sz, "000001", Board::AShares),
    ];
    let repository = Arc::new(MockSecurityRepository::with_records(existing.clone()));
    let factory = cn_factory().failing(Exchange::Sz);
    let market = cn_market(&factory, repository.clone());

    let cached = market.security_list().await.unwrap();
    let err = market.refresh().await.unwrap_err();

    assert!(matches!(err, Error::MarketData(_)));
    assert!(err.retry_class().is_retryable());
    assert_eq!(repository.snapshot(), existing);
    assert!(Arc::ptr_eq(&cached, &market.security_list().await.unwrap()));
}

#[tokio::test]
async fn test_unmapped_board_aborts_refresh() {
    let repository = Arc::new(MockSecurityRepository::default());
    let factory = cn_factory().with_rows(Exchange::Sz, vec![raw("200002", "B股")]);
    let market = cn_market(&factory, repository.clone());

    let err = market.refresh().await.unwrap_err();

    assert!(matches!(
        err,
        Error::MarketData(MarketDataError::UnmappedBoard { .. })
    ));
    assert!(repository.snapshot().is_empty());
}

#[test]
fn test_market_exposes_trading_hours() {
    let repository = Arc::new(MockSecurityRepository::default());
    let market = cn_market(&cn_factory(), repository);

    assert_eq!(market.kind(), MarketKind::Cn);
    assert_eq!(market.exchanges(), &[Exchange::Sh, Exchange::Sz]);
    assert_eq!(market.trading_hours(), MarketKind::Cn.trading_hours());
}

#[test]
fn test_registry_returns_same_instance_per_kind() {
    let repository: Arc<dyn SecurityRepositoryTrait> = Arc::new(MockSecurityRepository::default());
    let factory = cn_factory()
        .with_rows(Exchange::Hk, Vec::new())
        .with_rows(Exchange::Us, Vec::new());
    let registry = MarketRegistry::new(repository.clone(), Arc::new(factory), ingestor());

    let first = registry.market(MarketKind::Cn).unwrap();
    let second = registry.market(MarketKind::Cn).unwrap();
    let hk = registry.market(MarketKind::Hk).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(!Arc::ptr_eq(&first, &hk));
    assert_eq!(hk.kind(), MarketKind::Hk);

    let other_registry = MarketRegistry::new(repository, Arc::new(cn_factory()), ingestor());
    let other = other_registry.market(MarketKind::Cn).unwrap();
    assert!(!Arc::ptr_eq(&first, &other));
}

#[test]
fn test_registry_surfaces_factory_errors() {
    let repository: Arc<dyn SecurityRepositoryTrait> = Arc::new(MockSecurityRepository::default());
    let registry = MarketRegistry::new(repository, Arc::new(cn_factory()), ingestor());

    assert!(matches!(
        registry.market(MarketKind::Bse),
        Err(Error::Config(_))
    ));
}
