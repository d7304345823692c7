//! End-to-end refresh of markets into a real SQLite file, with fake upstreams.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secmaster_core::errors::{Error, RetryClass};
use secmaster_core::{
    Board, Exchange, MarketKind, MarketRegistry, PipelineFactory, SecurityFilter,
    SecurityRecord, SecurityRepositoryTrait,
};
use secmaster_market_data::{
    BoardQuery, ExchangePipeline, IngestConfig, Ingestor, ListingSource, MarketDataError,
    PagedSource, RawListing, SourcePage,
};
use secmaster_storage_sqlite::{create_pool, init, spawn_writer, SecurityRepository};

const PAGE_SIZE: usize = 100;

/// Paged upstream serving `total` rows per board. Names carry a generation
/// counter so tests can tell one refresh's rows from the next.
struct FakeExchange {
    id: &'static str,
    boards: Vec<(Board, usize)>,
    generation: AtomicUsize,
    failing_page: AtomicUsize,
}

impl FakeExchange {
    fn new(id: &'static str, boards: Vec<(Board, usize)>) -> Arc<Self> {
        Arc::new(Self {
            id,
            boards,
            generation: AtomicUsize::new(1),
            failing_page: AtomicUsize::new(0),
        })
    }

    fn total(&self) -> usize {
        self.boards.iter().map(|(_, total)| total).sum()
    }
}

#[async_trait]
impl PagedSource for FakeExchange {
    fn id(&self) -> &'static str {
        self.id
    }

    fn max_page_size(&self) -> usize {
        PAGE_SIZE
    }

    fn board_queries(&self) -> Vec<BoardQuery> {
        self.boards
            .iter()
            .enumerate()
            .map(|(i, (board, _))| BoardQuery::new(*board, i.to_string()))
            .collect()
    }

    async fn fetch_page(
        &self,
        query: &BoardQuery,
        page_no: usize,
        page_size: usize,
    ) -> Result<SourcePage, MarketDataError> {
        if page_no == self.failing_page.load(Ordering::SeqCst) {
            return Err(MarketDataError::UpstreamStatus {
                provider: self.id.to_string(),
                status: 503,
            });
        }

        let board_index: usize = query.filter.parse().unwrap();
        let total = self.boards[board_index].1;
        let generation = self.generation.load(Ordering::SeqCst);
        let start = (page_no - 1) * page_size;
        let end = (start + page_size).min(total);
        let rows = (start..end)
            .map(|i| {
                let code = format!("{}{:05}", board_index + 1, i);
                let name = format!("{} g{} {}", self.id, generation, code);
                RawListing::new(code, name)
            })
            .collect();

        Ok(SourcePage {
            page_no,
            page_size,
            total,
            rows,
        })
    }
}

struct FakeFactory {
    sources: HashMap<Exchange, Arc<FakeExchange>>,
}

impl PipelineFactory for FakeFactory {
    fn pipeline(&self, exchange: Exchange) -> secmaster_core::Result<ExchangePipeline> {
        let source = self
            .sources
            .get(&exchange)
            .ok_or_else(|| Error::Config(format!("no fake source for {}", exchange)))?;
        let source: Arc<dyn PagedSource> = Arc::clone(source) as Arc<dyn PagedSource>;
        Ok(ExchangePipeline::new(exchange, ListingSource::Paged(source)))
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    repository: Arc<SecurityRepository>,
    registry: MarketRegistry,
    sh: Arc<FakeExchange>,
    sz: Arc<FakeExchange>,
    us: Arc<FakeExchange>,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let db_path = init(dir.path().join("secmaster.db").to_str().unwrap()).unwrap();
    let pool = create_pool(&db_path).unwrap();
    let writer = spawn_writer(&pool).unwrap();
    let repository = Arc::new(SecurityRepository::new(pool, writer));

    let sh = FakeExchange::new("FAKE_SH", vec![(Board::AShares, 250), (Board::Star, 30)]);
    let sz = FakeExchange::new("FAKE_SZ", vec![(Board::AShares, 120), (Board::ChiNext, 5)]);
    let us = FakeExchange::new("FAKE_US", vec![(Board::All, 10)]);

    let factory = FakeFactory {
        sources: HashMap::from([
            (Exchange::Sh, Arc::clone(&sh)),
            (Exchange::Sz, Arc::clone(&sz)),
            (Exchange::Us, Arc::clone(&us)),
        ]),
    };
    let ingestor = Ingestor::new(IngestConfig {
        max_workers: 2,
        request_timeout: Duration::from_secs(5),
    })
    .unwrap();

    let registry = MarketRegistry::new(
        Arc::clone(&repository) as Arc<dyn SecurityRepositoryTrait>,
        Arc::new(factory),
        Arc::new(ingestor),
    );

    Harness {
        _dir: dir,
        repository,
        registry,
        sh,
        sz,
        us,
    }
}

fn rows_for(repository: &SecurityRepository, exchanges: &[Exchange]) -> Vec<SecurityRecord> {
    repository
        .query(&SecurityFilter::exchanges(exchanges))
        .unwrap()
}

#[tokio::test]
async fn refresh_writes_every_exchange_of_the_market() {
    let h = harness();
    let cn = h.registry.market(MarketKind::Cn).unwrap();

    let table = cn.refresh().await.unwrap();

    assert_eq!(table, "SECURITY");
    let list = cn.security_list().await.unwrap();
    assert_eq!(list.len(), h.sh.total() + h.sz.total());

    let counts = list.board_counts();
    assert_eq!(counts.get(&(Exchange::Sh, "A-shares")), Some(&250));
    assert_eq!(counts.get(&(Exchange::Sh, "STAR")), Some(&30));
    assert_eq!(counts.get(&(Exchange::Sz, "ChiNext")), Some(&5));
}

#[tokio::test]
async fn refreshing_twice_yields_the_same_rows() {
    let h = harness();
    let cn = h.registry.market(MarketKind::Cn).unwrap();

    cn.refresh().await.unwrap();
    let first: HashSet<SecurityRecord> = rows_for(&h.repository, &[]).into_iter().collect();
    cn.refresh().await.unwrap();
    let second: HashSet<SecurityRecord> = rows_for(&h.repository, &[]).into_iter().collect();

    assert_eq!(first.len(), h.sh.total() + h.sz.total());
    assert_eq!(first, second);
}

#[tokio::test]
async fn refresh_leaves_other_markets_untouched() {
    let h = harness();
    let cn = h.registry.market(MarketKind::Cn).unwrap();
    let us = h.registry.market(MarketKind::Us).unwrap();

    us.refresh().await.unwrap();
    cn.refresh().await.unwrap();
    let us_before = rows_for(&h.repository, &[Exchange::Us]);
    assert_eq!(us_before.len(), h.us.total());

    h.sh.generation.store(2, Ordering::SeqCst);
    h.sz.generation.store(2, Ordering::SeqCst);
    cn.refresh().await.unwrap();

    assert_eq!(rows_for(&h.repository, &[Exchange::Us]), us_before);
    let cn_rows = rows_for(&h.repository, &[Exchange::Sh, Exchange::Sz]);
    assert!(cn_rows.iter().all(|r| r.name.contains(" g2 ")));
}

#[tokio::test]
async fn failed_page_keeps_previous_partition_and_cache() {
    let h = harness();
    let cn = h.registry.market(MarketKind::Cn).unwrap();

    cn.refresh().await.unwrap();
    let cached = cn.security_list().await.unwrap();
    let stored = rows_for(&h.repository, &[]);

    h.sz.generation.store(2, Ordering::SeqCst);
    h.sz.failing_page.store(2, Ordering::SeqCst);
    let err = cn.refresh().await.unwrap_err();

    assert!(matches!(
        err,
        Error::MarketData(MarketDataError::UpstreamStatus { status: 503, .. })
    ));
    assert_eq!(err.retry_class(), RetryClass::Transient);
    assert_eq!(rows_for(&h.repository, &[]), stored);
    assert!(Arc::ptr_eq(&cached, &cn.security_list().await.unwrap()));

    h.sz.failing_page.store(0, Ordering::SeqCst);
    cn.refresh().await.unwrap();
    let reloaded = cn.security_list().await.unwrap();
    assert!(!Arc::ptr_eq(&cached, &reloaded));
    assert!(reloaded
        .iter()
        .filter(|r| r.exchange == Exchange::Sz)
        .all(|r| r.name.contains(" g2 ")));
}

#[tokio::test]
async fn market_without_a_source_fails_on_first_use() {
    let h = harness();
    assert!(matches!(
        h.registry.market(MarketKind::Hk),
        Err(Error::Config(_))
    ));
}
