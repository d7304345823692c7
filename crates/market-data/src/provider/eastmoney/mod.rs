//! Eastmoney list provider.
//!
//! Serves the paged listings for Shenzhen, the US markets and Beijing.
//!
//! # API Endpoint
//!
//! - List: `https://push2.eastmoney.com/api/qt/clist/get?pn={page}&pz={size}&fs={filter}&fields=f12,f14`
//!
//! # Response Format
//!
//! `{"rc":0,"data":{"total":N,"diff":[{"f12":"000001","f14":"平安银行"}]}}`;
//! `data` is `null` when the filter matches nothing.

mod models;

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{Board, BoardQuery, Exchange, RawListing, SourcePage};
use crate::provider::http::UpstreamClient;
use crate::provider::{value_to_text, PagedSource};

use models::ClistResponse;

const BASE_URL: &str = "https://push2.eastmoney.com";
const LIST_PATH: &str = "/api/qt/clist/get";
const REFERER: &str = "https://quote.eastmoney.com/";
const PROVIDER_ID: &str = "EASTMONEY";
const MAX_PAGE_SIZE: usize = 100;

/// Eastmoney paged source bound to one exchange's board filters.
pub struct EastmoneySource {
    client: UpstreamClient,
    base_url: String,
    queries: Vec<BoardQuery>,
}

impl EastmoneySource {
    /// Source for `exchange`. Shanghai and Hong Kong use other upstreams.
    pub fn for_exchange(client: UpstreamClient, exchange: Exchange) -> Result<Self, MarketDataError> {
        let queries = match exchange {
            Exchange::Sz => vec![
                BoardQuery::new(Board::AShares, "m:0 t:6,m:0 t:13"),
                BoardQuery::new(Board::ChiNext, "m:0 t:80"),
            ],
            Exchange::Us => vec![BoardQuery::new(Board::All, "m:105,m:106,m:107")],
            Exchange::Bse => vec![BoardQuery::new(Board::AShares, "m:0 t:81 s:2048")],
            Exchange::Sh | Exchange::Hk => {
                return Err(MarketDataError::InvalidConfig(format!(
                    "{} has no Eastmoney listing query",
                    exchange
                )))
            }
        };

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            queries,
        })
    }

    /// Point the source at another host (mock servers in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn parse_page(body: &str, page_no: usize, page_size: usize) -> Result<SourcePage, MarketDataError> {
        let response: ClistResponse = serde_json::from_str(body).map_err(|e| {
            MarketDataError::schema_drift(PROVIDER_ID, format!("unparsable clist body: {}", e))
        })?;

        if response.rc != 0 {
            return Err(MarketDataError::schema_drift(
                PROVIDER_ID,
                format!("unexpected rc {}", response.rc),
            ));
        }

        let (total, rows) = match response.data {
            Some(data) => {
                let rows = data
                    .diff
                    .iter()
                    .map(|row| RawListing::new(value_to_text(&row.f12), value_to_text(&row.f14)))
                    .collect();
                (data.total, rows)
            }
            None => (0, Vec::new()),
        };

        Ok(SourcePage {
            page_no,
            page_size,
            total,
            rows,
        })
    }
}

#[async_trait]
impl PagedSource for EastmoneySource {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn max_page_size(&self) -> usize {
        MAX_PAGE_SIZE
    }

    fn board_queries(&self) -> Vec<BoardQuery> {
        self.queries.clone()
    }

    async fn fetch_page(
        &self,
        query: &BoardQuery,
        page_no: usize,
        page_size: usize,
    ) -> Result<SourcePage, MarketDataError> {
        let url = format!("{}{}", self.base_url, LIST_PATH);
        let params = [
            ("pn", page_no.to_string()),
            ("pz", page_size.to_string()),
            ("po", "1".to_string()),
            ("np", "1".to_string()),
            ("fltt", "2".to_string()),
            ("invt", "2".to_string()),
            ("fid", "f12".to_string()),
            ("fs", query.filter.clone()),
            ("fields", "f12,f14".to_string()),
        ];

        let body = self.client.get_text(PROVIDER_ID, &url, &params, REFERER).await?;
        Self::parse_page(&body, page_no, page_size)
    }
}
