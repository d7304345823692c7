//! Shanghai Stock Exchange common-query provider.
//!
//! The SSE site answers listing queries as JSONP: the JSON payload is wrapped
//! in a caller-chosen callback, `jsonpCallback({...})`.
//!
//! # API Endpoint
//!
//! - `https://query.sse.com.cn/sseQuery/commonQuery.do?sqlId=COMMON_SSE_CP_GPJCTPZ_GPLB_GP_L&STOCK_TYPE={type}&pageHelp.pageNo={page}...`
//!
//! `STOCK_TYPE` 1 selects main-board A-shares, 8 the STAR (sci-tech) board.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{Board, BoardQuery, RawListing, SourcePage};
use crate::provider::http::UpstreamClient;
use crate::provider::{value_to_text, PagedSource};

const BASE_URL: &str = "https://query.sse.com.cn";
const QUERY_PATH: &str = "/sseQuery/commonQuery.do";
const REFERER: &str = "https://www.sse.com.cn/";
const PROVIDER_ID: &str = "SSE";
const MAX_PAGE_SIZE: usize = 60;
const CALLBACK: &str = "jsonpCallback";
const SQL_ID: &str = "COMMON_SSE_CP_GPJCTPZ_GPLB_GP_L";
const COMPANY_STATUS: &str = "2,4,5,7,8";

#[derive(Debug, Deserialize)]
struct CommonQueryResponse {
    #[serde(rename = "pageHelp")]
    page_help: Option<PageHelp>,
    #[serde(default)]
    result: Vec<SseRow>,
}

#[derive(Debug, Deserialize)]
struct PageHelp {
    /// Reported as a number, occasionally as a string
    total: Value,
}

#[derive(Debug, Deserialize)]
struct SseRow {
    #[serde(rename = "A_STOCK_CODE")]
    code: Value,
    #[serde(rename = "COMPANY_ABBR")]
    name: Value,
}

/// Paged source for Shanghai A-shares and the STAR board.
pub struct SseSource {
    client: UpstreamClient,
    base_url: String,
}

impl SseSource {
    pub fn new(client: UpstreamClient) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn parse_page(body: &str, page_no: usize, page_size: usize) -> Result<SourcePage, MarketDataError> {
        let payload = extract_jsonp(body)
            .ok_or_else(|| MarketDataError::schema_drift(PROVIDER_ID, "malformed JSONP envelope"))?;

        let response: CommonQueryResponse = serde_json::from_str(payload).map_err(|e| {
            MarketDataError::schema_drift(PROVIDER_ID, format!("unparsable payload: {}", e))
        })?;

        let page_help = response
            .page_help
            .ok_or_else(|| MarketDataError::schema_drift(PROVIDER_ID, "missing pageHelp"))?;
        let total = parse_total(&page_help.total)
            .ok_or_else(|| MarketDataError::schema_drift(PROVIDER_ID, "unparsable pageHelp.total"))?;

        let rows = response
            .result
            .iter()
            .map(|row| RawListing::new(value_to_text(&row.code), value_to_text(&row.name)))
            .collect();

        Ok(SourcePage {
            page_no,
            page_size,
            total,
            rows,
        })
    }
}

/// Strip the JSONP callback wrapper and return the JSON inside.
///
/// A bare JSON object is accepted as is.
pub fn extract_jsonp(body: &str) -> Option<&str> {
    let body = body.trim();
    if body.starts_with('{') {
        return Some(body);
    }

    let open = body.find('(')?;
    let close = body.rfind(')')?;
    if close <= open {
        return None;
    }
    let callback = body[..open].trim();
    if callback.is_empty()
        || !callback
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.')
    {
        return None;
    }

    Some(body[open + 1..close].trim())
}

fn parse_total(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl PagedSource for SseSource {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn max_page_size(&self) -> usize {
        MAX_PAGE_SIZE
    }

    fn board_queries(&self) -> Vec<BoardQuery> {
        vec![
            BoardQuery::new(Board::AShares, "1"),
            BoardQuery::new(Board::Star, "8"),
        ]
    }

    async fn fetch_page(
        &self,
        query: &BoardQuery,
        page_no: usize,
        page_size: usize,
    ) -> Result<SourcePage, MarketDataError> {
        let url = format!("{}{}", self.base_url, QUERY_PATH);
        let page = page_no.to_string();
        let params = [
            ("jsonCallBackName", CALLBACK.to_string()),
            ("STOCK_TYPE", query.filter.clone()),
            ("REG_PROVINCE", String::new()),
            ("CSRC_CODE", String::new()),
            ("STOCK_CODE", String::new()),
            ("sqlId", SQL_ID.to_string()),
            ("COMPANY_STATUS", COMPANY_STATUS.to_string()),
            ("type", "inParams".to_string()),
            ("isPagination", "true".to_string()),
            ("pageHelp.cacheSize", "1".to_string()),
            ("pageHelp.beginPage", page.clone()),
            ("pageHelp.pageSize", page_size.to_string()),
            ("pageHelp.pageNo", page.clone()),
            ("pageHelp.endPage", page),
        ];

        let body = self.client.get_text(PROVIDER_ID, &url, &params, REFERER).await?;
        Self::parse_page(&body, page_no, page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::http::DEFAULT_REQUEST_TIMEOUT;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_extract_jsonp() {
        assert_eq!(extract_jsonp("jsonpCallback({\"a\":1})"), Some("{\"a\":1}"));
        assert_eq!(extract_jsonp("  cb_1 ( {\"a\":1} );\n"), Some("{\"a\":1}"));
        assert_eq!(extract_jsonp("{\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(extract_jsonp("<html>error</html>"), None);
        assert_eq!(extract_jsonp("cb)("), None);
        assert_eq!(extract_jsonp("({\"a\":1})"), None);
    }

    #[test]
    fn test_parse_page() {
        let body = r#"jsonpCallback({"pageHelp":{"total":"2"},"result":[
            {"A_STOCK_CODE":"600000","COMPANY_ABBR":"浦发银行"},
            {"A_STOCK_CODE":"600004","COMPANY_ABBR":"白云机场"}
        ]})"#;
        let page = SseSource::parse_page(body, 1, 60).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.rows[1].code, "600004");
        assert_eq!(page.rows[1].name, "白云机场");
    }

    #[test]
    fn test_missing_page_help_is_schema_drift() {
        let err = SseSource::parse_page(r#"jsonpCallback({"result":[]})"#, 1, 1).unwrap_err();
        assert!(matches!(err, MarketDataError::SchemaDrift { .. }));
    }

    #[test]
    fn test_missing_row_field_is_schema_drift() {
        let body = r#"jsonpCallback({"pageHelp":{"total":1},"result":[{"COMPANY_ABBR":"x"}]})"#;
        let err = SseSource::parse_page(body, 1, 1).unwrap_err();
        assert!(matches!(err, MarketDataError::SchemaDrift { .. }));
    }

    #[tokio::test]
    async fn test_fetch_star_board_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(QUERY_PATH))
            .and(query_param("STOCK_TYPE", "8"))
            .and(query_param("pageHelp.pageNo", "1"))
            .and(query_param("pageHelp.pageSize", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"jsonpCallback({"pageHelp":{"total":573},"result":[{"A_STOCK_CODE":"688001","COMPANY_ABBR":"华兴源创"}]})"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = UpstreamClient::new(DEFAULT_REQUEST_TIMEOUT).unwrap();
        let source = SseSource::new(client).with_base_url(server.uri());
        let query = BoardQuery::new(Board::Star, "8");
        let page = source.fetch_page(&query, 1, 1).await.unwrap();

        assert_eq!(page.total, 573);
        assert_eq!(page.rows[0].code, "688001");
    }
}
