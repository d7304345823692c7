//! Shared HTTP client for the listing sources.
//!
//! Every upstream expects browser-like requests: an explicit `Host`, a
//! source-specific `Referer` and a desktop `User-Agent`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, HOST, REFERER, USER_AGENT};
use reqwest::{Client, Response, Url};

use crate::errors::MarketDataError;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Thin wrapper over `reqwest::Client` that applies the shared headers and
/// maps transport failures into [`MarketDataError`].
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    pub fn new(timeout: Duration) -> Result<Self, MarketDataError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            MarketDataError::InvalidConfig(format!("failed to build HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }

    /// GET `url` with `query` parameters and return the body as text.
    pub async fn get_text(
        &self,
        provider: &str,
        url: &str,
        query: &[(&str, String)],
        referer: &str,
    ) -> Result<String, MarketDataError> {
        let response = self.send(provider, url, query, referer).await?;
        response
            .text()
            .await
            .map_err(|e| MarketDataError::from_request(provider, e))
    }

    /// GET `url` and return the raw body.
    pub async fn get_bytes(
        &self,
        provider: &str,
        url: &str,
        referer: &str,
    ) -> Result<Vec<u8>, MarketDataError> {
        let response = self.send(provider, url, &[], referer).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| MarketDataError::from_request(provider, e))?;
        Ok(body.to_vec())
    }

    async fn send(
        &self,
        provider: &str,
        url: &str,
        query: &[(&str, String)],
        referer: &str,
    ) -> Result<Response, MarketDataError> {
        let headers = browser_headers(provider, url, referer)?;

        let response = self
            .client
            .get(url)
            .headers(headers)
            .query(query)
            .send()
            .await
            .map_err(|e| MarketDataError::from_request(provider, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::UpstreamStatus {
                provider: provider.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

/// Build the header set for `url`, deriving `Host` from the URL itself.
fn browser_headers(provider: &str, url: &str, referer: &str) -> Result<HeaderMap, MarketDataError> {
    let parsed = Url::parse(url).map_err(|e| {
        MarketDataError::InvalidConfig(format!("{}: invalid URL '{}': {}", provider, url, e))
    })?;
    let host = match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => {
            return Err(MarketDataError::InvalidConfig(format!(
                "{}: URL '{}' has no host",
                provider, url
            )))
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        HOST,
        HeaderValue::from_str(&host)
            .map_err(|e| MarketDataError::InvalidConfig(format!("{}: bad host: {}", provider, e)))?,
    );
    headers.insert(
        REFERER,
        HeaderValue::from_str(referer).map_err(|e| {
            MarketDataError::InvalidConfig(format!("{}: bad referer: {}", provider, e))
        })?,
    );
    Ok(headers)
}
