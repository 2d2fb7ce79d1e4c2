//! HTTP page fetcher for the catalog REST API.
//!
//! Builds the listing URLs, performs the request with [`reqwest`] and decodes
//! the `{ "products": [...] }` envelope.  Every failure on the way is folded
//! into a [`FetchError`].

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{Client, Url};
use tracing::debug;

use super::product::PageBody;
use super::{FetchError, ListingMode, PageFetcher, ProductPage};

/// Fetches pages from `{base}/products/...`.
pub struct HttpFetcher {
    client: Client,
    base: String,
}

impl HttpFetcher {
    /// Create a fetcher for the API at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` — API origin (e.g. `https://api.example.com`); a trailing
    ///   slash is ignored.
    /// * `timeout` — per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = base_url.trim_end_matches('/').to_string();
        Url::parse(&base).map_err(|e| anyhow::anyhow!("invalid API URL '{base_url}': {e}"))?;

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("livescroll-catalog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base })
    }

    /// Listing URL for `page` under `mode`.  Keywords are always
    /// percent-encoded.
    pub fn page_url(&self, mode: &ListingMode, page: u32) -> String {
        match mode {
            ListingMode::All => format!("{}/products/{page}", self.base),
            ListingMode::Search(keyword) => {
                let encoded = utf8_percent_encode(keyword, NON_ALPHANUMERIC);
                format!("{}/products/search/{encoded}/{page}", self.base)
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_page(&self, mode: &ListingMode, page: u32) -> Result<ProductPage, FetchError> {
        let url = self.page_url(mode, page);
        debug!(%url, "requesting page");

        let body = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| FetchError::new(mode, page, e))?
            .bytes()
            .await
            .map_err(|e| FetchError::new(mode, page, e))?;

        let envelope: PageBody =
            serde_json::from_slice(&body).map_err(|e| FetchError::new(mode, page, e))?;

        Ok(envelope.into_page(page))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
