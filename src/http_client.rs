//! Page fetching.
//!
//! A single GET per page with a desktop Chrome identity, gzip/brotli/zstd
//! negotiation and a hard timeout. No retries happen here; the orchestrator
//! treats any failure as the end of the automated path.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::error::{Result, VidgrabError};
use crate::fingerprint::{page_profile, BrowserProfile};

/// Default page fetch timeout.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Something that can turn a page URL into its HTML text.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch `url` and return the body. Non-2xx statuses are errors.
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// reqwest-backed [`PageSource`].
pub struct PageClient {
    client: Client,
    profile: BrowserProfile,
}

impl PageClient {
    /// Create a client with the default 30 s timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(PAGE_TIMEOUT)
    }

    /// Create a client with a custom whole-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let profile = page_profile();

        let client = Client::builder()
            .default_headers(profile.to_headers())
            .brotli(true)
            .zstd(true)
            .gzip(true)
            .deflate(true)
            .use_rustls_tls()
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client, profile })
    }

    /// Identity sent with every request.
    #[must_use]
    pub fn profile(&self) -> &BrowserProfile {
        &self.profile
    }
}

#[async_trait]
impl PageSource for PageClient {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_page(&self, url: &str) -> Result<String> {
        debug!("Fetching page");
        let to_fetch_error = |source| VidgrabError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(to_fetch_error)?;

        info!(
            status = %response.status(),
            content_encoding = ?response.headers().get("content-encoding"),
            "Page received"
        );

        response.text().await.map_err(to_fetch_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/landing")
                    .header_exists("user-agent")
                    .header("accept-language", "en-US,en;q=0.5");
                then.status(200).body("<html><body>hi</body></html>");
            })
            .await;

        let client = PageClient::new().unwrap();
        let body = client.fetch_page(&server.url("/landing")).await.unwrap();

        mock.assert_async().await;
        assert!(body.contains("hi"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone");
                then.status(404);
            })
            .await;

        let client = PageClient::new().unwrap();
        let err = client.fetch_page(&server.url("/gone")).await.unwrap_err();

        match err {
            VidgrabError::Fetch { url, source } => {
                assert!(url.ends_with("/gone"));
                assert_eq!(source.status(), Some(reqwest::StatusCode::NOT_FOUND));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let client = PageClient::with_timeout(Duration::from_secs(2)).unwrap();
        let err = client.fetch_page("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, VidgrabError::Fetch { .. }));
    }
}
