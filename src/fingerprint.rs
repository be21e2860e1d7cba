//! Browser identities used for outgoing requests.
//!
//! Marketing pages often serve a stripped or blocked response to clients
//! that don't look like a desktop browser, so page fetches present a full
//! Chrome header set. File downloads only need a plausible User-Agent.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

/// Chrome 120 on Windows 10.
pub const CHROME_DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Truncated desktop UA that CDNs accept for plain file requests.
pub const GENERIC_DESKTOP_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const PAGE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const PAGE_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Header set presented by a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserProfile {
    pub user_agent: &'static str,
    pub accept: Option<&'static str>,
    pub accept_language: Option<&'static str>,
}

/// Profile for fetching HTML pages.
#[must_use]
pub fn page_profile() -> BrowserProfile {
    BrowserProfile {
        user_agent: CHROME_DESKTOP_UA,
        accept: Some(PAGE_ACCEPT),
        accept_language: Some(PAGE_ACCEPT_LANGUAGE),
    }
}

/// Profile for streaming a media file.
#[must_use]
pub fn download_profile() -> BrowserProfile {
    BrowserProfile {
        user_agent: GENERIC_DESKTOP_UA,
        accept: None,
        accept_language: None,
    }
}

impl BrowserProfile {
    /// Convert to reqwest default headers.
    #[must_use]
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(self.user_agent));
        if let Some(accept) = self.accept {
            headers.insert(ACCEPT, HeaderValue::from_static(accept));
        }
        if let Some(lang) = self.accept_language {
            headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(lang));
        }

        headers
    }
}
