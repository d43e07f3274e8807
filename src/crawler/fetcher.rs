//! HTTP fetcher for the NHC archive
//!
//! This module provides the page fetcher used by every crawl stage with:
//! - A static desktop browser User-Agent
//! - Rate limiting with governor
//! - Single-hop `meta http-equiv="refresh"` following for migrated legacy pages
//! - UTF-8 decoding with a Windows-1252 fallback for old Latin-1 pages

use crate::config::Config;
use crate::utils::error::FetchError;
use encoding_rs::{UTF_8, WINDOWS_1252};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use regex::Regex;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    Client, Response,
};
use std::num::NonZeroU32;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

/// Meta-refresh redirects followed per fetch; a refresh found on the
/// redirect target is returned as-is
pub const MAX_REDIRECT_HOPS: usize = 1;

/// Archive page fetcher
pub struct ArchiveFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Browser identity sent with every request
    user_agent: String,
}

impl ArchiveFetcher {
    /// Create a new fetcher with default timeout and user agent
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(requests_per_second: u32) -> Result<Self, FetchError> {
        Self::with_config(
            requests_per_second,
            Duration::from_secs(30),
            crate::config::DEFAULT_USER_AGENT,
        )
    }

    /// Create a new fetcher with custom configuration
    ///
    /// # Arguments
    ///
    /// * `requests_per_second` - Maximum number of requests per second
    /// * `timeout` - Request timeout duration
    /// * `user_agent` - User-Agent header value
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        requests_per_second: u32,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).gzip(true).build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            user_agent: user_agent.to_string(),
        })
    }

    /// Create a fetcher from the crawler section of the configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::with_config(
            config.crawler.rate_limit,
            config.request_timeout(),
            &config.crawler.user_agent,
        )
    }

    /// Fetch a page, following at most [`MAX_REDIRECT_HOPS`] meta refreshes
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` for unparseable URLs, otherwise the
    /// transport or status failure of the last request made
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut current = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        let mut hops = 0;

        loop {
            let body = self.fetch_once(&current).await?;

            if hops >= MAX_REDIRECT_HOPS {
                return Ok(body);
            }

            let Some(target) = meta_refresh_target(&body) else {
                return Ok(body);
            };

            let next = current
                .join(&target)
                .map_err(|_| FetchError::InvalidUrl(target.clone()))?;

            tracing::debug!(from = %current, to = %next, "Following meta refresh");
            current = next;
            hops += 1;
        }
    }

    /// Issue one GET request and decode the body
    async fn fetch_once(&self, url: &Url) -> Result<String, FetchError> {
        self.rate_limiter.until_ready().await;

        tracing::debug!(url = %url, "Fetching URL");

        let response = self
            .client
            .get(url.as_str())
            .headers(self.build_headers())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        self.decode_response(response).await
    }

    /// Decode response body honoring a declared charset
    async fn decode_response(&self, response: Response) -> Result<String, FetchError> {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await?;

        self.decode_bytes(&bytes, &content_type)
    }

    /// Decode bytes to a string
    ///
    /// A declared `iso-8859-1`/`windows-1252` charset is decoded as
    /// Windows-1252, anything else is tried as UTF-8 first. Legacy archive
    /// pages frequently carry stray Latin-1 bytes without a charset, so
    /// invalid UTF-8 falls back to Windows-1252.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` if neither encoding applies
    pub fn decode_bytes(&self, bytes: &[u8], content_type: &str) -> Result<String, FetchError> {
        let content_type = content_type.to_lowercase();
        if content_type.contains("charset=iso-8859-1") || content_type.contains("charset=windows-1252")
        {
            return Self::decode_with(bytes, WINDOWS_1252);
        }

        Self::decode_with(bytes, UTF_8).or_else(|_| Self::decode_with(bytes, WINDOWS_1252))
    }

    fn decode_with(
        bytes: &[u8],
        encoding: &'static encoding_rs::Encoding,
    ) -> Result<String, FetchError> {
        let (cow, _encoding, had_errors) = encoding.decode(bytes);

        if had_errors {
            return Err(FetchError::Decode(format!(
                "{} decoding errors",
                encoding.name()
            )));
        }

        Ok(cow.into_owned())
    }

    /// Build browser-like request headers
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(user_agent) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, user_agent);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,text/plain;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        headers
    }
}

/// Extract the target of a `<meta http-equiv="refresh" content="0;URL=...">`
/// directive, if the page carries one
pub fn meta_refresh_target(body: &str) -> Option<String> {
    static CONTENT_RE: OnceLock<Regex> = OnceLock::new();

    if !body.to_lowercase().contains(r#"meta http-equiv="refresh""#) {
        return None;
    }

    let re = CONTENT_RE.get_or_init(|| {
        Regex::new(r#"(?i)content="0;\s*URL=([^"]+)""#).expect("Invalid regex pattern")
    });

    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|target| !target.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_refresh_target() {
        let html = r#"<html><head><META HTTP-EQUIV="Refresh" CONTENT="0;URL=/archive/1999/1999ARLENE.html"></head></html>"#;
        assert_eq!(
            meta_refresh_target(html),
            Some("/archive/1999/1999ARLENE.html".to_string())
        );
    }

    #[test]
    fn test_meta_refresh_absent() {
        assert_eq!(meta_refresh_target("<html><body>plain</body></html>"), None);
        // Other meta tags with content attributes are not redirects
        let html = r#"<meta name="robots" content="0;URL=/nope">"#;
        assert_eq!(meta_refresh_target(html), None);
    }

    #[test]
    fn test_decode_utf8() {
        let fetcher = ArchiveFetcher::new(10).unwrap();
        let decoded = fetcher.decode_bytes("HURRICANE IRENE".as_bytes(), "text/html; charset=utf-8");
        assert_eq!(decoded.unwrap(), "HURRICANE IRENE");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        let fetcher = ArchiveFetcher::new(10).unwrap();
        // "15°N" with a bare Latin-1 degree sign
        let bytes: &[u8] = &[0x31, 0x35, 0xb0, 0x4e];
        let decoded = fetcher.decode_bytes(bytes, "text/plain").unwrap();
        assert_eq!(decoded, "15\u{b0}N");
    }

    #[test]
    fn test_decode_declared_latin1() {
        let fetcher = ArchiveFetcher::new(10).unwrap();
        let bytes: &[u8] = &[0x41, 0xe9];
        let decoded = fetcher
            .decode_bytes(bytes, "text/html; charset=ISO-8859-1")
            .unwrap();
        assert_eq!(decoded, "A\u{e9}");
    }

    #[test]
    fn test_headers() {
        let fetcher = ArchiveFetcher::new(10).unwrap();
        let headers = fetcher.build_headers();

        assert!(headers
            .get(USER_AGENT)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("Mozilla/5.0"));
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
    }

    #[test]
    fn test_fetcher_creation() {
        assert!(ArchiveFetcher::new(0).is_ok());
        assert!(ArchiveFetcher::from_config(&Config::default()).is_ok());
    }
}
