use crate::config::Config;
use crate::feed::parser::{parse_feed, FeedItem, ParseError};
use crate::util::validate_feed_url;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while downloading a feed.
///
/// A fetch is attempted once; none of these are retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL failed validation (unparseable, non-HTTP scheme, no host)
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request plus body download exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Why [`fetch_and_parse`] produced no items.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Failed to fetch feed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Failed to parse feed: {0}")]
    Parse(#[from] ParseError),
}

/// Limits applied to a single feed download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Budget for connecting, receiving headers and reading the whole body.
    pub timeout: Duration,
    /// Largest accepted response body in bytes.
    pub max_size: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_size: MAX_FEED_SIZE,
        }
    }
}

impl From<&Config> for FetchOptions {
    fn from(config: &Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.request_timeout_secs),
            max_size: config.max_feed_size_bytes,
        }
    }
}

/// Downloads the raw bytes of a feed.
///
/// # Arguments
///
/// * `client` - HTTP client (caller controls user agent and pooling)
/// * `url` - Feed URL; must be `http` or `https`
/// * `options` - Timeout and body size limit
///
/// # Errors
///
/// - [`FetchError::InvalidUrl`] - URL rejected before any request is made
/// - [`FetchError::Network`] - Connection or TLS errors
/// - [`FetchError::Timeout`] - Download exceeded `options.timeout`
/// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
/// - [`FetchError::ResponseTooLarge`] - Body exceeded `options.max_size`
/// - [`FetchError::IncompleteResponse`] - Body shorter than Content-Length
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    options: &FetchOptions,
) -> Result<Vec<u8>, FetchError> {
    let validated = validate_feed_url(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

    let download = async {
        let response = client
            .get(validated)
            .send()
            .await
            .map_err(FetchError::Network)?;

        // 4xx and 5xx fail immediately, there is no retry policy
        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        read_limited_bytes(response, options.max_size).await
    };

    tokio::time::timeout(options.timeout, download)
        .await
        .map_err(|_| FetchError::Timeout)?
}

/// Fetches a feed and parses its items.
///
/// Any failure means "no items": the error is logged and returned, and no
/// partially parsed items escape. A feed with zero items is `Ok(vec![])`.
pub async fn fetch_and_parse(
    client: &reqwest::Client,
    url: &str,
    options: &FetchOptions,
) -> Result<Vec<FeedItem>, FeedError> {
    let bytes = match fetch_feed(client, url, options).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Failed to fetch feed");
            return Err(e.into());
        }
    };
    tracing::debug!(url = %url, bytes = bytes.len(), "Fetched feed");

    parse_feed(&bytes).map_err(FeedError::Parse)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    // EDGE-005: A connection cut mid-body can end the stream early
    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
