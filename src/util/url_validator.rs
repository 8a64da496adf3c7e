use thiserror::Error;
use url::Url;

/// Errors that can occur during feed URL validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host to connect to.
    #[error("URL has no host")]
    MissingHost,
}

/// Validates a URL string for use as a feed source.
///
/// Only `http` and `https` URLs with a host are accepted. Surrounding
/// whitespace (common when a URL is pasted into a config file) is ignored.
///
/// # Errors
///
/// - [`UrlValidationError::InvalidUrl`] if the string does not parse
/// - [`UrlValidationError::UnsupportedScheme`] for `file://`, `ftp://`, etc.
/// - [`UrlValidationError::MissingHost`] if the URL names no host
///
/// # Examples
///
/// ```
/// use tidings::util::validate_feed_url;
///
/// assert!(validate_feed_url("https://example.com/feed/").is_ok());
/// assert!(validate_feed_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_feed_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlValidationError::UnsupportedScheme(url.scheme().to_owned()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlValidationError::MissingHost),
    }
}
