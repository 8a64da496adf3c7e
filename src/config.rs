//! Configuration file parser for ~/.config/tidings/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted so older binaries keep working with newer
//! files, but each one is logged in case it is a typo.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Feed fetched when neither the command line nor the config names one.
pub const DEFAULT_FEED_URL: &str = "https://example.com/feed/";

const KNOWN_KEYS: [&str; 4] = [
    "feed_url",
    "request_timeout_secs",
    "max_feed_size_bytes",
    "user_agent",
];

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A value parsed but is out of range.
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Settings for fetching a feed.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feed to fetch when no URL is given on the command line.
    pub feed_url: String,

    /// Overall budget for one download, in seconds. Must be non-zero.
    pub request_timeout_secs: u64,

    /// Largest response body accepted, in bytes.
    pub max_feed_size_bytes: usize,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            request_timeout_secs: 30,
            max_feed_size_bytes: 10 * 1024 * 1024,
            user_agent: concat!("tidings/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing, empty or whitespace-only file → `Ok(Config::default())`
    /// - Invalid TOML or wrong value types → `Err(ConfigError::Parse)`
    /// - Zero timeout → `Err(ConfigError::Invalid)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(content) = read_config_file(path)? else {
            return Ok(Self::default());
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        if config.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        tracing::debug!(feed_url = %config.feed_url, "Loaded configuration");
        Ok(config)
    }
}

/// Reads the file, or `None` if it does not exist.
fn read_config_file(path: &Path) -> Result<Option<String>, ConfigError> {
    // SEC-014: Check size before reading so a huge file is never loaded
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > Config::MAX_FILE_SIZE => {
            return Err(ConfigError::TooLarge(format!(
                "Config file is {} bytes (max {} bytes)",
                meta.len(),
                Config::MAX_FILE_SIZE
            )));
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No config file found, using defaults");
            return Ok(None);
        }
        Err(e) => return Err(ConfigError::Io(e)),
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        // Deleted between metadata and read
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::Io(e)),
    }
}

// ============================================================================
// Tests
// ============================================================================
