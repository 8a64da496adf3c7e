//! Small helpers shared by the fetcher and the CLI.
//!
//! - **URL validation**: reject feed URLs that are not plain HTTP(S)
//! - **Text sanitizing**: strip terminal escapes from feed text before printing
//!
//! # Examples
//!
//! ```
//! use tidings::util::{strip_control_chars, validate_feed_url};
//!
//! let url = validate_feed_url("https://example.com/feed.xml").unwrap();
//! assert_eq!(url.host_str(), Some("example.com"));
//!
//! assert_eq!(strip_control_chars("\x1b[31mred\x1b[0m"), "red");
//! ```

mod text;
mod url_validator;

pub use text::strip_control_chars;
pub use url_validator::{validate_feed_url, UrlValidationError};
