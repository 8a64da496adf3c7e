//! Feed retrieval and streaming RSS item extraction.
//!
//! - **Events**: turn raw XML bytes into a flat stream of start/text/end events
//! - **Parsing**: fold those events into [`FeedItem`] records, one per `<item>`
//! - **Fetching**: HTTP retrieval with a timeout and a response size limit
//!
//! # Architecture
//!
//! - [`event`] - `quick-xml` adapter producing [`XmlEvent`]s
//! - [`parser`] - the per-invocation item state machine ([`ItemParser`])
//! - [`fetcher`] - `reqwest` download plus the fetch-then-parse pipeline
//!
//! Parsing is all-or-nothing: a parse error anywhere in the document yields
//! `Err` and discards whatever items were already assembled.
//!
//! # Example
//!
//! ```ignore
//! use tidings::feed::{fetch_and_parse, FetchOptions};
//!
//! let client = reqwest::Client::new();
//! let items = fetch_and_parse(&client, "https://example.com/feed/", &FetchOptions::default()).await?;
//! ```

pub mod event;
mod fetcher;
pub mod parser;

pub use event::{EventSource, XmlEvent, MAX_XML_DEPTH};
pub use fetcher::{fetch_and_parse, fetch_feed, FeedError, FetchError, FetchOptions};
pub use parser::{parse_events, parse_feed, FeedItem, ItemParser, ParseError, SessionState, Step};
