//! Fetch an RSS feed and turn its XML into an ordered list of items.
//!
//! The interesting part lives in [`feed`]: a streaming state machine that
//! consumes XML events one at a time and emits [`feed::FeedItem`] records
//! without ever building a document tree.

pub mod config;
pub mod feed;
pub mod util;
