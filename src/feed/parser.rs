use serde::Serialize;
use thiserror::Error;

use super::event::{EventSource, XmlEvent};

/// Element whose start/end delimits one feed record.
const ITEM_ELEMENT: &str = "item";

/// Errors that end a parse session without a result.
///
/// Any of these means "no items": the session never hands out the records
/// it assembled before the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The tokenizer rejected the input (bad syntax, mismatched tags, unknown entity).
    #[error("XML parse error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// Input ended while an element was still open.
    #[error("Unexpected end of document: <{open}> was never closed")]
    UnexpectedEof { open: String },

    /// Input contained no root element at all.
    #[error("Document contains no root element")]
    EmptyDocument,

    /// A second top-level element followed the root.
    #[error("Document has more than one root element: <{name}>")]
    MultipleRoots { name: String },

    /// Non-whitespace text or CDATA appeared before or after the root element.
    #[error("Content outside the root element at byte {position}")]
    ContentOutsideRoot { position: u64 },

    /// SEC-003: Element nesting exceeds the safety limit.
    #[error("XML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// The event stream stopped without an end-of-document event.
    #[error("Event stream ended before end of document")]
    MissingEndDocument,

    /// An event arrived after the session already succeeded or failed.
    #[error("Parser session is already closed")]
    SessionClosed,
}

/// One `<item>` record extracted from an RSS document.
///
/// Every field is trimmed of surrounding whitespace. A child element that
/// never appeared leaves its field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    /// Text of the `<title>` child.
    pub title: String,
    /// Text of the `<link>` child.
    pub link: String,
    /// Raw text of the `<pubDate>` child; never parsed as a date.
    pub published_date: String,
}

/// Coarse position of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Outside any `<item>`.
    #[default]
    Idle,
    /// Between `<item>` and `</item>`, accumulating field text.
    InItem,
    /// End of document reached; the completed items are final.
    Finished,
    /// A parse error was delivered; nothing is returned.
    Failed,
}

/// What the caller should do after feeding one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep feeding events.
    Continue,
    /// End of document reached; collect with [`ItemParser::into_items`].
    Finished,
}

/// Text buffers for the item currently being assembled.
#[derive(Debug, Default)]
struct PendingItem {
    title: String,
    link: String,
    pub_date: String,
}

impl PendingItem {
    fn reset(&mut self) {
        self.title.clear();
        self.link.clear();
        self.pub_date.clear();
    }

    /// Buffer that character data should go to while `element` is the last opened element.
    fn field_mut(&mut self, element: &str) -> Option<&mut String> {
        match element {
            "title" => Some(&mut self.title),
            "link" => Some(&mut self.link),
            "pubDate" => Some(&mut self.pub_date),
            _ => None,
        }
    }

    fn finalize(&self) -> FeedItem {
        FeedItem {
            title: self.title.trim().to_owned(),
            link: self.link.trim().to_owned(),
            published_date: self.pub_date.trim().to_owned(),
        }
    }
}

/// Streaming state machine that folds XML events into [`FeedItem`]s.
///
/// Character data is routed by `current_element`, the name of the most
/// recently *opened* element. There is no element stack: closing a field
/// leaves the name in place until the next start tag replaces it, so text
/// that appears between `</title>` and the next start tag still lands in the
/// title buffer. Well-formed feeds only put whitespace there, which the
/// final trim removes.
///
/// One parser belongs to exactly one parse invocation. Create a fresh one
/// per document.
#[derive(Debug, Default)]
pub struct ItemParser {
    state: SessionState,
    current_element: String,
    pending: PendingItem,
    completed: Vec<FeedItem>,
}

impl ItemParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Name of the last opened element (stale after its end tag).
    pub fn current_element(&self) -> &str {
        &self.current_element
    }

    /// Items finalized so far, in document order.
    pub fn completed(&self) -> &[FeedItem] {
        &self.completed
    }

    /// Applies one event to the session.
    ///
    /// # Errors
    ///
    /// Returns the carried error for [`XmlEvent::Error`], after which the
    /// session is `Failed` and its items are dropped. Any event delivered to a
    /// finished or failed session yields [`ParseError::SessionClosed`].
    pub fn handle(&mut self, event: XmlEvent) -> Result<Step, ParseError> {
        if matches!(self.state, SessionState::Finished | SessionState::Failed) {
            return Err(ParseError::SessionClosed);
        }

        match event {
            XmlEvent::StartElement { name } => {
                if name == ITEM_ELEMENT {
                    self.pending.reset();
                    self.state = SessionState::InItem;
                }
                self.current_element = name;
            }
            XmlEvent::Characters(text) => {
                if let Some(buffer) = self.pending.field_mut(&self.current_element) {
                    buffer.push_str(&text);
                }
            }
            XmlEvent::EndElement { name } => {
                // Buffers are left as-is; the next <item> start clears them.
                if name == ITEM_ELEMENT {
                    let item = self.pending.finalize();
                    self.completed.push(item);
                    self.state = SessionState::Idle;
                }
            }
            XmlEvent::EndDocument => {
                self.state = SessionState::Finished;
                return Ok(Step::Finished);
            }
            XmlEvent::Error(e) => {
                self.state = SessionState::Failed;
                self.completed.clear();
                return Err(e);
            }
        }

        Ok(Step::Continue)
    }

    /// Consumes the session and returns its items.
    ///
    /// Only meaningful once [`Step::Finished`] was returned; a failed session
    /// has no items.
    pub fn into_items(self) -> Vec<FeedItem> {
        self.completed
    }
}

/// Runs a fresh [`ItemParser`] over an arbitrary event sequence.
///
/// Stops at the first terminal event. A sequence that runs out before
/// [`XmlEvent::EndDocument`] is an error, not a partial success.
pub fn parse_events<I>(events: I) -> Result<Vec<FeedItem>, ParseError>
where
    I: IntoIterator<Item = XmlEvent>,
{
    let mut session = ItemParser::new();
    for event in events {
        if session.handle(event)? == Step::Finished {
            return Ok(session.into_items());
        }
    }
    Err(ParseError::MissingEndDocument)
}

/// Parses raw RSS bytes into items in document order.
///
/// # Errors
///
/// Returns [`ParseError`] when the bytes are not well-formed XML. Items that
/// were complete before the error are discarded. The failure is logged before
/// it is returned.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>, ParseError> {
    match parse_events(EventSource::new(bytes)) {
        Ok(items) => {
            tracing::debug!(items = items.len(), "Parsed feed");
            Ok(items)
        }
        Err(e) => {
            tracing::warn!(error = %e, "XML parsing error");
            Err(e)
        }
    }
}
