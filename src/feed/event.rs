//! Flat XML event stream over raw feed bytes.
//!
//! [`EventSource`] drives a `quick-xml` reader and reduces its token types to
//! the five notifications the item state machine understands. It also fills
//! in the well-formedness checks `quick-xml` leaves to the caller: unclosed
//! elements at end of input, a missing or repeated root element, content
//! outside the root, malformed attributes, and runaway nesting.
//!
//! Names and text are decoded with the encoding named in the XML
//! declaration (UTF-8 when there is none).
use std::fmt::Display;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::parser::ParseError;

/// SEC-003: Maximum element nesting accepted from a feed document.
pub const MAX_XML_DEPTH: usize = 256;

/// One notification from the XML tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// An element was opened. `<x/>` produces a start and an end.
    StartElement { name: String },
    /// A run of character data. One text node may arrive as several of these.
    Characters(String),
    /// An element was closed.
    EndElement { name: String },
    /// The whole document was consumed without error.
    EndDocument,
    /// The input is not well-formed; no further events follow.
    Error(ParseError),
}

/// Iterator of [`XmlEvent`]s over an in-memory document.
///
/// Yields exactly one terminal event ([`XmlEvent::EndDocument`] or
/// [`XmlEvent::Error`]) and then `None`.
///
/// SEC-002: Only the five predefined XML entities are resolved. `quick-xml`
/// (0.37) never reads `<!ENTITY>` declarations, so any other entity
/// reference, DTD-declared or not, becomes an [`XmlEvent::Error`].
pub struct EventSource<'a> {
    reader: Reader<&'a [u8]>,
    buf: Vec<u8>,
    open: Vec<String>,
    seen_root: bool,
    done: bool,
}

impl<'a> EventSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        let mut reader = Reader::from_reader(bytes);
        let config = reader.config_mut();
        config.check_end_names = true;
        config.expand_empty_elements = true;
        config.trim_text(false);

        Self {
            reader,
            buf: Vec::new(),
            open: Vec::new(),
            seen_root: false,
            done: false,
        }
    }

    /// Reads tokens until one maps to an event. Ignorable tokens (declaration,
    /// comments, DOCTYPE, whitespace around the root) loop instead.
    fn read_next(&mut self) -> Result<XmlEvent, ParseError> {
        loop {
            self.buf.clear();
            let position = self.reader.buffer_position();

            match self.reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(e)) => {
                    let decoder = self.reader.decoder();
                    let name = decoder
                        .decode(e.name().as_ref())
                        .map_err(|err| xml_error(position, err))?
                        .into_owned();
                    if self.open.is_empty() && self.seen_root {
                        return Err(ParseError::MultipleRoots { name });
                    }
                    if self.open.len() >= MAX_XML_DEPTH {
                        return Err(ParseError::MaxDepthExceeded(MAX_XML_DEPTH));
                    }
                    // Attribute values are never used, but malformed or
                    // duplicated attributes make the document ill-formed
                    for attr in e.attributes().with_checks(true) {
                        attr.map_err(|err| xml_error(position, err))?;
                    }
                    self.open.push(name.clone());
                    self.seen_root = true;
                    return Ok(XmlEvent::StartElement { name });
                }
                Ok(Event::End(e)) => {
                    // check_end_names already rejected mismatched closing tags
                    let name = self
                        .reader
                        .decoder()
                        .decode(e.name().as_ref())
                        .map_err(|err| xml_error(position, err))?
                        .into_owned();
                    self.open.pop();
                    return Ok(XmlEvent::EndElement { name });
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| xml_error(position, err))?
                        .into_owned();
                    if let Some(event) = self.characters(text, position)? {
                        return Ok(event);
                    }
                }
                Ok(Event::CData(e)) => {
                    let text = self
                        .reader
                        .decoder()
                        .decode(&e)
                        .map_err(|err| xml_error(position, err))?
                        .into_owned();
                    if let Some(event) = self.characters(text, position)? {
                        return Ok(event);
                    }
                }
                Ok(Event::Eof) => {
                    if let Some(open) = self.open.last() {
                        return Err(ParseError::UnexpectedEof { open: open.clone() });
                    }
                    if !self.seen_root {
                        return Err(ParseError::EmptyDocument);
                    }
                    return Ok(XmlEvent::EndDocument);
                }
                // Declarations, comments, processing instructions, DOCTYPE
                Ok(_) => continue,
                Err(e) => {
                    return Err(xml_error(self.reader.buffer_position(), e));
                }
            }
        }
    }

    /// Wraps decoded character data, enforcing that only whitespace appears
    /// outside the root element. `Ok(None)` means the text is skipped.
    fn characters(&self, text: String, position: u64) -> Result<Option<XmlEvent>, ParseError> {
        if text.is_empty() {
            return Ok(None);
        }
        if self.open.is_empty() {
            if text.chars().all(is_ignorable_outside_root) {
                return Ok(None);
            }
            return Err(ParseError::ContentOutsideRoot { position });
        }
        Ok(Some(XmlEvent::Characters(text)))
    }
}

impl Iterator for EventSource<'_> {
    type Item = XmlEvent;

    fn next(&mut self) -> Option<XmlEvent> {
        if self.done {
            return None;
        }

        let event = self.read_next().unwrap_or_else(XmlEvent::Error);
        if matches!(event, XmlEvent::EndDocument | XmlEvent::Error(_)) {
            self.done = true;
        }
        Some(event)
    }
}

/// XML whitespace, plus a byte order mark left ahead of the prolog.
fn is_ignorable_outside_root(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{feff}')
}

fn xml_error(position: u64, err: impl Display) -> ParseError {
    ParseError::Xml {
        position,
        message: err.to_string(),
    }
}
