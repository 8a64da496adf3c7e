//! End-to-end tests for turning RSS bytes into feed items.
//!
//! These drive the public `parse_feed` entry point with real XML documents,
//! covering document order, fragment concatenation, trimming and the
//! all-or-nothing failure contract.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tidings::feed::{parse_feed, FeedItem, ParseError};

fn item(title: &str, link: &str, date: &str) -> FeedItem {
    FeedItem {
        title: title.to_string(),
        link: link.to_string(),
        published_date: date.to_string(),
    }
}

// ============================================================================
// Concrete scenarios
// ============================================================================

#[test]
fn test_two_items_in_document_order() {
    let xml = "<rss><channel><item><title>A</title><link>http://x</link><pubDate>Mon</pubDate></item>\
<item><title>B</title><link>http://y</link><pubDate>Tue</pubDate></item></channel></rss>";

    let items = parse_feed(xml.as_bytes()).unwrap();
    assert_eq!(
        items,
        vec![item("A", "http://x", "Mon"), item("B", "http://y", "Tue")]
    );
}

#[test]
fn test_realistic_feed() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Example Blog</title>
    <link>https://example.com/</link>
    <description>Posts &amp; notes</description>
    <item>
      <title>
        Shipping 1.0
      </title>
      <link>https://example.com/posts/1</link>
      <description><![CDATA[<p>Big <b>news</b></p>]]></description>
      <pubDate>Mon, 06 Sep 2021 16:45:00 +0000</pubDate>
      <guid isPermaLink="true">https://example.com/posts/1</guid>
      <dc:creator>Someone</dc:creator>
    </item>
    <item>
      <title><![CDATA[Q&A: "streaming" parsers]]></title>
      <link>https://example.com/posts/2?a=1&amp;b=2</link>
      <pubDate>Tue, 07 Sep 2021 09:00:00 +0000</pubDate>
    </item>
  </channel>
</rss>"#;

    let items = parse_feed(xml.as_bytes()).unwrap();
    assert_eq!(
        items,
        vec![
            item(
                "Shipping 1.0",
                "https://example.com/posts/1",
                "Mon, 06 Sep 2021 16:45:00 +0000"
            ),
            item(
                "Q&A: \"streaming\" parsers",
                "https://example.com/posts/2?a=1&b=2",
                "Tue, 07 Sep 2021 09:00:00 +0000"
            ),
        ]
    );
}

#[test]
fn test_split_character_data_concatenated() {
    // Entity decoding and CDATA boundaries split one text node into fragments
    let xml = "<rss><channel><item><title>Hel<![CDATA[lo]]></title></item></channel></rss>";
    let items = parse_feed(xml.as_bytes()).unwrap();
    assert_eq!(items[0].title, "Hello");

    let xml = "<rss><item><title>Fish &amp; Chips</title></item></rss>";
    let items = parse_feed(xml.as_bytes()).unwrap();
    assert_eq!(items[0].title, "Fish & Chips");
}

#[test]
fn test_empty_channel_is_empty_success() {
    let xml = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;
    assert_eq!(parse_feed(xml.as_bytes()), Ok(Vec::new()));
}

#[test]
fn test_missing_fields_are_empty_strings() {
    let xml = "<rss><channel><item><link>http://only-link</link></item><item/></channel></rss>";
    let items = parse_feed(xml.as_bytes()).unwrap();
    assert_eq!(
        items,
        vec![item("", "http://only-link", ""), FeedItem::default()]
    );
}

#[test]
fn test_truncated_document_is_no_result() {
    let xml = "<rss><channel><item><title>A</title><link>http://x</link><pubDate>Mon</pubDate></item>\
<item><title>B</ti";
    assert!(parse_feed(xml.as_bytes()).is_err());
}

#[test]
fn test_unclosed_root_discards_completed_items() {
    let xml = "<rss><channel><item><title>A</title></item><item><title>B</title></item>";
    assert_eq!(
        parse_feed(xml.as_bytes()),
        Err(ParseError::UnexpectedEof {
            open: "channel".to_string()
        })
    );
}

#[test]
fn test_mismatched_tags_are_no_result() {
    let xml = "<rss><channel><item><title>A</link></item></channel></rss>";
    assert!(matches!(
        parse_feed(xml.as_bytes()),
        Err(ParseError::Xml { .. })
    ));
}

#[test]
fn test_non_xml_input_is_no_result() {
    assert_eq!(parse_feed(b""), Err(ParseError::EmptyDocument));
    assert!(parse_feed(b"{\"items\": []}").is_err());
    assert!(parse_feed(b"<html><body>not closed").is_err());
}

#[test]
fn test_atom_feed_yields_no_items() {
    // Atom is out of scope: well-formed, but it has no <item> elements
    let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry><title>X</title></entry></feed>"#;
    assert_eq!(parse_feed(xml.as_bytes()), Ok(Vec::new()));
}

const ONE_ITEM: &str = "<rss><channel><item><title>A</title></item></channel></rss>";

#[test]
fn test_second_root_element_is_no_result() {
    let xml = format!("{ONE_ITEM}<rss/>");
    assert_eq!(
        parse_feed(xml.as_bytes()),
        Err(ParseError::MultipleRoots {
            name: "rss".to_string()
        })
    );
}

#[test]
fn test_content_outside_root_is_no_result() {
    let trailing = format!("{ONE_ITEM}garbage");
    assert!(matches!(
        parse_feed(trailing.as_bytes()),
        Err(ParseError::ContentOutsideRoot { .. })
    ));

    let leading = format!("junk{ONE_ITEM}");
    assert!(matches!(
        parse_feed(leading.as_bytes()),
        Err(ParseError::ContentOutsideRoot { .. })
    ));

    let padded = format!("\n{ONE_ITEM}\n\n");
    assert_eq!(parse_feed(padded.as_bytes()), Ok(vec![item("A", "", "")]));
}

#[test]
fn test_bad_attributes_are_no_result() {
    let duplicate = r#"<rss><item a="1" a="2"><title>A</title></item></rss>"#;
    assert!(matches!(
        parse_feed(duplicate.as_bytes()),
        Err(ParseError::Xml { .. })
    ));

    let missing_value = "<rss><item a=><title>A</title></item></rss>";
    assert!(matches!(
        parse_feed(missing_value.as_bytes()),
        Err(ParseError::Xml { .. })
    ));
}

#[test]
fn test_latin1_feed_is_decoded() {
    let xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\
<rss><item><title>caf\xe9</title></item></rss>";
    assert_eq!(parse_feed(xml), Ok(vec![item("caf\u{e9}", "", "")]));
}

// ============================================================================
// Properties
// ============================================================================

fn field_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 .:/-]{0,24}"
}

fn padding() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["", " ", "\n", "\n    ", "\t \n"]).prop_map(str::to_string)
}

fn render(items: &[(String, String, String)], pad: &str) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<rss version=\"2.0\"><channel>");
    xml.push_str("<title>Channel</title>");
    for (title, link, date) in items {
        xml.push_str(&format!(
            "{pad}<item>{pad}<title>{pad}{title}{pad}</title>{pad}<link>{link}</link>\
{pad}<pubDate>{pad}{date}</pubDate>{pad}</item>"
        ));
    }
    xml.push_str("</channel></rss>");
    xml
}

proptest! {
    #[test]
    fn prop_n_items_in_order(
        fields in prop::collection::vec((field_text(), field_text(), field_text()), 0..12),
        pad in padding(),
    ) {
        let xml = render(&fields, &pad);
        let items = parse_feed(xml.as_bytes()).unwrap();

        prop_assert_eq!(items.len(), fields.len());
        for (parsed, (title, link, date)) in items.iter().zip(&fields) {
            prop_assert_eq!(&parsed.title, title.trim());
            prop_assert_eq!(&parsed.link, link.trim());
            prop_assert_eq!(&parsed.published_date, date.trim());
        }
    }

    #[test]
    fn prop_parse_is_idempotent(
        fields in prop::collection::vec((field_text(), field_text(), field_text()), 0..8),
        pad in padding(),
    ) {
        let xml = render(&fields, &pad);
        let first = parse_feed(xml.as_bytes());
        let second = parse_feed(xml.as_bytes());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_truncation_never_returns_partial_items(
        fields in prop::collection::vec((field_text(), field_text(), field_text()), 1..6),
        cut in 0.0f64..1.0,
    ) {
        let xml = render(&fields, "");
        // Cut strictly before the final '>' so the root is never closed
        let end = ((xml.len() - 1) as f64 * cut) as usize;
        let truncated = &xml.as_bytes()[..end];
        prop_assert!(parse_feed(truncated).is_err());
    }
}
