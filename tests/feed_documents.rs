//! Integration tests for complete documents: build a feed, serialize it,
//! check it against the Atom schema and read it back with a feed parser.
//!
//! The four `test_document_*` scenarios cover the full metadata set, a
//! compact document with remote content, an entry carried by its alternate
//! link, and an entry with a source feed.

use atomgen::atom::{Entry, Feed, Link, TextType};
use atomgen::{BuilderConfig, FeedError, LinkRelPolicy, ValidationError};
use chrono::{DateTime, FixedOffset};
use pretty_assertions::assert_eq;

const SY: &str = "http://purl.org/rss/1.0/modules/syndication";

fn at(timestamp: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(timestamp).unwrap()
}

fn assert_schema_valid(xml: &str) {
    let report = Feed::validate(xml);
    assert!(report.is_valid(), "{report}\n{xml}");
}

fn minimal_feed() -> Feed {
    let mut feed = Feed::new();
    feed.set_title("title", None);
    feed.set_id("tag:test").unwrap();
    feed.set_updated(at("2019-05-04T20:00:40Z"));
    feed
}

fn full_feed() -> Feed {
    let mut feed = Feed::new();
    feed.set_title("title", None);
    feed.add_author("author", Some("author@test.com"), Some("http://test.com/author?a=b&c=d"))
        .unwrap();
    feed.add_author("author", Some("author@test.com"), Some("http://test.com/author?a=b&c=d"))
        .unwrap();
    feed.set_rights(Some("©2019"), None).unwrap();
    feed.add_link(
        Link::new("http://test.com/link?a=b&c=d")
            .with_rel("via")
            .with_type("text/html"),
    )
    .unwrap();
    feed.add_category("term", Some("http://scheme.com"), Some("label"))
        .unwrap();
    feed.set_id("tag:test").unwrap();
    feed.set_language(Some("en")).unwrap();
    feed.set_icon_uri(Some("http://test.com/icon?a=b&c=d")).unwrap();
    feed.set_logo_uri(Some("http://test.com/logo?a=b&c=d")).unwrap();
    feed.set_subtitle(Some("subtitle & co"));
    feed.set_generator(
        Some("generator"),
        Some("http://test.com/generator?a=b&c=d"),
        Some("version"),
    )
    .unwrap();
    feed.add_contributor(
        "contributor",
        Some("contributor@test.com"),
        Some("http://test.com/contributor?a=b&c=d"),
    )
    .unwrap();
    feed.set_updated(at("2019-05-04T20:00:40Z"));
    feed.add_custom_element("sy", SY, "updatePeriod", "hourly", &[])
        .unwrap();
    feed.add_custom_element("sy", SY, "updateFrequency", "10", &[])
        .unwrap();

    let mut entry = Entry::new();
    entry.set_title("entry title", Some(TextType::Text));
    entry.set_summary(Some("entry summary"), Some(TextType::Text)).unwrap();
    entry.set_summary(Some("entry summary"), Some(TextType::Text)).unwrap();
    entry.set_id("tag:entry-test").unwrap();
    entry.set_rights(Some("©2019"), None).unwrap();
    entry
        .add_author("author", Some("test@test.com"), Some("http://test.com/author"))
        .unwrap();
    entry
        .add_category("term", Some("ftp://scheme.org"), Some("label"))
        .unwrap();
    entry
        .add_contributor(
            "contributor",
            Some("contributor@test.com"),
            Some("http://test.com/contributor"),
        )
        .unwrap();
    entry
        .add_link(
            Link::new("http://test.com/alternate_entry")
                .with_rel("alternate")
                .with_type("text/html")
                .with_hreflang("en")
                .with_title("alternate_entry")
                .with_length(300),
        )
        .unwrap();
    entry
        .set_content(Some("<em>Entry content</em> &amp; ..."), Some(TextType::Html), None)
        .unwrap();
    entry.set_updated(at("2019-05-04T21:00:40Z"));
    entry.set_published(Some(at("2019-04-04T21:00:40Z")));

    feed.add_entry(entry);
    feed
}

// ============================================================================
// Document scenarios
// ============================================================================

#[test]
fn test_document_with_every_field() {
    let feed = full_feed();
    assert_eq!(feed.entries().len(), 1);

    let xml = feed.serialize().unwrap();
    assert_schema_valid(&xml);

    assert!(xml.contains(r#"<feed xmlns="http://www.w3.org/2005/Atom" xml:lang="en" xmlns:sy="http://purl.org/rss/1.0/modules/syndication">"#));
    assert!(xml.contains("<subtitle>subtitle &amp; co</subtitle>"));
    assert!(xml.contains(r#"<link href="http://test.com/link?a=b&amp;c=d" rel="via" type="text/html"/>"#));
    assert!(xml.contains(
        r#"<link href="http://test.com/alternate_entry" rel="alternate" type="text/html" hreflang="en" title="alternate_entry" length="300"/>"#
    ));
    assert!(xml.contains(r#"<generator uri="http://test.com/generator?a=b&amp;c=d" version="version">generator</generator>"#));
    assert!(xml.contains(r#"<content type="html"><![CDATA[<em>Entry content</em> &amp; ...]]></content>"#));
    assert!(xml.contains("<published>2019-04-04T21:00:40+00:00</published>"));
    assert!(xml.contains("<sy:updatePeriod>hourly</sy:updatePeriod>"));
    assert!(xml.contains("<sy:updateFrequency>10</sy:updateFrequency>"));
    let feed_level = &xml[..xml.find("<entry>").unwrap()];
    assert_eq!(feed_level.matches("<author>").count(), 2);
    assert_eq!(xml.matches("<author>").count(), 3);
}

#[test]
fn test_document_compact_with_remote_content() {
    let mut feed = minimal_feed();
    feed.set_prettify(false);
    feed.set_generator(None, None, None).unwrap();

    let mut entry = Entry::new();
    entry.set_title("entry title", Some(TextType::Html));
    entry.set_summary(Some("entry summary"), Some(TextType::Text)).unwrap();
    entry.set_summary(None, None).unwrap();
    entry.set_id("tag:entry-test").unwrap();
    entry.set_rights(None, None).unwrap();
    entry
        .set_content(None, None, Some("http://test.com/content"))
        .unwrap();
    entry.set_updated(at("2019-05-04T21:00:40Z"));
    feed.add_entry(entry);

    let xml = feed.serialize().unwrap();
    assert_schema_valid(&xml);
    assert_eq!(
        xml,
        concat!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
            "<feed xmlns=\"http://www.w3.org/2005/Atom\">",
            "<id>tag:test</id>",
            "<title>title</title>",
            "<updated>2019-05-04T20:00:40+00:00</updated>",
            "<entry>",
            "<id>tag:entry-test</id>",
            "<title type=\"html\"><![CDATA[entry title]]></title>",
            "<updated>2019-05-04T21:00:40+00:00</updated>",
            "<content src=\"http://test.com/content\"/>",
            "</entry>",
            "</feed>\n",
        )
    );
}

#[test]
fn test_document_entry_with_alternate_link_only() {
    let mut feed = minimal_feed();

    let mut entry = Entry::new();
    entry.set_title("entry title", Some(TextType::Html));
    entry.set_id("tag:entry-test").unwrap();
    entry.set_content(None, None, None).unwrap();
    entry
        .add_link(Link::new("http://alternate.com").with_rel("alternate"))
        .unwrap();
    entry.set_updated(at("2019-05-04T21:00:40Z"));
    feed.add_entry(entry);

    let xml = feed.serialize().unwrap();
    assert_schema_valid(&xml);
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<feed"));
    assert!(xml.contains("<updated>2019-05-04T20:00:40+00:00</updated>"));
    assert!(xml.contains("<id>tag:entry-test</id>"));
    assert!(xml.contains("<title type=\"html\"><![CDATA[entry title]]></title>"));
    assert!(xml.contains("\n  <id>tag:test</id>\n"));
    assert!(xml.contains("\n    <link href=\"http://alternate.com\" rel=\"alternate\"/>\n"));
    assert!(!xml.contains("<content"));
    assert!(xml.ends_with("</feed>\n"));
}

#[test]
fn test_document_entry_with_source() {
    let mut source = Feed::new();
    source.set_title("source title", None);
    source.set_id("https://test.com/source?a=b&c=d").unwrap();
    source.set_updated(at("2019-03-04T20:00:40Z"));

    let mut feed = Feed::new();
    feed.set_title("title", None);
    feed.set_id("https://test.com/feed?a=b&c=d").unwrap();
    feed.set_updated(at("2019-05-04T20:00:40Z"));

    let mut entry = Entry::new();
    entry.set_title("entry title", Some(TextType::Html));
    entry.set_id("https://test.com/entry?a=b&c=d").unwrap();
    entry.set_content(None, None, None).unwrap();
    entry
        .add_link(Link::new("http://alternate.com?a=b&c=d").with_rel("alternate"))
        .unwrap();
    entry.set_updated(at("2019-05-04T21:00:40Z"));
    entry.set_source(Some(source)).unwrap();
    feed.add_entry(entry);

    let xml = feed.serialize().unwrap();
    assert_schema_valid(&xml);
    assert!(xml.contains("<source>"));
    assert!(xml.contains("<id>https://test.com/source?a=b&amp;c=d</id>"));
    assert!(xml.contains("<updated>2019-03-04T20:00:40+00:00</updated>"));
    assert_eq!(xml.matches("<entry>").count(), 1);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_entry_without_content_or_alternate_fails_at_serialize() {
    let mut feed = minimal_feed();

    let mut entry = Entry::new();
    entry.set_title("entry title", Some(TextType::Html));
    entry.set_id("tag:entry-test").unwrap();
    entry.set_updated(at("2019-05-04T21:00:40Z"));
    feed.set_entries(vec![entry]);

    let err = feed.serialize().unwrap_err();
    assert!(matches!(
        err,
        FeedError::Validation(ValidationError::MissingContent)
    ));
    assert_eq!(
        err.to_string(),
        "content must be provided if there is no alternate link."
    );
}

#[test]
fn test_related_link_does_not_count_as_alternate() {
    let mut feed = minimal_feed();
    let mut entry = Entry::new();
    entry
        .add_link(Link::new("http://test.com/related").with_rel("related"))
        .unwrap();
    entry.add_link(Link::new("http://test.com/plain")).unwrap();
    feed.add_entry(entry);

    assert_eq!(feed.materialize(), Err(ValidationError::MissingContent));
}

#[test]
fn test_setter_rejections() {
    let mut entry = Entry::new();
    assert!(entry.set_content(None, Some(TextType::Text), None).is_err());
    assert!(entry
        .set_content(None, Some(TextType::Xhtml), Some("xxx"))
        .is_err());
    assert_eq!(
        entry.set_id("xxx"),
        Err(ValidationError::InvalidId("xxx".to_string()))
    );
    assert_eq!(
        entry.set_id("xxx").unwrap_err().to_string(),
        "Expected a value to be a valid URI/tag. Got xxx"
    );
    assert!(entry.content().is_none());
    assert_eq!(entry.id(), "http://example.com/");
}

#[test]
fn test_source_with_entries_rejected() {
    let mut source = minimal_feed();
    let mut inner = Entry::new();
    inner
        .add_link(Link::new("http://alternate.com").with_rel("alternate"))
        .unwrap();
    source.add_entry(inner);

    let mut entry = Entry::new();
    assert_eq!(
        entry.set_source(Some(source)),
        Err(ValidationError::SourceHasEntries(1))
    );
    assert!(entry.source().is_none());
}

#[test]
fn test_xhtml_title_as_cdata_is_reported_by_schema() {
    let mut feed = minimal_feed();
    feed.set_title("<div>title</div>", Some(TextType::Xhtml));

    let xml = feed.serialize().unwrap();
    let report = Feed::validate(&xml);
    assert!(!report.is_valid());
    assert_eq!(report.diagnostics().len(), 1);
    assert!(report.diagnostics()[0].message.contains("xhtml:div"));
}

#[test]
fn test_control_character_fails_serialize() {
    let mut feed = minimal_feed();
    feed.set_title("bad\u{1}title", Some(TextType::Text));

    let err = feed.serialize().unwrap_err();
    assert!(matches!(err, FeedError::InvalidCharacter { code: 0x1, .. }));
    assert_eq!(err.to_string(), "Cannot serialize character U+0001 in element title");
}

#[test]
fn test_control_character_reported_by_schema() {
    let document = concat!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
        "<feed xmlns=\"http://www.w3.org/2005/Atom\">",
        "<id>tag:test</id><title>a\u{1}b</title>",
        "<updated>2019-05-04T20:00:40+00:00</updated>",
        "</feed>\n",
    );
    let report = Feed::validate(document);
    assert!(!report.is_valid());
    assert_eq!(report.diagnostics().len(), 1);
    assert!(report.diagnostics()[0].message.contains("U+0001"));
}

#[test]
fn test_custom_attribute_cannot_rebind_prefix() {
    let mut feed = minimal_feed();
    assert_eq!(
        feed.add_custom_element(
            "sy",
            SY,
            "updatePeriod",
            "hourly",
            &[("xmlns:sy", "http://evil.example.com/")],
        ),
        Err(ValidationError::InvalidName("xmlns:sy".to_string()))
    );
    assert!(!feed.serialize().unwrap().contains("evil.example.com"));
}

// ============================================================================
// Output properties
// ============================================================================

#[test]
fn test_entries_rendered_in_insertion_order() {
    let mut feed = minimal_feed();
    for i in 0..5 {
        let mut entry = Entry::new();
        entry.set_id(&format!("tag:entry-{i}")).unwrap();
        entry
            .set_content(Some("body"), None, None)
            .unwrap();
        feed.add_entry(entry);
    }

    let xml = feed.serialize().unwrap();
    let positions: Vec<usize> = (0..5)
        .map(|i| xml.find(&format!("<id>tag:entry-{i}</id>")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert_schema_valid(&xml);
}

#[test]
fn test_serialize_twice_is_identical() {
    let feed = full_feed();
    assert_eq!(feed.serialize().unwrap(), feed.serialize().unwrap());
}

#[test]
fn test_text_is_escaped_and_markup_is_wrapped() {
    let mut feed = minimal_feed();
    feed.set_title("a < b & c", Some(TextType::Text));
    feed.set_rights(Some("<b>bold</b>"), Some(TextType::Html)).unwrap();

    let xml = feed.serialize().unwrap();
    assert!(xml.contains(r#"<title type="text">a &lt; b &amp; c</title>"#));
    assert!(xml.contains(r#"<rights type="html"><![CDATA[<b>bold</b>]]></rights>"#));
    assert_schema_valid(&xml);
}

#[test]
fn test_prettify_toggles_whitespace() {
    let mut feed = minimal_feed();
    let pretty = feed.serialize().unwrap();
    feed.set_prettify(false);
    let compact = feed.serialize().unwrap();

    assert!(pretty.len() > compact.len());
    assert_eq!(compact.lines().count(), 2);
    assert!(pretty.lines().count() > 2);
    assert_schema_valid(&pretty);
    assert_schema_valid(&compact);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_from_toml_applies_to_feed() {
    let config = BuilderConfig::from_toml(
        "prettify = true\nindent_width = 4\nlink_relations = \"open\"\n",
    )
    .unwrap();
    assert_eq!(config.link_relations, LinkRelPolicy::Open);

    let mut feed = Feed::with_config(&config);
    feed.set_id("tag:test").unwrap();
    feed.add_link(Link::new("http://test.com/").with_rel("http://example.com/rels/custom"))
        .unwrap();

    let xml = feed.serialize().unwrap();
    assert!(xml.contains("\n    <id>tag:test</id>\n"));
    assert_schema_valid(&xml);

    let mut strict = Feed::new();
    assert_eq!(
        strict.add_link(Link::new("http://test.com/").with_rel("http://example.com/rels/custom")),
        Err(ValidationError::InvalidLinkRel(
            "http://example.com/rels/custom".to_string()
        ))
    );
}

// ============================================================================
// Consumers
// ============================================================================

#[test]
fn test_generated_document_is_readable_by_feed_rs() {
    let xml = full_feed().serialize().unwrap();
    let parsed = feed_rs::parser::parse(xml.as_bytes()).unwrap();

    assert_eq!(parsed.id, "tag:test");
    assert_eq!(parsed.title.map(|t| t.content).as_deref(), Some("title"));
    assert_eq!(parsed.authors.len(), 2);
    assert_eq!(parsed.authors[0].name, "author");
    assert_eq!(parsed.entries.len(), 1);

    let entry = &parsed.entries[0];
    assert_eq!(entry.id, "tag:entry-test");
    assert_eq!(entry.links[0].href, "http://test.com/alternate_entry");
    assert_eq!(entry.categories[0].term, "term");
}
