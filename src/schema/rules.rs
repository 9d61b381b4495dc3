//! The RFC 4287 grammar, checked element by element.
//!
//! Each `check_*` method corresponds to one pattern of the Atom RELAX NG
//! schema. Diagnostics are pushed in document order; checking continues
//! after an error so one pass reports every problem.

use chrono::{DateTime, NaiveDateTime};

use super::document::{ParsedElement, XML_NAMESPACE};
use super::SchemaDiagnostic;
use crate::atom::{ATOM_NAMESPACE, XHTML_NAMESPACE};
use crate::util::{is_language_tag, is_media_type};

/// The three elements that hold Atom metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Feed,
    Entry,
    Source,
}

impl Container {
    fn name(self) -> &'static str {
        match self {
            Container::Feed => "feed",
            Container::Entry => "entry",
            Container::Source => "source",
        }
    }

    fn allows(self, local: &str) -> bool {
        const COMMON: [&str; 8] = [
            "author",
            "category",
            "contributor",
            "id",
            "link",
            "rights",
            "title",
            "updated",
        ];
        const FEED_ONLY: [&str; 4] = ["generator", "icon", "logo", "subtitle"];
        const ENTRY_ONLY: [&str; 4] = ["content", "published", "source", "summary"];

        COMMON.contains(&local)
            || match self {
                Container::Feed => FEED_ONLY.contains(&local) || local == "entry",
                Container::Source => FEED_ONLY.contains(&local),
                Container::Entry => ENTRY_ONLY.contains(&local),
            }
    }

    /// Elements that must appear exactly once.
    fn required(self) -> &'static [&'static str] {
        match self {
            Container::Feed | Container::Entry => &["id", "title", "updated"],
            Container::Source => &[],
        }
    }
}

/// Elements that may appear at most once in any container.
const SINGLE_VALUED: [&str; 12] = [
    "content",
    "generator",
    "icon",
    "id",
    "logo",
    "published",
    "rights",
    "source",
    "subtitle",
    "summary",
    "title",
    "updated",
];

/// `xsd:dateTime`, with or without a timezone.
fn is_date_time(value: &str) -> bool {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

/// `atomEmailAddress`: `.+@.+`.
fn is_email_address(value: &str) -> bool {
    value
        .char_indices()
        .any(|(i, c)| c == '@' && i > 0 && i + 1 < value.len())
}

#[derive(Default)]
pub(crate) struct Checker {
    diagnostics: Vec<SchemaDiagnostic>,
}

impl Checker {
    pub fn into_diagnostics(self) -> Vec<SchemaDiagnostic> {
        self.diagnostics
    }

    fn error(&mut self, element: &ParsedElement, message: String) {
        self.diagnostics.push(SchemaDiagnostic {
            line: element.line,
            column: element.column,
            message,
        });
    }

    pub fn check_document(&mut self, root: &ParsedElement) {
        if root.is(ATOM_NAMESPACE, "feed") {
            self.check_container(root, Container::Feed);
        } else {
            self.error(
                root,
                format!(
                    "Expecting element feed in namespace {ATOM_NAMESPACE}, got {}",
                    root.local
                ),
            );
        }
    }

    // ------------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------------

    fn check_container(&mut self, element: &ParsedElement, container: Container) {
        self.check_attributes(element, &[]);
        if element.has_text() {
            self.error(element, format!("Element {} has extra text content", container.name()));
        }

        let mut seen_entry = false;
        let mut counts: Vec<(&str, usize)> = Vec::new();

        for child in &element.children {
            if child.namespace.as_deref() != Some(ATOM_NAMESPACE) {
                // extensionElement
                if seen_entry {
                    self.error(
                        child,
                        format!("Element {} has extra content after entries: {}", container.name(), child.local),
                    );
                }
                continue;
            }

            let local = child.local.as_str();
            if !container.allows(local) {
                self.error(
                    child,
                    format!("Element {local} is not allowed in {}", container.name()),
                );
                continue;
            }

            if local == "entry" {
                seen_entry = true;
                self.check_container(child, Container::Entry);
                continue;
            }
            if seen_entry {
                self.error(
                    child,
                    format!("Element {} has extra content after entries: {local}", container.name()),
                );
            }

            match counts.iter_mut().find(|(name, _)| *name == local) {
                Some((_, count)) => *count += 1,
                None => counts.push((local, 1)),
            }
            if SINGLE_VALUED.contains(&local)
                && counts.iter().any(|(name, count)| *name == local && *count == 2)
            {
                self.error(
                    child,
                    format!("Element {} has more than one {local}", container.name()),
                );
            }

            self.check_metadata_element(child);
        }

        for required in container.required() {
            if !counts.iter().any(|(name, _)| name == required) {
                self.error(
                    element,
                    format!("Expecting element {required} in {}, got nothing", container.name()),
                );
            }
        }
    }

    fn check_metadata_element(&mut self, element: &ParsedElement) {
        match element.local.as_str() {
            "author" | "contributor" => self.check_person(element),
            "category" => self.check_category(element),
            "content" => self.check_content(element),
            "generator" => self.check_generator(element),
            "icon" | "id" | "logo" => self.check_uri_construct(element),
            "link" => self.check_link(element),
            "published" | "updated" => self.check_date(element),
            "rights" | "subtitle" | "summary" | "title" => self.check_text_construct(element),
            "source" => self.check_container(element, Container::Source),
            _ => {}
        }
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    /// `atomCommonAttributes` plus the unqualified attributes in `allowed`.
    fn check_attributes(&mut self, element: &ParsedElement, allowed: &[&str]) {
        for attr in &element.attributes {
            match attr.namespace.as_deref() {
                None if allowed.contains(&attr.local.as_str()) => {}
                None => self.error(
                    element,
                    format!("Invalid attribute {} for element {}", attr.local, element.local),
                ),
                Some(XML_NAMESPACE) if attr.local == "lang" => {
                    if !attr.value.is_empty() && !is_language_tag(&attr.value) {
                        self.error(
                            element,
                            format!("Invalid xml:lang value {} on element {}", attr.value, element.local),
                        );
                    }
                }
                Some(XML_NAMESPACE) if attr.local == "base" => {}
                Some(XML_NAMESPACE) => self.error(
                    element,
                    format!("Invalid attribute xml:{} for element {}", attr.local, element.local),
                ),
                Some(_) => {} // undefinedAttribute
            }
        }
    }

    fn no_child_elements(&mut self, element: &ParsedElement) {
        if let Some(child) = element.children.first() {
            self.error(
                child,
                format!("Element {} must contain text only, found {}", element.local, child.local),
            );
        }
    }

    // ------------------------------------------------------------------------
    // Constructs
    // ------------------------------------------------------------------------

    /// `atomPlainTextConstruct | atomXHTMLTextConstruct`
    fn check_text_construct(&mut self, element: &ParsedElement) {
        self.check_attributes(element, &["type"]);
        match element.attribute("type") {
            None | Some("text") | Some("html") => self.no_child_elements(element),
            Some("xhtml") => self.check_xhtml_div(element),
            Some(other) => self.error(
                element,
                format!("Invalid value {other} for attribute type of element {}", element.local),
            ),
        }
    }

    /// Exactly one `xhtml:div` child and no other text.
    fn check_xhtml_div(&mut self, element: &ParsedElement) {
        let is_div = |e: &ParsedElement| e.is(XHTML_NAMESPACE, "div");
        if element.has_text()
            || element.children.len() != 1
            || !element.children.iter().all(is_div)
        {
            self.error(
                element,
                format!("Element {} of type xhtml must contain a single xhtml:div", element.local),
            );
        }
    }

    /// `atomPersonConstruct`
    fn check_person(&mut self, element: &ParsedElement) {
        self.check_attributes(element, &[]);
        if element.has_text() {
            self.error(element, format!("Element {} has extra text content", element.local));
        }

        let (mut names, mut uris, mut emails) = (0, 0, 0);
        for child in &element.children {
            if child.namespace.as_deref() != Some(ATOM_NAMESPACE) {
                continue;
            }
            match child.local.as_str() {
                "name" => {
                    names += 1;
                    self.check_attributes(child, &[]);
                    self.no_child_elements(child);
                }
                "uri" => {
                    uris += 1;
                    self.check_uri_construct(child);
                }
                "email" => {
                    emails += 1;
                    self.check_attributes(child, &[]);
                    self.no_child_elements(child);
                    if !is_email_address(child.text.trim()) {
                        self.error(child, format!("Invalid email address {}", child.text));
                    }
                }
                other => self.error(
                    child,
                    format!("Element {other} is not allowed in {}", element.local),
                ),
            }
        }

        if names == 0 {
            self.error(
                element,
                format!("Expecting element name in {}, got nothing", element.local),
            );
        }
        for (count, name) in [(names, "name"), (uris, "uri"), (emails, "email")] {
            if count > 1 {
                self.error(element, format!("Element {} has more than one {name}", element.local));
            }
        }
    }

    /// `atomDateConstruct`
    fn check_date(&mut self, element: &ParsedElement) {
        self.check_attributes(element, &[]);
        self.no_child_elements(element);
        if !is_date_time(&element.text) {
            self.error(
                element,
                format!("Invalid date-time {} in element {}", element.text.trim(), element.local),
            );
        }
    }

    /// `atomId`, `atomIcon`, `atomLogo` and the person `uri`: text only.
    fn check_uri_construct(&mut self, element: &ParsedElement) {
        self.check_attributes(element, &[]);
        self.no_child_elements(element);
    }

    fn check_generator(&mut self, element: &ParsedElement) {
        self.check_attributes(element, &["uri", "version"]);
        self.no_child_elements(element);
    }

    fn check_link(&mut self, element: &ParsedElement) {
        self.check_attributes(element, &["href", "rel", "type", "hreflang", "title", "length"]);
        if element.attribute("href").is_none() {
            self.error(element, "Element link is missing required attribute href".into());
        }
        if let Some(media_type) = element.attribute("type") {
            if !is_media_type(media_type) {
                self.error(element, format!("Invalid media type {media_type} on element link"));
            }
        }
        if let Some(hreflang) = element.attribute("hreflang") {
            if !is_language_tag(hreflang) {
                self.error(element, format!("Invalid hreflang {hreflang} on element link"));
            }
        }
    }

    fn check_category(&mut self, element: &ParsedElement) {
        self.check_attributes(element, &["term", "scheme", "label"]);
        if element.attribute("term").is_none() {
            self.error(element, "Element category is missing required attribute term".into());
        }
    }

    /// `atomInlineTextContent | atomInlineXHTMLContent | atomInlineOtherContent | atomOutOfLineContent`
    fn check_content(&mut self, element: &ParsedElement) {
        self.check_attributes(element, &["type", "src"]);
        let kind = element.attribute("type");

        if element.attribute("src").is_some() {
            if element.has_text() || !element.children.is_empty() {
                self.error(element, "Element content with src must be empty".into());
            }
            if let Some(kind) = kind {
                if !is_media_type(kind) {
                    self.error(
                        element,
                        format!("Invalid value {kind} for attribute type of content with src"),
                    );
                }
            }
            return;
        }

        match kind {
            None | Some("text") | Some("html") => self.no_child_elements(element),
            Some("xhtml") => self.check_xhtml_div(element),
            Some(other) if is_media_type(other) => {}
            Some(other) => self.error(
                element,
                format!("Invalid value {other} for attribute type of element content"),
            ),
        }
    }
}
