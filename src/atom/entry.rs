use std::ops::{Deref, DerefMut};

use chrono::{DateTime, FixedOffset};

use super::common::{format_timestamp, CommonFields};
use super::feed::Feed;
use super::text::{optional_typed, TextType, TypedText};
use crate::config::BuilderConfig;
use crate::error::ValidationError;
use crate::util::validate_uri;
use crate::xml::Element;

/// The body of an entry, as accepted by [`Entry::set_content`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Inline text with an optional type.
    Inline(TypedText),
    /// A reference to remote content, with an optional type.
    Remote {
        src: String,
        kind: Option<TextType>,
    },
}

impl Content {
    fn to_element(&self) -> Element {
        match self {
            Content::Inline(text) => text.to_element("content"),
            Content::Remote { src, kind } => {
                let mut element = Element::new("content");
                if let Some(kind) = kind {
                    element.set_attribute("type", kind.as_str());
                }
                element.set_attribute("src", src.as_str());
                element
            }
        }
    }
}

/// A single Atom entry.
///
/// Dereferences to [`CommonFields`] for id, title, links and the rest of the
/// shared metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    common: CommonFields,
    summary: Option<TypedText>,
    content: Option<Content>,
    published: Option<DateTime<FixedOffset>>,
    source: Option<Box<Feed>>,
}

impl Deref for Entry {
    type Target = CommonFields;
    fn deref(&self) -> &CommonFields {
        &self.common
    }
}

impl DerefMut for Entry {
    fn deref_mut(&mut self) -> &mut CommonFields {
        &mut self.common
    }
}

impl Default for Entry {
    fn default() -> Self {
        Self::new()
    }
}

impl Entry {
    pub fn new() -> Self {
        Self::with_config(&BuilderConfig::default())
    }

    pub fn with_config(config: &BuilderConfig) -> Self {
        Self {
            common: CommonFields::with_link_policy(config.link_relations),
            summary: None,
            content: None,
            published: None,
            source: None,
        }
    }

    /// Sets or clears the summary.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TypeWithoutValue`] if `kind` is given without `summary`.
    pub fn set_summary(
        &mut self,
        summary: Option<&str>,
        kind: Option<TextType>,
    ) -> Result<(), ValidationError> {
        self.summary = optional_typed("summary", summary, kind)?;
        Ok(())
    }

    /// Sets inline content, remote content, or clears the content.
    ///
    /// Legal shapes are `(Some(text), _, None)`, `(None, _, Some(src))` and
    /// `(None, None, None)`. When the content is cleared the entry needs an
    /// alternate link by the time it is rendered.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ContentShape`] for any other shape and
    /// [`ValidationError::InvalidUri`] if `src` is not an absolute URI.
    pub fn set_content(
        &mut self,
        content: Option<&str>,
        kind: Option<TextType>,
        src: Option<&str>,
    ) -> Result<(), ValidationError> {
        self.content = match (content, kind, src) {
            (Some(text), kind, None) => Some(Content::Inline(TypedText::new(text, kind))),
            (None, kind, Some(src)) => {
                validate_uri(src)?;
                Some(Content::Remote {
                    src: src.to_owned(),
                    kind,
                })
            }
            (None, None, None) => None,
            (Some(_), _, Some(_)) => {
                return Err(ValidationError::ContentShape("both inline text and src"))
            }
            (None, Some(_), None) => {
                return Err(ValidationError::ContentShape("a type without text or src"))
            }
        };
        Ok(())
    }

    pub fn set_published(&mut self, published: Option<DateTime<FixedOffset>>) {
        self.published = published;
    }

    /// Sets or clears the source feed snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::SourceHasEntries`] if `source` has entries.
    pub fn set_source(&mut self, source: Option<Feed>) -> Result<(), ValidationError> {
        if let Some(ref feed) = source {
            if !feed.entries().is_empty() {
                return Err(ValidationError::SourceHasEntries(feed.entries().len()));
            }
        }
        self.source = source.map(Box::new);
        Ok(())
    }

    pub fn summary(&self) -> Option<&TypedText> {
        self.summary.as_ref()
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        self.published
    }

    pub fn source(&self) -> Option<&Feed> {
        self.source.as_deref()
    }

    /// Appends this entry to `parent` as an `entry` element.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingContent`] if the entry has no
    /// content and no `rel="alternate"` link. This is the only check
    /// deferred to render time, since links may be added after content is
    /// cleared.
    pub fn render_into(&self, parent: &mut Element) -> Result<(), ValidationError> {
        if self.content.is_none() && !self.common.has_alternate_link() {
            return Err(ValidationError::MissingContent);
        }

        let mut entry = Element::new("entry");
        self.common.render_into(&mut entry);

        if let Some(ref published) = self.published {
            entry.push_element(Element::with_text("published", format_timestamp(published)));
        }
        if let Some(ref summary) = self.summary {
            entry.push_element(summary.to_element("summary"));
        }
        if let Some(ref content) = self.content {
            entry.push_element(content.to_element());
        }
        if let Some(ref source) = self.source {
            entry.push_element(source.to_source_element());
        }

        parent.push_element(entry);
        Ok(())
    }
}
