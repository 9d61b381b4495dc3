use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

use super::category::Category;
use super::link::{Link, LinkRelPolicy};
use super::person::Person;
use super::text::{optional_typed, TextType, TypedText};
use crate::error::ValidationError;
use crate::util::validate_id;
use crate::xml::Element;

/// Title given to feeds and entries until `set_title` is called.
pub const DEFAULT_TITLE: &str = "Example, Inc.";

/// Id given to feeds and entries until `set_id` is called.
pub const DEFAULT_ID: &str = "http://example.com/";

/// Formats a timestamp as RFC 3339 with an explicit offset, e.g.
/// `2019-05-04T21:00:40+00:00`.
pub(crate) fn format_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Metadata shared by feeds, entries and entry sources.
///
/// Every setter validates its input eagerly and leaves the fields untouched
/// on error. [`Feed`](super::Feed) and [`Entry`](super::Entry) embed this
/// struct and dereference to it, so `entry.set_title(..)` works directly.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonFields {
    id: String,
    title: TypedText,
    updated: DateTime<FixedOffset>,
    rights: Option<TypedText>,
    authors: Vec<Person>,
    contributors: Vec<Person>,
    categories: Vec<Category>,
    links: Vec<Link>,
    link_policy: LinkRelPolicy,
}

impl Default for CommonFields {
    fn default() -> Self {
        Self::with_link_policy(LinkRelPolicy::default())
    }
}

impl CommonFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults: [`DEFAULT_ID`], [`DEFAULT_TITLE`] and `updated` set to now.
    pub fn with_link_policy(link_policy: LinkRelPolicy) -> Self {
        Self {
            id: DEFAULT_ID.to_owned(),
            title: TypedText::new(DEFAULT_TITLE, None),
            updated: Utc::now().into(),
            rights: None,
            authors: Vec::new(),
            contributors: Vec::new(),
            categories: Vec::new(),
            links: Vec::new(),
            link_policy,
        }
    }

    // ------------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidId`] unless `id` starts with `tag:`
    /// or is an absolute URI.
    pub fn set_id(&mut self, id: &str) -> Result<(), ValidationError> {
        validate_id(id)?;
        self.id = id.to_owned();
        Ok(())
    }

    pub fn set_title(&mut self, title: &str, kind: Option<TextType>) {
        self.title = TypedText::new(title, kind);
    }

    pub fn set_updated(&mut self, updated: impl Into<DateTime<FixedOffset>>) {
        self.updated = updated.into();
    }

    /// Sets or clears the rights statement.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TypeWithoutValue`] if `kind` is given without `rights`.
    pub fn set_rights(
        &mut self,
        rights: Option<&str>,
        kind: Option<TextType>,
    ) -> Result<(), ValidationError> {
        self.rights = optional_typed("rights", rights, kind)?;
        Ok(())
    }

    /// Appends a category. Duplicates are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUri`] if `scheme` is not an absolute URI.
    pub fn add_category(
        &mut self,
        term: &str,
        scheme: Option<&str>,
        label: Option<&str>,
    ) -> Result<(), ValidationError> {
        self.categories.push(Category::new(term, scheme, label)?);
        Ok(())
    }

    /// Appends a link after checking its href and relation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUri`] for a bad href, or
    /// [`ValidationError::InvalidLinkRel`] when the relation policy rejects `rel`.
    pub fn add_link(&mut self, link: Link) -> Result<(), ValidationError> {
        link.validate(self.link_policy)?;
        self.links.push(link);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEmail`] or [`ValidationError::InvalidUri`].
    pub fn add_author(
        &mut self,
        name: &str,
        email: Option<&str>,
        uri: Option<&str>,
    ) -> Result<(), ValidationError> {
        self.authors.push(Person::new(name, email, uri)?);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEmail`] or [`ValidationError::InvalidUri`].
    pub fn add_contributor(
        &mut self,
        name: &str,
        email: Option<&str>,
        uri: Option<&str>,
    ) -> Result<(), ValidationError> {
        self.contributors.push(Person::new(name, email, uri)?);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &TypedText {
        &self.title
    }

    pub fn updated(&self) -> DateTime<FixedOffset> {
        self.updated
    }

    pub fn rights(&self) -> Option<&TypedText> {
        self.rights.as_ref()
    }

    pub fn authors(&self) -> &[Person] {
        &self.authors
    }

    pub fn contributors(&self) -> &[Person] {
        &self.contributors
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link_policy(&self) -> LinkRelPolicy {
        self.link_policy
    }

    /// True if any link carries `rel="alternate"`.
    pub fn has_alternate_link(&self) -> bool {
        self.links.iter().any(Link::is_alternate)
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Appends id, title, updated, rights, categories, links, authors and
    /// contributors to `parent`, in that order.
    pub fn render_into(&self, parent: &mut Element) {
        parent.push_element(Element::with_text("id", self.id.as_str()));
        parent.push_element(self.title.to_element("title"));
        parent.push_element(Element::with_text("updated", format_timestamp(&self.updated)));

        if let Some(ref rights) = self.rights {
            parent.push_element(rights.to_element("rights"));
        }

        for category in &self.categories {
            parent.push_element(category.to_element());
        }
        for link in &self.links {
            parent.push_element(link.to_element());
        }

        for author in &self.authors {
            parent.push_element(author.to_element("author"));
        }
        for contributor in &self.contributors {
            parent.push_element(contributor.to_element("contributor"));
        }
    }
}
