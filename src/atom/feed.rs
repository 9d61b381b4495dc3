use std::ops::{Deref, DerefMut};

use super::common::CommonFields;
use super::entry::Entry;
use super::ATOM_NAMESPACE;
use crate::config::BuilderConfig;
use crate::error::{FeedError, ValidationError};
use crate::schema::{self, SchemaReport};
use crate::util::{is_language_tag, is_ncname, validate_uri};
use crate::xml::{write_document, Element};

/// Software that produced the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generator {
    pub name: String,
    pub uri: Option<String>,
    pub version: Option<String>,
}

/// A foreign-namespace element appended to the feed, e.g. `sy:updatePeriod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomElement {
    pub prefix: String,
    pub namespace: String,
    pub name: String,
    pub value: String,
    /// Attributes in the order they are written.
    pub attributes: Vec<(String, String)>,
}

impl CustomElement {
    fn to_element(&self, escape_value: bool) -> Element {
        let mut element = Element::new(format!("{}:{}", self.prefix, self.name));
        for (name, value) in &self.attributes {
            element.set_attribute(name.as_str(), value.as_str());
        }
        if escape_value {
            element.push_text(self.value.as_str());
        } else {
            element.push_raw(self.value.as_str());
        }
        element
    }
}

/// `prefix:local` or `local`, each part an NCName.
fn is_qualified_name(name: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, local)) => is_ncname(prefix) && is_ncname(local),
        None => is_ncname(name),
    }
}

/// The root of an Atom document.
///
/// Dereferences to [`CommonFields`]. Entries are rendered in insertion order.
///
/// ```
/// use atomgen::atom::{Entry, Feed, Link, TextType};
///
/// let mut entry = Entry::new();
/// entry.set_id("tag:entry-test").unwrap();
/// entry.set_title("entry title", Some(TextType::Html));
/// entry.add_link(Link::new("http://alternate.com").with_rel("alternate")).unwrap();
///
/// let mut feed = Feed::new();
/// feed.set_id("tag:test").unwrap();
/// feed.set_title("title", None);
/// feed.add_entry(entry);
///
/// let xml = feed.serialize().unwrap();
/// assert!(Feed::validate(&xml).is_valid());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    common: CommonFields,
    entries: Vec<Entry>,
    prettify: bool,
    language: Option<String>,
    subtitle: Option<String>,
    icon: Option<String>,
    logo: Option<String>,
    generator: Option<Generator>,
    custom_elements: Vec<CustomElement>,
    config: BuilderConfig,
}

impl Deref for Feed {
    type Target = CommonFields;
    fn deref(&self) -> &CommonFields {
        &self.common
    }
}

impl DerefMut for Feed {
    fn deref_mut(&mut self) -> &mut CommonFields {
        &mut self.common
    }
}

impl Default for Feed {
    fn default() -> Self {
        Self::new()
    }
}

impl Feed {
    pub fn new() -> Self {
        Self::with_config(&BuilderConfig::default())
    }

    pub fn with_config(config: &BuilderConfig) -> Self {
        Self {
            common: CommonFields::with_link_policy(config.link_relations),
            entries: Vec::new(),
            prettify: config.prettify,
            language: None,
            subtitle: None,
            icon: None,
            logo: None,
            generator: None,
            custom_elements: Vec::new(),
            config: config.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------------

    pub fn set_prettify(&mut self, prettify: bool) {
        self.prettify = prettify;
    }

    /// Sets or clears the `xml:lang` of the document.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidLanguage`] unless `language` is a
    /// language tag such as `en` or `en-US`.
    pub fn set_language(&mut self, language: Option<&str>) -> Result<(), ValidationError> {
        if let Some(language) = language {
            if !is_language_tag(language) {
                return Err(ValidationError::InvalidLanguage(language.to_owned()));
            }
        }
        self.language = language.map(str::to_owned);
        Ok(())
    }

    pub fn set_subtitle(&mut self, subtitle: Option<&str>) {
        self.subtitle = subtitle.map(str::to_owned);
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUri`] if `uri` is not an absolute URI.
    pub fn set_icon_uri(&mut self, uri: Option<&str>) -> Result<(), ValidationError> {
        if let Some(uri) = uri {
            validate_uri(uri)?;
        }
        self.icon = uri.map(str::to_owned);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUri`] if `uri` is not an absolute URI.
    pub fn set_logo_uri(&mut self, uri: Option<&str>) -> Result<(), ValidationError> {
        if let Some(uri) = uri {
            validate_uri(uri)?;
        }
        self.logo = uri.map(str::to_owned);
        Ok(())
    }

    /// Sets or clears the generator. Clearing also drops uri and version.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::GeneratorWithoutName`] if `uri` or `version`
    /// is given without `name`, and [`ValidationError::InvalidUri`] for a bad `uri`.
    pub fn set_generator(
        &mut self,
        name: Option<&str>,
        uri: Option<&str>,
        version: Option<&str>,
    ) -> Result<(), ValidationError> {
        let Some(name) = name else {
            if uri.is_some() || version.is_some() {
                return Err(ValidationError::GeneratorWithoutName);
            }
            self.generator = None;
            return Ok(());
        };
        if let Some(uri) = uri {
            validate_uri(uri)?;
        }
        self.generator = Some(Generator {
            name: name.to_owned(),
            uri: uri.map(str::to_owned),
            version: version.map(str::to_owned),
        });
        Ok(())
    }

    /// Appends a namespaced extension element and declares `xmlns:<prefix>`
    /// on the document root.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidUri`] if `namespace` is not an absolute URI
    /// - [`ValidationError::InvalidName`] for a malformed prefix, name or attribute
    ///   name, including namespace declarations (`xmlns`, `xmlns:*`)
    /// - [`ValidationError::UndeclaredPrefix`] for an attribute prefix that is
    ///   neither `xml`, `prefix` nor the prefix of an earlier custom element
    /// - [`ValidationError::NamespaceConflict`] if `prefix` is already bound elsewhere
    pub fn add_custom_element(
        &mut self,
        prefix: &str,
        namespace: &str,
        name: &str,
        value: &str,
        attributes: &[(&str, &str)],
    ) -> Result<(), ValidationError> {
        validate_uri(namespace)?;
        for candidate in [prefix, name] {
            if !is_ncname(candidate) || candidate.to_ascii_lowercase().starts_with("xml") {
                return Err(ValidationError::InvalidName(candidate.to_owned()));
            }
        }
        for (attribute, _) in attributes {
            if !is_qualified_name(attribute) || *attribute == "xmlns" || attribute.starts_with("xmlns:") {
                return Err(ValidationError::InvalidName((*attribute).to_owned()));
            }
            if let Some((attribute_prefix, _)) = attribute.split_once(':') {
                let declared = attribute_prefix == "xml"
                    || attribute_prefix == prefix
                    || self.custom_elements.iter().any(|c| c.prefix == attribute_prefix);
                if !declared {
                    return Err(ValidationError::UndeclaredPrefix {
                        prefix: attribute_prefix.to_owned(),
                        name: (*attribute).to_owned(),
                    });
                }
            }
        }
        if let Some(existing) = self
            .custom_elements
            .iter()
            .find(|c| c.prefix == prefix && c.namespace != namespace)
        {
            return Err(ValidationError::NamespaceConflict {
                prefix: prefix.to_owned(),
                existing: existing.namespace.clone(),
            });
        }

        self.custom_elements.push(CustomElement {
            prefix: prefix.to_owned(),
            namespace: namespace.to_owned(),
            name: name.to_owned(),
            value: value.to_owned(),
            attributes: attributes
                .iter()
                .map(|(n, v)| ((*n).to_owned(), (*v).to_owned()))
                .collect(),
        });
        Ok(())
    }

    pub fn add_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn set_entries(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
    }

    // ------------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------------

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn prettify(&self) -> bool {
        self.prettify
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn logo(&self) -> Option<&str> {
        self.logo.as_deref()
    }

    pub fn generator(&self) -> Option<&Generator> {
        self.generator.as_ref()
    }

    pub fn custom_elements(&self) -> &[CustomElement] {
        &self.custom_elements
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Builds the document tree: the `feed` root with its namespace
    /// declarations, the feed metadata and every entry.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingContent`] from the first entry that
    /// has neither content nor an alternate link.
    pub fn materialize(&self) -> Result<Element, ValidationError> {
        let mut root = Element::new("feed");
        root.set_attribute("xmlns", ATOM_NAMESPACE);
        self.apply_scope_attributes(&mut root);
        self.render_fields_into(&mut root);

        for entry in &self.entries {
            entry.render_into(&mut root)?;
        }

        tracing::debug!(
            id = %self.common.id(),
            entries = self.entries.len(),
            custom_elements = self.custom_elements.len(),
            "Materialized feed"
        );
        Ok(root)
    }

    /// Materializes and serializes the feed, indented when `prettify` is set.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Validation`] if materialization fails, or a
    /// writer error if the tree cannot be serialized.
    pub fn serialize(&self) -> Result<String, FeedError> {
        let root = self.materialize()?;
        let xml = write_document(&root, self.config.write_options(self.prettify))?;
        tracing::debug!(bytes = xml.len(), prettify = self.prettify, "Serialized feed");
        Ok(xml)
    }

    /// Checks a serialized document against the Atom schema.
    ///
    /// Never fails: non-conformance is reported through the returned
    /// [`SchemaReport`].
    pub fn validate(document: &str) -> SchemaReport {
        schema::validate(document)
    }

    /// The feed rendered as an entry's `source` element.
    pub(crate) fn to_source_element(&self) -> Element {
        let mut source = Element::new("source");
        self.apply_scope_attributes(&mut source);
        self.render_fields_into(&mut source);
        source
    }

    /// `xml:lang` and one `xmlns:<prefix>` per distinct custom prefix.
    fn apply_scope_attributes(&self, element: &mut Element) {
        if let Some(ref language) = self.language {
            element.set_attribute("xml:lang", language.as_str());
        }
        for custom in &self.custom_elements {
            element.set_attribute(format!("xmlns:{}", custom.prefix), custom.namespace.as_str());
        }
    }

    /// Common fields, then subtitle, logo, icon, generator and custom elements.
    fn render_fields_into(&self, parent: &mut Element) {
        self.common.render_into(parent);

        if let Some(ref subtitle) = self.subtitle {
            parent.push_element(Element::with_text("subtitle", subtitle.as_str()));
        }
        if let Some(ref logo) = self.logo {
            parent.push_element(Element::with_text("logo", logo.as_str()));
        }
        if let Some(ref icon) = self.icon {
            parent.push_element(Element::with_text("icon", icon.as_str()));
        }
        if let Some(ref generator) = self.generator {
            let mut element = Element::with_text("generator", generator.name.as_str());
            if let Some(ref uri) = generator.uri {
                element.set_attribute("uri", uri.as_str());
            }
            if let Some(ref version) = generator.version {
                element.set_attribute("version", version.as_str());
            }
            parent.push_element(element);
        }

        for custom in &self.custom_elements {
            parent.push_element(custom.to_element(self.config.escape_custom_values));
        }
    }
}
