use crate::error::ValidationError;
use crate::util::validate_uri;
use crate::xml::Element;

/// An Atom `category`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub term: String,
    pub scheme: Option<String>,
    pub label: Option<String>,
}

impl Category {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUri`] if `scheme` is not an absolute URI.
    pub fn new(term: &str, scheme: Option<&str>, label: Option<&str>) -> Result<Self, ValidationError> {
        if let Some(scheme) = scheme {
            validate_uri(scheme)?;
        }
        Ok(Self {
            term: term.to_owned(),
            scheme: scheme.map(str::to_owned),
            label: label.map(str::to_owned),
        })
    }

    pub(crate) fn to_element(&self) -> Element {
        let mut element = Element::new("category");
        element.set_attribute("term", self.term.as_str());
        if let Some(ref scheme) = self.scheme {
            element.set_attribute("scheme", scheme.as_str());
        }
        if let Some(ref label) = self.label {
            element.set_attribute("label", label.as_str());
        }
        element
    }
}
