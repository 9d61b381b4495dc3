use crate::error::ValidationError;
use crate::util::{validate_email, validate_uri};
use crate::xml::Element;

/// An Atom person construct (`author` or `contributor`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub email: Option<String>,
    pub uri: Option<String>,
}

impl Person {
    /// Creates a person, validating the optional email address and URI.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidEmail`] or [`ValidationError::InvalidUri`].
    pub fn new(name: &str, email: Option<&str>, uri: Option<&str>) -> Result<Self, ValidationError> {
        if let Some(email) = email {
            validate_email(email)?;
        }
        if let Some(uri) = uri {
            validate_uri(uri)?;
        }
        Ok(Self {
            name: name.to_owned(),
            email: email.map(str::to_owned),
            uri: uri.map(str::to_owned),
        })
    }

    /// Renders the person as `tag` with `name`, `email` and `uri` children.
    pub(crate) fn to_element(&self, tag: &str) -> Element {
        let mut element = Element::new(tag);
        element.push_element(Element::with_text("name", self.name.as_str()));
        if let Some(ref email) = self.email {
            element.push_element(Element::with_text("email", email.as_str()));
        }
        if let Some(ref uri) = self.uri {
            element.push_element(Element::with_text("uri", uri.as_str()));
        }
        element
    }
}
