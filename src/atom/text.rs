use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::xml::Element;

/// The `type` attribute of an Atom text construct or inline content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextType {
    Text,
    Html,
    Xhtml,
}

impl TextType {
    pub fn as_str(self) -> &'static str {
        match self {
            TextType::Text => "text",
            TextType::Html => "html",
            TextType::Xhtml => "xhtml",
        }
    }

    /// Markup types are embedded as CDATA rather than escaped.
    pub fn is_markup(self) -> bool {
        matches!(self, TextType::Html | TextType::Xhtml)
    }
}

impl fmt::Display for TextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(TextType::Text),
            "html" => Ok(TextType::Html),
            "xhtml" => Ok(TextType::Xhtml),
            other => Err(ValidationError::InvalidTextType(other.to_owned())),
        }
    }
}

/// A value paired with its optional [`TextType`].
///
/// Used for title, rights, subtitle-like fields, summary and inline content:
/// the type decides whether the value is escaped or wrapped in CDATA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedText {
    pub value: String,
    pub kind: Option<TextType>,
}

impl TypedText {
    pub fn new(value: impl Into<String>, kind: Option<TextType>) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    /// Builds the element `name` holding this text.
    ///
    /// html/xhtml values become a CDATA section, anything else is escaped
    /// text. A `type` attribute is written whenever a type was given.
    pub fn to_element(&self, name: &str) -> Element {
        let mut element = Element::new(name);
        if self.kind.is_some_and(TextType::is_markup) {
            element.push_cdata(self.value.as_str());
        } else {
            element.push_text(self.value.as_str());
        }
        if let Some(kind) = self.kind {
            element.set_attribute("type", kind.as_str());
        }
        element
    }
}

/// Pairs an optional value with an optional type, rejecting a type without a value.
pub(crate) fn optional_typed(
    field: &'static str,
    value: Option<&str>,
    kind: Option<TextType>,
) -> Result<Option<TypedText>, ValidationError> {
    match (value, kind) {
        (Some(value), kind) => Ok(Some(TypedText::new(value, kind))),
        (None, None) => Ok(None),
        (None, Some(_)) => Err(ValidationError::TypeWithoutValue(field)),
    }
}
